/// Full-width and CJK punctuation recognised next to ASCII punctuation.
const CJK_PUNCTUATION: &str = "！？｡。＂＃＄％＆＇（）＊＋，－／：；＜＝＞＠［＼］＾＿｀｛｜｝～｟｠｢｣､、〃《》「」『』【】〔〕〖〗〘〙〚〛〜〝〞〟〰〾〿–—‘’‛“”„‟…‧﹏·";

pub fn is_punctuation_char(c: char) -> bool {
    c.is_ascii_punctuation() || CJK_PUNCTUATION.contains(c)
}

/// A token is punctuation when every character in it is.
pub fn is_punctuation(token: &str) -> bool {
    !token.is_empty() && token.chars().all(is_punctuation_char)
}

/// Character-level segmentation: one token per character, except that runs of
/// ASCII letters and digits stay together. Whitespace is dropped.
pub fn split_chars(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut buffer = String::new();
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            buffer.push(c);
            continue;
        }
        if !buffer.is_empty() {
            tokens.push(std::mem::take(&mut buffer));
        }
        if !c.is_whitespace() {
            tokens.push(c.to_string());
        }
    }
    if !buffer.is_empty() {
        tokens.push(buffer);
    }
    tokens
}

pub fn split_whitespace(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Segmented input keeps its separators; raw input loses all whitespace.
pub fn clean_text(text: &str, segmented: bool) -> String {
    if segmented {
        text.trim().to_string()
    } else {
        text.split_whitespace().collect()
    }
}
