use crate::alignment::levenshtein::{AlignOp, OpKind};
use crate::alignment::tokenization::is_punctuation;
use crate::pipeline::traits::CharSimilarity;

/// Error-type rules, tried in [`RULE_ORDER`]; the first that fires names the edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationRule {
    WordOrder,
    Punctuation,
    Spelling,
    Fallback,
}

pub const RULE_ORDER: [ClassificationRule; 4] = [
    ClassificationRule::WordOrder,
    ClassificationRule::Punctuation,
    ClassificationRule::Spelling,
    ClassificationRule::Fallback,
];

/// The two sides of one merged edit.
#[derive(Debug, Clone, Copy)]
pub struct EditSides<'a> {
    pub kind: OpKind,
    pub src: &'a [&'a str],
    pub tgt: &'a [&'a str],
}

impl<'a> EditSides<'a> {
    pub fn new(op: &AlignOp, src: &'a [&'a str], tgt: &'a [&'a str]) -> Self {
        Self {
            kind: op.kind,
            src: &src[op.src_start..op.src_end],
            tgt: &tgt[op.tgt_start..op.tgt_end],
        }
    }

    /// `M` for missing text, `R` for redundant text, `S` for a substitution.
    pub fn operation_prefix(&self) -> &'static str {
        if self.src.is_empty() {
            "M"
        } else if self.tgt.is_empty() {
            "R"
        } else {
            "S"
        }
    }
}

impl ClassificationRule {
    pub fn name(self) -> &'static str {
        match self {
            Self::WordOrder => "word_order",
            Self::Punctuation => "punctuation",
            Self::Spelling => "spelling",
            Self::Fallback => "fallback",
        }
    }

    pub fn apply(
        self,
        sides: &EditSides<'_>,
        similarity: &dyn CharSimilarity,
        threshold: f64,
    ) -> Option<String> {
        match self {
            Self::WordOrder => is_word_order(sides).then(|| "W".to_string()),
            Self::Punctuation => is_punctuation_only(sides)
                .then(|| format!("{}:PUNCT", sides.operation_prefix())),
            Self::Spelling => {
                is_spelling(sides, similarity, threshold).then(|| "S:SPELL".to_string())
            }
            Self::Fallback => Some(format!("{}:OTHER", sides.operation_prefix())),
        }
    }
}

/// Category tag for one merged edit.
pub fn classify(
    sides: &EditSides<'_>,
    similarity: &dyn CharSimilarity,
    threshold: f64,
) -> String {
    for rule in RULE_ORDER {
        if let Some(tag) = rule.apply(sides, similarity, threshold) {
            tracing::trace!(rule = rule.name(), tag = %tag, "classification: rule fired");
            return tag;
        }
    }
    format!("{}:OTHER", sides.operation_prefix())
}

fn is_word_order(sides: &EditSides<'_>) -> bool {
    if sides.kind.is_transpose() {
        return true;
    }
    if sides.src.is_empty() || sides.tgt.is_empty() {
        return false;
    }
    let before = sides.src.concat();
    let after = sides.tgt.concat();
    if before == after {
        return false;
    }
    sorted_chars(&before) == sorted_chars(&after)
}

fn sorted_chars(text: &str) -> Vec<char> {
    let mut chars: Vec<char> = text.chars().collect();
    chars.sort_unstable();
    chars
}

fn is_punctuation_only(sides: &EditSides<'_>) -> bool {
    let mut tokens = sides.src.iter().chain(sides.tgt).peekable();
    tokens.peek().is_some() && tokens.all(|t| is_punctuation(t))
}

/// Same length, and every differing character pair is a look-alike.
fn is_spelling(sides: &EditSides<'_>, similarity: &dyn CharSimilarity, threshold: f64) -> bool {
    if sides.src.is_empty() || sides.tgt.is_empty() {
        return false;
    }
    let before: Vec<char> = sides.src.concat().chars().collect();
    let after: Vec<char> = sides.tgt.concat().chars().collect();
    if before.len() != after.len() || before == after {
        return false;
    }
    before
        .iter()
        .zip(&after)
        .filter(|(a, b)| a != b)
        .all(|(&a, &b)| similarity.similarity(a, b) >= threshold)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::alignment::cost::{OrthographicSimilarity, TableCharSimilarity};

    fn tag(kind: OpKind, src: &[&str], tgt: &[&str]) -> String {
        let op = AlignOp::new(kind, 0, src.len(), 0, tgt.len());
        classify(&EditSides::new(&op, src, tgt), &OrthographicSimilarity, 0.5)
    }

    #[test]
    fn rule_order_is_fixed() {
        assert_eq!(RULE_ORDER[0], ClassificationRule::WordOrder);
        assert_eq!(RULE_ORDER[3], ClassificationRule::Fallback);
    }

    #[test]
    fn transpositions_and_anagrams_are_word_order() {
        assert_eq!(tag(OpKind::Transpose(2), &["死", "爱"], &["爱", "死"]), "W");
        assert_eq!(tag(OpKind::Substitute, &["死爱"], &["爱死"]), "W");
    }

    #[test]
    fn punctuation_tags_carry_operation_prefix() {
        assert_eq!(tag(OpKind::Insert, &[], &["，"]), "M:PUNCT");
        assert_eq!(tag(OpKind::Delete, &["。"], &[]), "R:PUNCT");
        assert_eq!(tag(OpKind::Substitute, &["，"], &["。"]), "S:PUNCT");
    }

    #[test]
    fn look_alike_substitution_is_spelling() {
        assert_eq!(tag(OpKind::Substitute, &["Beijing"], &["BEIJING"]), "S:SPELL");
        assert_eq!(tag(OpKind::Substitute, &["ab"], &["ac"]), "S:OTHER");

        let table = HashMap::from([('搾', HashMap::from([('榨', 0.9)]))]);
        let sim = TableCharSimilarity::new(table);
        let op = AlignOp::new(OpKind::Substitute, 0, 1, 0, 1);
        let sides = EditSides::new(&op, &["搾"], &["榨"]);
        assert_eq!(classify(&sides, &sim, 0.5), "S:SPELL");
        assert_eq!(classify(&sides, &sim, 0.95), "S:OTHER");
    }

    #[test]
    fn everything_else_falls_back_to_other() {
        assert_eq!(tag(OpKind::Insert, &[], &["的"]), "M:OTHER");
        assert_eq!(tag(OpKind::Delete, &["很"], &[]), "R:OTHER");
        assert_eq!(tag(OpKind::Substitute, &["猫"], &["狗"]), "S:OTHER");
        assert_eq!(tag(OpKind::Substitute, &["，"], &["狗"]), "S:OTHER");
    }
}
