use crate::alignment::levenshtein::{AlignOp, OpKind};

use super::concat;

/// Drop edits whose two sides spell the same text, and shave the shared
/// prefix and suffix off substitutions when token boundaries allow it.
pub(super) fn trim_unchanged(edits: Vec<AlignOp>, src: &[&str], tgt: &[&str]) -> Vec<AlignOp> {
    edits
        .into_iter()
        .filter_map(|edit| {
            let before = concat(&src[edit.src_start..edit.src_end]);
            let after = concat(&tgt[edit.tgt_start..edit.tgt_end]);
            if before == after {
                return None;
            }
            if edit.kind != OpKind::Substitute {
                return Some(edit);
            }
            Some(trim_substitution(edit, &after, src, tgt))
        })
        .collect()
}

fn trim_substitution(edit: AlignOp, after: &str, src: &[&str], tgt: &[&str]) -> AlignOp {
    let mut trimmed = false;

    // Longest run of leading source tokens that spells a prefix of the target side.
    let mut common = String::new();
    let mut src_prefix_end = edit.src_start;
    for i in edit.src_start..edit.src_end {
        let candidate = format!("{common}{}", src[i]);
        if !after.starts_with(&candidate) {
            break;
        }
        common = candidate;
        src_prefix_end = i + 1;
    }
    let (mut src_start, mut tgt_start) = (edit.src_start, edit.tgt_start);
    if !common.is_empty() {
        let from_front = (edit.tgt_start..edit.tgt_end).map(|j| (j + 1, tgt[j]));
        if let Some(tgt_prefix_end) = tokens_spelling(&common, from_front) {
            src_start = src_prefix_end;
            tgt_start = tgt_prefix_end;
            trimmed = true;
        }
    }

    let mut common = String::new();
    let mut src_suffix_start = edit.src_end;
    for i in (src_start..edit.src_end).rev() {
        let candidate = format!("{}{common}", src[i]);
        if !after.ends_with(&candidate) {
            break;
        }
        common = candidate;
        src_suffix_start = i;
    }
    let (mut src_end, mut tgt_end) = (edit.src_end, edit.tgt_end);
    if !common.is_empty() {
        let from_back = (tgt_start..edit.tgt_end).rev().map(|j| (j, tgt[j]));
        if let Some(tgt_suffix_start) = tokens_spelling_rev(&common, from_back) {
            src_end = src_suffix_start;
            tgt_end = tgt_suffix_start;
            trimmed = true;
        }
    }

    if !trimmed {
        return edit;
    }
    let kind = if src_start == src_end {
        OpKind::Insert
    } else if tgt_start == tgt_end {
        OpKind::Delete
    } else {
        OpKind::Substitute
    };
    AlignOp::new(kind, src_start, src_end, tgt_start, tgt_end)
}

/// Accumulate tokens front to back until they spell `text` exactly; yields
/// the boundary recorded with the last token consumed.
fn tokens_spelling<'a>(text: &str, tokens: impl Iterator<Item = (usize, &'a str)>) -> Option<usize> {
    let mut acc = String::new();
    for (boundary, token) in tokens {
        acc.push_str(token);
        if acc == text {
            return Some(boundary);
        }
        if acc.len() > text.len() {
            break;
        }
    }
    None
}

/// Same as [`tokens_spelling`], accumulating back to front.
fn tokens_spelling_rev<'a>(text: &str, tokens: impl Iterator<Item = (usize, &'a str)>) -> Option<usize> {
    let mut acc = String::new();
    for (boundary, token) in tokens {
        acc.insert_str(0, token);
        if acc == text {
            return Some(boundary);
        }
        if acc.len() > text.len() {
            break;
        }
    }
    None
}
