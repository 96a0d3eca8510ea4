use strsim::levenshtein;

use crate::alignment::levenshtein::{AlignOp, OpKind};
use crate::alignment::tokenization::is_punctuation;

use super::{concat, span_of};

/// Collapse `S M S` swaps and `D M I` / `I M D` moves into transpositions and
/// drop the remaining match runs.
pub(super) fn detect_reorderings(edits: &[AlignOp], src: &[&str], tgt: &[&str]) -> Vec<AlignOp> {
    let mut out = Vec::with_capacity(edits.len());
    let mut i = 0;
    while i < edits.len() {
        if let Some(window) = edits.get(i..i + 3) {
            if is_reordering(window, src, tgt) {
                let width = window[2].src_end - window[0].src_start;
                out.push(span_of(window, OpKind::Transpose(width)));
                i += 3;
                continue;
            }
        }
        if !edits[i].kind.is_match() {
            out.push(edits[i]);
        }
        i += 1;
    }
    out
}

fn is_reordering(window: &[AlignOp], src: &[&str], tgt: &[&str]) -> bool {
    let (first, middle, last) = (window[0].kind, window[1].kind, window[2].kind);
    let bridged = middle.is_match() || middle.is_transpose();
    match (first, last) {
        (OpKind::Substitute, OpKind::Substitute) if middle.is_match() => {
            is_swap(&window[0], &window[2], src, tgt)
        }
        (OpKind::Delete, OpKind::Insert) if bridged => {
            is_move(src_text(&window[0], src), tgt_text(&window[2], tgt))
        }
        (OpKind::Insert, OpKind::Delete) if bridged => {
            is_move(src_text(&window[2], src), tgt_text(&window[0], tgt))
        }
        _ => false,
    }
}

fn src_text(op: &AlignOp, src: &[&str]) -> String {
    concat(&src[op.src_start..op.src_end])
}

fn tgt_text(op: &AlignOp, tgt: &[&str]) -> String {
    concat(&tgt[op.tgt_start..op.tgt_end])
}

/// Two substitutions around a match that exchange their contents.
fn is_swap(first: &AlignOp, last: &AlignOp, src: &[&str], tgt: &[&str]) -> bool {
    let w1 = src_text(first, src);
    let w2 = tgt_text(first, tgt);
    let w3 = src_text(last, src);
    let w4 = tgt_text(last, tgt);
    let shortest = [&w1, &w2, &w3, &w4]
        .iter()
        .map(|w| w.chars().count())
        .min()
        .unwrap_or(0);
    if shortest == 1 {
        w1 == w4 && w2 == w3
    } else {
        levenshtein(&w1, &w4) <= 1 && levenshtein(&w2, &w3) <= 1
    }
}

/// A deleted span re-inserted elsewhere, allowing one character of drift or
/// a rotation of equal-length text.
fn is_move(deleted: String, inserted: String) -> bool {
    let (a, b) = if deleted.chars().count() >= inserted.chars().count() {
        (deleted, inserted)
    } else {
        (inserted, deleted)
    };
    if is_punctuation(&a) || is_punctuation(&b) {
        return false;
    }
    let (len_a, len_b) = (a.chars().count(), b.chars().count());
    if len_a - len_b > 1 {
        return false;
    }
    if len_b == 1 {
        return a == b;
    }
    levenshtein(&a, &b) <= 1 || (len_a == len_b && a.repeat(2).contains(&b))
}
