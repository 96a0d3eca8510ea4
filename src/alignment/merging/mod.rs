use crate::alignment::levenshtein::AlignOp;
use crate::config::{Granularity, MergePolicy};

mod reorder;
mod runs;
mod trim;

/// Turn one cheapest alignment path into coalesced edits.
///
/// Matches are consumed; the result holds only substitution, insertion,
/// deletion and transposition ops, ordered by source position.
pub fn merge_alignment(
    path: &[AlignOp],
    src: &[&str],
    tgt: &[&str],
    granularity: Granularity,
    policy: MergePolicy,
) -> Vec<AlignOp> {
    let grouped = runs::group_runs(path, src, tgt, granularity, policy);
    let reordered = reorder::detect_reorderings(&grouped, src, tgt);
    let trimmed = trim::trim_unchanged(reordered, src, tgt);

    tracing::debug!(
        path_len = path.len(),
        grouped = grouped.len(),
        edits = trimmed.len(),
        "merging: coalesced alignment path"
    );
    trimmed
}

/// Span covering a contiguous group of ops, tagged with `kind`.
pub(super) fn span_of(group: &[AlignOp], kind: crate::alignment::levenshtein::OpKind) -> AlignOp {
    let first = group[0];
    let last = group[group.len() - 1];
    AlignOp::new(kind, first.src_start, last.src_end, first.tgt_start, last.tgt_end)
}

pub(super) fn concat(tokens: &[&str]) -> String {
    tokens.concat()
}
