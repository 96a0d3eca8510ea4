use crate::alignment::levenshtein::{AlignOp, OpKind};
use crate::alignment::tokenization::is_punctuation;
use crate::config::{Granularity, MergePolicy};

use super::span_of;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunKey {
    Match,
    Transpose,
    Change,
}

fn run_key(kind: OpKind) -> RunKey {
    match kind {
        OpKind::Match => RunKey::Match,
        OpKind::Transpose(_) => RunKey::Transpose,
        _ => RunKey::Change,
    }
}

/// Split the path into maximal runs of matches, transpositions and other
/// changes, then coalesce each run. Merged match runs stay in the output so
/// that reordering detection can see what sits between two changes.
pub(super) fn group_runs(
    path: &[AlignOp],
    src: &[&str],
    tgt: &[&str],
    granularity: Granularity,
    policy: MergePolicy,
) -> Vec<AlignOp> {
    let mut edits = Vec::with_capacity(path.len());
    let mut start = 0;
    while start < path.len() {
        let key = run_key(path[start].kind);
        let end = path[start..]
            .iter()
            .position(|op| run_key(op.kind) != key)
            .map_or(path.len(), |offset| start + offset);
        let run = &path[start..end];

        match key {
            RunKey::Transpose => edits.extend_from_slice(run),
            RunKey::Match => edits.push(span_of(run, OpKind::Match)),
            RunKey::Change => match policy {
                MergePolicy::Segmented => edits.extend(coalesce_run(run, granularity)),
                MergePolicy::Raw => {
                    for sub_run in split_on_punctuation(run, src, tgt) {
                        edits.extend(coalesce_run(sub_run, granularity));
                    }
                }
            },
        }
        start = end;
    }
    edits
}

/// Coalesce a run of substitutions, insertions and deletions.
fn coalesce_run(run: &[AlignOp], granularity: Granularity) -> Vec<AlignOp> {
    if run.len() <= 1 {
        return run.to_vec();
    }
    let all = |kind: OpKind| run.iter().all(|op| op.kind == kind);

    if all(OpKind::Delete) {
        return vec![span_of(run, OpKind::Delete)];
    }
    if all(OpKind::Insert) {
        return vec![span_of(run, OpKind::Insert)];
    }
    if all(OpKind::Substitute) && granularity == Granularity::Word {
        return run.to_vec();
    }
    vec![span_of(run, OpKind::Substitute)]
}

/// Break a run wherever it switches between punctuation-only and other ops.
fn split_on_punctuation<'a>(
    run: &'a [AlignOp],
    src: &[&str],
    tgt: &[&str],
) -> Vec<&'a [AlignOp]> {
    let touches_punct = |op: &AlignOp| {
        let tokens = src[op.src_start..op.src_end]
            .iter()
            .chain(&tgt[op.tgt_start..op.tgt_end]);
        tokens.clone().next().is_some() && tokens.into_iter().all(|t| is_punctuation(t))
    };

    let mut pieces = Vec::new();
    let mut start = 0;
    for i in 1..=run.len() {
        if i == run.len() || touches_punct(&run[i]) != touches_punct(&run[start]) {
            pieces.push(&run[start..i]);
            start = i;
        }
    }
    pieces
}
