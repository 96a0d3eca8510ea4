use std::cmp::Ordering;

use crate::scoring::matching::{compare_units, PairCounts, UnitSet};
use crate::scoring::metrics::f_beta;
use crate::types::ConfusionCounts;

/// Units of one annotation block together with its annotator id.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBlock {
    pub annotator_id: u32,
    pub units: UnitSet,
}

/// The (hypothesis, reference) pair kept for one sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceChoice {
    pub hyp_id: u32,
    pub ref_id: u32,
    pub pair: PairCounts,
}

/// All pairs in selection order: references by ascending id, then hypotheses
/// by ascending id. A side without blocks is scored as one empty block.
fn candidate_pairs(hyps: &[ScoredBlock], refs: &[ScoredBlock]) -> Vec<SentenceChoice> {
    let empty = ScoredBlock {
        annotator_id: 0,
        units: UnitSet::new(),
    };
    let mut refs = sorted_by_id(refs);
    let mut hyps = sorted_by_id(hyps);
    if refs.is_empty() {
        refs.push(&empty);
    }
    if hyps.is_empty() {
        hyps.push(&empty);
    }

    let mut pairs = Vec::with_capacity(refs.len() * hyps.len());
    for r in &refs {
        for h in &hyps {
            pairs.push(SentenceChoice {
                hyp_id: h.annotator_id,
                ref_id: r.annotator_id,
                pair: compare_units(&h.units, &r.units),
            });
        }
    }
    pairs
}

fn sorted_by_id(blocks: &[ScoredBlock]) -> Vec<&ScoredBlock> {
    let mut sorted: Vec<&ScoredBlock> = blocks.iter().collect();
    sorted.sort_by_key(|b| b.annotator_id);
    sorted
}

/// Best pair by the sentence's own Fβ; ties prefer more true positives, then
/// the lowest reference id, then the lowest hypothesis id.
pub fn select_by_sentence(
    hyps: &[ScoredBlock],
    refs: &[ScoredBlock],
    beta: f64,
) -> Option<SentenceChoice> {
    let mut best: Option<(f64, SentenceChoice)> = None;
    for choice in candidate_pairs(hyps, refs) {
        let f = f_beta(choice.pair.counts, beta);
        let better = match &best {
            None => true,
            Some((best_f, best_choice)) => match f.total_cmp(best_f) {
                Ordering::Greater => true,
                Ordering::Equal => {
                    choice.pair.counts.true_positive > best_choice.pair.counts.true_positive
                }
                Ordering::Less => false,
            },
        };
        if better {
            best = Some((f, choice));
        }
    }
    best.map(|(_, choice)| choice)
}

/// Best pair by corpus Fβ once added to the running totals of earlier
/// sentences; ties prefer more true positives, then fewer false positives,
/// then fewer false negatives.
pub fn select_cumulative(
    hyps: &[ScoredBlock],
    refs: &[ScoredBlock],
    totals: ConfusionCounts,
    beta: f64,
) -> Option<SentenceChoice> {
    let mut best: Option<(f64, SentenceChoice)> = None;
    for choice in candidate_pairs(hyps, refs) {
        let c = choice.pair.counts;
        let f = f_beta(totals + c, beta);
        let better = match &best {
            None => true,
            Some((best_f, best_choice)) => {
                let b = best_choice.pair.counts;
                match f.total_cmp(best_f) {
                    Ordering::Greater => true,
                    Ordering::Less => false,
                    Ordering::Equal => (
                        c.true_positive,
                        std::cmp::Reverse(c.false_positive),
                        std::cmp::Reverse(c.false_negative),
                    ) > (
                        b.true_positive,
                        std::cmp::Reverse(b.false_positive),
                        std::cmp::Reverse(b.false_negative),
                    ),
                }
            }
        };
        if better {
            best = Some((f, choice));
        }
    }
    best.map(|(_, choice)| choice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::matching::MatchKey;

    fn block(id: u32, keys: &[(usize, usize, &str)]) -> ScoredBlock {
        let units = keys
            .iter()
            .map(|&(s, e, c)| {
                (
                    MatchKey {
                        start: s,
                        end: e,
                        correction: Some(c.to_string()),
                    },
                    "S:OTHER".to_string(),
                )
            })
            .collect();
        ScoredBlock {
            annotator_id: id,
            units,
        }
    }

    #[test]
    fn exact_reference_wins() {
        let hyp = [block(0, &[(8, 9, ":")])];
        let refs = [block(0, &[(8, 9, "：")]), block(1, &[(8, 9, ":")])];
        let choice = select_by_sentence(&hyp, &refs, 0.5).unwrap();
        assert_eq!(choice.ref_id, 1);
        assert_eq!(choice.pair.counts, ConfusionCounts::new(1, 0, 0));
    }

    #[test]
    fn ties_prefer_true_positives_then_lowest_ids() {
        // Both references give F = 0 for an empty hypothesis; the lower id wins.
        let hyp = [block(0, &[])];
        let refs = [block(1, &[(0, 1, "a")]), block(0, &[(0, 1, "b")])];
        let choice = select_by_sentence(&hyp, &refs, 0.5).unwrap();
        assert_eq!(choice.ref_id, 0);

        let hyps = [block(2, &[(0, 1, "a")]), block(1, &[(0, 1, "a")])];
        let refs = [block(0, &[(0, 1, "a")])];
        let choice = select_by_sentence(&hyps, &refs, 0.5).unwrap();
        assert_eq!(choice.hyp_id, 1);
    }

    #[test]
    fn equal_f_prefers_more_true_positives() {
        let hyp = [block(0, &[(0, 1, "a"), (2, 3, "b")])];
        // F1 = 2/3 against both: (tp 1, fp 1, fn 0) and (tp 2, fp 0, fn 2).
        let refs = [
            block(0, &[(0, 1, "a")]),
            block(1, &[(0, 1, "a"), (2, 3, "b"), (4, 5, "c"), (6, 7, "d")]),
        ];
        let choice = select_by_sentence(&hyp, &refs, 1.0).unwrap();
        assert_eq!(choice.ref_id, 1);
        assert_eq!(choice.pair.counts, ConfusionCounts::new(2, 0, 2));
    }

    #[test]
    fn missing_references_score_against_an_empty_block() {
        let hyp = [block(0, &[(0, 1, "a")])];
        let choice = select_by_sentence(&hyp, &[], 0.5).unwrap();
        assert_eq!(choice.pair.counts, ConfusionCounts::new(0, 1, 0));
    }

    #[test]
    fn cumulative_selection_uses_running_totals() {
        let hyp = [block(0, &[(0, 1, "a")])];
        // ref 0 matches; ref 1 is empty (fp only).
        let refs = [block(0, &[(0, 1, "a"), (2, 3, "x")]), block(1, &[])];
        let sentence = select_by_sentence(&hyp, &refs, 0.5).unwrap();
        assert_eq!(sentence.ref_id, 0);
        let cumulative =
            select_cumulative(&hyp, &refs, ConfusionCounts::new(10, 0, 0), 0.5).unwrap();
        assert_eq!(cumulative.ref_id, 0);
        assert_eq!(cumulative.pair.counts, ConfusionCounts::new(1, 0, 1));
    }
}
