use std::collections::BTreeMap;
use std::ops::AddAssign;

use rayon::prelude::*;

use crate::config::{CompareConfig, SelectionPolicy};
use crate::scoring::matching::{block_units, PairCounts};
use crate::scoring::selection::{select_by_sentence, select_cumulative, ScoredBlock, SentenceChoice};
use crate::types::{AnnotationBlock, ConfusionCounts, Record};

/// Corpus-level sums of the chosen per-sentence counts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreTotals {
    pub overall: ConfusionCounts,
    pub by_category: BTreeMap<String, ConfusionCounts>,
    /// Sentences that passed the reference-count filter and were scored.
    pub sentences: usize,
}

impl ScoreTotals {
    fn add_pair(&mut self, pair: &PairCounts) {
        self.overall += pair.counts;
        for (category, counts) in &pair.by_category {
            *self.by_category.entry(category.clone()).or_default() += *counts;
        }
        self.sentences += 1;
    }
}

impl AddAssign for ScoreTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.overall += rhs.overall;
        for (category, counts) in rhs.by_category {
            *self.by_category.entry(category).or_default() += counts;
        }
        self.sentences += rhs.sentences;
    }
}

/// A decoded hypothesis record and the reference record of the same sentence.
#[derive(Debug, Clone, Copy)]
pub struct SentencePair<'a> {
    pub index: usize,
    pub hypothesis: &'a Record,
    pub reference: &'a Record,
}

/// Score every sentence and sum the chosen counts. Sentence-level selection
/// runs in parallel; cumulative selection depends on earlier sentences and
/// runs in order.
pub fn score_pairs(pairs: &[SentencePair<'_>], config: &CompareConfig) -> ScoreTotals {
    let beta = config.selection_beta();
    match config.selection {
        SelectionPolicy::Sentence => pairs
            .par_iter()
            .filter_map(|pair| {
                let (hyps, refs) = scored_blocks(pair, config)?;
                let choice = select_by_sentence(&hyps, &refs, beta)?;
                log_choice(pair.index, &choice);
                Some(choice)
            })
            .fold(ScoreTotals::default, |mut totals, choice| {
                totals.add_pair(&choice.pair);
                totals
            })
            .reduce(ScoreTotals::default, |mut a, b| {
                a += b;
                a
            }),
        SelectionPolicy::Cumulative => {
            let mut totals = ScoreTotals::default();
            for pair in pairs {
                let Some((hyps, refs)) = scored_blocks(pair, config) else {
                    continue;
                };
                if let Some(choice) = select_cumulative(&hyps, &refs, totals.overall, beta) {
                    log_choice(pair.index, &choice);
                    totals.add_pair(&choice.pair);
                }
            }
            totals
        }
    }
}

/// Units of every hypothesis block and of the retained reference blocks, or
/// `None` when the sentence is excluded by `reference_num`.
fn scored_blocks(
    pair: &SentencePair<'_>,
    config: &CompareConfig,
) -> Option<(Vec<ScoredBlock>, Vec<ScoredBlock>)> {
    if let Some(required) = config.reference_num {
        if pair.reference.blocks.len() != required {
            return None;
        }
    }
    let to_scored = |block: &AnnotationBlock| ScoredBlock {
        annotator_id: block.annotator_id,
        units: block_units(block, config),
    };
    let hyps = pair.hypothesis.blocks.iter().map(to_scored).collect();
    let refs = pair
        .reference
        .blocks
        .iter()
        .filter(|b| config.max_answer_num.map_or(true, |max| b.annotator_id < max))
        .map(to_scored)
        .collect();
    Some((hyps, refs))
}

fn log_choice(index: usize, choice: &SentenceChoice) {
    tracing::debug!(
        sentence = index,
        hyp_id = choice.hyp_id,
        ref_id = choice.ref_id,
        tp = choice.pair.counts.true_positive,
        fp = choice.pair.counts.false_positive,
        fn_ = choice.pair.counts.false_negative,
        "scoring: selected reference"
    );
}
