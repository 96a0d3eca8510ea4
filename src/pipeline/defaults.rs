use std::sync::Arc;

use crate::alignment::levenshtein::{build_cost_table, cheapest_paths, AlignOp, MAX_CHEAPEST_PATHS};
use crate::alignment::merging::merge_alignment;
use crate::alignment::tokenization::{split_chars, split_whitespace};
use crate::config::{Granularity, MergePolicy};
use crate::error::EvalError;
use crate::pipeline::traits::{
    CharSimilarity, CheapestAlignments, EditMerger, SequenceAligner, TokenSource,
};

/// One token per character, ASCII alphanumeric runs kept whole.
pub struct CharTokenSource;

impl TokenSource for CharTokenSource {
    fn segment(&self, sentences: &[String]) -> Result<Vec<Vec<String>>, EvalError> {
        Ok(sentences.iter().map(|s| split_chars(s)).collect())
    }
}

/// For text that already carries word boundaries as whitespace.
pub struct WhitespaceTokenSource;

impl TokenSource for WhitespaceTokenSource {
    fn segment(&self, sentences: &[String]) -> Result<Vec<Vec<String>>, EvalError> {
        Ok(sentences.iter().map(|s| split_whitespace(s)).collect())
    }
}

pub struct LevenshteinSequenceAligner {
    similarity: Arc<dyn CharSimilarity>,
    threshold: f64,
    path_limit: usize,
}

impl LevenshteinSequenceAligner {
    pub fn new(similarity: Arc<dyn CharSimilarity>, threshold: f64) -> Self {
        Self {
            similarity,
            threshold,
            path_limit: MAX_CHEAPEST_PATHS,
        }
    }

    pub fn with_path_limit(mut self, path_limit: usize) -> Self {
        self.path_limit = path_limit.max(1);
        self
    }
}

impl SequenceAligner for LevenshteinSequenceAligner {
    fn align_paths(
        &self,
        src: &[&str],
        tgt: &[&str],
        first_only: bool,
    ) -> Result<CheapestAlignments, EvalError> {
        let table = build_cost_table(src, tgt, self.similarity.as_ref(), self.threshold);
        let paths = cheapest_paths(&table, first_only, self.path_limit);
        Ok(CheapestAlignments {
            cost: table.total_cost(),
            paths,
        })
    }
}

pub struct RuleEditMerger {
    granularity: Granularity,
    policy: MergePolicy,
}

impl RuleEditMerger {
    pub fn new(granularity: Granularity, policy: MergePolicy) -> Self {
        Self {
            granularity,
            policy,
        }
    }
}

impl EditMerger for RuleEditMerger {
    fn merge(&self, path: &[AlignOp], src: &[&str], tgt: &[&str]) -> Vec<AlignOp> {
        merge_alignment(path, src, tgt, self.granularity, self.policy)
    }
}
