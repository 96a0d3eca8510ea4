use crate::alignment::levenshtein::AlignOp;
use crate::error::EvalError;

/// Splits sentences into tokens. Called with whole batches so that
/// model-backed segmenters can amortize their setup.
pub trait TokenSource: Send + Sync {
    /// Must return exactly one token list per input sentence, in order.
    fn segment(&self, sentences: &[String]) -> Result<Vec<Vec<String>>, EvalError>;
}

/// Maps text to a canonical script, e.g. traditional to simplified Chinese.
pub trait ScriptNormalizer: Send + Sync {
    fn normalize(&self, text: &str) -> String;
}

/// Similarity of two characters in `[0, 1]`.
pub trait CharSimilarity: Send + Sync {
    fn similarity(&self, a: char, b: char) -> f64;
}

/// Every cheapest alignment of two token sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct CheapestAlignments {
    pub cost: f64,
    /// Paths in enumeration order; never empty.
    pub paths: Vec<Vec<AlignOp>>,
}

pub trait SequenceAligner: Send + Sync {
    fn align_paths(
        &self,
        src: &[&str],
        tgt: &[&str],
        first_only: bool,
    ) -> Result<CheapestAlignments, EvalError>;
}

pub trait EditMerger: Send + Sync {
    fn merge(&self, path: &[AlignOp], src: &[&str], tgt: &[&str]) -> Vec<AlignOp>;
}
