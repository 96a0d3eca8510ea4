use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::error::EvalError;
use crate::pipeline::traits::TokenSource;
use crate::types::{tokens_from_texts, Token};

/// Sentence → tokens memo for one evaluation call. Each distinct sentence is
/// segmented once; batches go to the token source in parallel and land in
/// the map in whatever order they finish.
#[derive(Debug, Default)]
pub struct SegmentationCache {
    tokens: HashMap<String, Vec<String>>,
}

impl SegmentationCache {
    pub fn populate<'a>(
        sentences: impl IntoIterator<Item = &'a String>,
        source: &dyn TokenSource,
        batch_size: usize,
    ) -> Result<Self, EvalError> {
        let mut seen = HashSet::new();
        let unique: Vec<String> = sentences
            .into_iter()
            .filter(|s| seen.insert(s.as_str()))
            .cloned()
            .collect();

        let batches: Vec<Vec<(String, Vec<String>)>> = unique
            .par_chunks(batch_size.max(1))
            .map(|batch| {
                let segmented = source.segment(batch)?;
                if segmented.len() != batch.len() {
                    return Err(EvalError::dependency(
                        "segmenting sentences",
                        format!(
                            "token source returned {} results for {} sentences",
                            segmented.len(),
                            batch.len()
                        ),
                    ));
                }
                Ok(batch.iter().cloned().zip(segmented).collect())
            })
            .collect::<Result<_, _>>()?;

        let tokens: HashMap<_, _> = batches.into_iter().flatten().collect();
        tracing::debug!(
            unique = tokens.len(),
            batch_size,
            "segmentation cache populated"
        );
        Ok(Self { tokens })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, sentence: &str) -> Option<&[String]> {
        self.tokens.get(sentence).map(Vec::as_slice)
    }

    /// Numbered tokens of a sentence that was part of the populated set.
    pub fn tokens(&self, sentence: &str) -> Result<Vec<Token>, EvalError> {
        self.get(sentence)
            .map(tokens_from_texts)
            .ok_or_else(|| {
                EvalError::dependency(
                    "looking up segmentation",
                    format!("sentence {sentence:?} was never segmented"),
                )
            })
    }
}
