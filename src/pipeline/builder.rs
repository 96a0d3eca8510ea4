use std::sync::Arc;

use crate::alignment::annotator::{EditAligner, EditAlignerParts};
use crate::alignment::cost::OrthographicSimilarity;
use crate::config::{EvalConfig, Granularity};
use crate::error::EvalError;
use crate::pipeline::defaults::{
    CharTokenSource, LevenshteinSequenceAligner, RuleEditMerger, WhitespaceTokenSource,
};
use crate::pipeline::runtime::{Evaluator, EvaluatorParts};
use crate::pipeline::traits::{
    CharSimilarity, EditMerger, ScriptNormalizer, SequenceAligner, TokenSource,
};
use crate::scoring::report::Report;

pub struct EvaluatorBuilder {
    config: EvalConfig,
    token_source: Option<Box<dyn TokenSource>>,
    normalizer: Option<Box<dyn ScriptNormalizer>>,
    char_similarity: Option<Arc<dyn CharSimilarity>>,
    sequence_aligner: Option<Box<dyn SequenceAligner>>,
    edit_merger: Option<Box<dyn EditMerger>>,
}

impl EvaluatorBuilder {
    pub fn new(config: EvalConfig) -> Self {
        Self {
            config,
            token_source: None,
            normalizer: None,
            char_similarity: None,
            sequence_aligner: None,
            edit_merger: None,
        }
    }

    pub fn with_token_source(mut self, token_source: Box<dyn TokenSource>) -> Self {
        self.token_source = Some(token_source);
        self
    }

    pub fn with_script_normalizer(mut self, normalizer: Box<dyn ScriptNormalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn with_char_similarity(mut self, char_similarity: Arc<dyn CharSimilarity>) -> Self {
        self.char_similarity = Some(char_similarity);
        self
    }

    pub fn with_sequence_aligner(mut self, sequence_aligner: Box<dyn SequenceAligner>) -> Self {
        self.sequence_aligner = Some(sequence_aligner);
        self
    }

    pub fn with_edit_merger(mut self, edit_merger: Box<dyn EditMerger>) -> Self {
        self.edit_merger = Some(edit_merger);
        self
    }

    pub fn build(self) -> Result<Evaluator, EvalError> {
        self.config.validate()?;
        let convert = self.config.convert;
        let compare = self.config.compare;

        if convert.normalize_script && self.normalizer.is_none() {
            return Err(EvalError::validation(
                "normalize_script is enabled but no script normalizer was provided",
            ));
        }

        let token_source = match self.token_source {
            Some(token_source) => token_source,
            None => default_token_source(convert.granularity, convert.segmented)?,
        };
        let similarity = self
            .char_similarity
            .unwrap_or_else(|| Arc::new(OrthographicSimilarity));
        let threshold = convert.similarity_threshold;

        let edit_aligner = EditAligner::from_parts(EditAlignerParts {
            sequence_aligner: self.sequence_aligner.unwrap_or_else(|| {
                Box::new(LevenshteinSequenceAligner::new(similarity.clone(), threshold))
            }),
            merger: self.edit_merger.unwrap_or_else(|| {
                Box::new(RuleEditMerger::new(convert.granularity, convert.merge_policy))
            }),
            similarity,
            similarity_threshold: threshold,
            tie_break: convert.tie_break,
        });

        Ok(Evaluator::from_parts(EvaluatorParts {
            convert,
            compare,
            token_source,
            normalizer: self.normalizer,
            edit_aligner,
        }))
    }
}

/// Characters need no model; words do unless the text is pre-segmented.
fn default_token_source(
    granularity: Granularity,
    segmented: bool,
) -> Result<Box<dyn TokenSource>, EvalError> {
    match (granularity, segmented) {
        (Granularity::Char, _) => Ok(Box::new(CharTokenSource)),
        (Granularity::Word, true) => Ok(Box::new(WhitespaceTokenSource)),
        (Granularity::Word, false) => Err(EvalError::validation(
            "word granularity over unsegmented text needs an injected token source",
        )),
    }
}

/// Build a default evaluator from `config` and score hypotheses against
/// references in one call.
pub fn evaluation_report(
    sources: &[String],
    references: &[Vec<String>],
    hypotheses: &[String],
    config: EvalConfig,
) -> Result<Report, EvalError> {
    EvaluatorBuilder::new(config)
        .build()?
        .evaluate(sources, references, hypotheses)
}
