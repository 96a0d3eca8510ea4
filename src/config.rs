use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::EvalError;
use crate::scoring::report::OVERALL_KEY;

/// Unit the aligner works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Char,
    Word,
}

/// Choice among equally cheap alignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Keep the tied alignment that yields the fewest edits.
    #[default]
    Fewest,
    /// Keep every distinct tied edit list, one annotation block each.
    All,
    /// Follow the first cheapest operation at every cell.
    First,
}

/// How punctuation-only operations inside a run of changes are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    #[default]
    Segmented,
    Raw,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coarsening {
    /// Keep tags as produced, e.g. `S:SPELL`.
    #[default]
    Full,
    /// Operation prefix only, e.g. `S`.
    Operation,
    /// Kind suffix only, e.g. `SPELL`; tags without a suffix are kept.
    Kind,
    /// Explicit tag → bucket map; unmapped tags are kept.
    Mapping(BTreeMap<String, String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
    /// Match on span and replacement text.
    #[default]
    Correction,
    /// Match on span only.
    Span,
    /// Match per source token touched by an edit.
    Token,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Best Fβ of the sentence alone; ties prefer more true positives, then the lowest annotator id.
    #[default]
    Sentence,
    /// Best corpus Fβ given the running totals of previous sentences.
    Cumulative,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub granularity: Granularity,
    /// Input text is already segmented with whitespace.
    pub segmented: bool,
    pub tie_break: TieBreak,
    pub merge_policy: MergePolicy,
    /// Apply the injected script normalizer to target texts.
    pub normalize_script: bool,
    pub batch_size: usize,
    /// Character similarity above which two characters count as look-alikes.
    pub similarity_threshold: f64,
}

impl ConvertConfig {
    pub const DEFAULT_BATCH_SIZE: usize = 128;
    pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.5;
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::Char,
            segmented: false,
            tie_break: TieBreak::Fewest,
            merge_policy: MergePolicy::Segmented,
            normalize_script: false,
            batch_size: Self::DEFAULT_BATCH_SIZE,
            similarity_threshold: Self::DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    pub betas: Vec<f64>,
    /// Emit per-category rows in the report.
    pub categories: bool,
    pub coarsening: Coarsening,
    pub detection: DetectionMode,
    pub selection: SelectionPolicy,
    /// Only single-token edits are scored.
    pub single: bool,
    /// Only multi-token edits are scored.
    pub multi: bool,
    pub ignore_categories: Vec<String>,
    /// Keep only references with annotator id below this bound.
    pub max_answer_num: Option<u32>,
    /// Score only sentences with exactly this many references.
    pub reference_num: Option<usize>,
}

impl CompareConfig {
    pub const DEFAULT_BETA: f64 = 0.5;

    /// β used for selecting the best reference.
    pub fn selection_beta(&self) -> f64 {
        self.betas.first().copied().unwrap_or(Self::DEFAULT_BETA)
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            betas: vec![Self::DEFAULT_BETA],
            categories: false,
            coarsening: Coarsening::Full,
            detection: DetectionMode::Correction,
            selection: SelectionPolicy::Sentence,
            single: false,
            multi: false,
            ignore_categories: Vec::new(),
            max_answer_num: None,
            reference_num: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub convert: ConvertConfig,
    pub compare: CompareConfig,
}

impl EvalConfig {
    pub fn load(path: &Path) -> Result<Self, EvalError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| EvalError::io("read evaluation config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| EvalError::json("parse evaluation config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EvalError> {
        if self.convert.batch_size == 0 {
            return Err(EvalError::validation("batch_size must be >= 1"));
        }
        let threshold = self.convert.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(EvalError::validation(format!(
                "similarity_threshold must lie in [0, 1], got {threshold}"
            )));
        }
        validate_betas(&self.compare.betas)?;
        if self.compare.single && self.compare.multi {
            return Err(EvalError::validation(
                "`single` and `multi` edit filters are mutually exclusive",
            ));
        }
        if let Coarsening::Mapping(map) = &self.compare.coarsening {
            if map.values().any(|bucket| bucket == OVERALL_KEY) {
                return Err(EvalError::validation(format!(
                    "category bucket name '{OVERALL_KEY}' is reserved"
                )));
            }
        }
        Ok(())
    }
}

pub(crate) fn validate_betas(betas: &[f64]) -> Result<(), EvalError> {
    if betas.is_empty() {
        return Err(EvalError::validation("at least one beta is required"));
    }
    if let Some(beta) = betas.iter().find(|b| !b.is_finite() || **b <= 0.0) {
        return Err(EvalError::validation(format!(
            "beta must be a positive finite number, got {beta}"
        )));
    }
    Ok(())
}
