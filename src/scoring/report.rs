use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::EvalError;
use crate::scoring::aggregate::ScoreTotals;
use crate::scoring::metrics::{compute_scores, f_key};
use crate::types::ConfusionCounts;

/// Report key of the corpus-wide row; no category bucket may use it.
pub const OVERALL_KEY: &str = "overall";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub true_positive: u64,
    pub false_positive: u64,
    pub false_negative: u64,
    pub support: u64,
    /// Precision and recall do not depend on β.
    pub precision: f64,
    pub recall: f64,
    /// `f{β}` → Fβ, one entry per requested β.
    #[serde(flatten)]
    pub f_scores: BTreeMap<String, f64>,
}

impl MetricRow {
    pub fn from_counts(counts: ConfusionCounts, betas: &[f64]) -> Self {
        let base = compute_scores(counts, betas.first().copied().unwrap_or(1.0));
        let f_scores = betas
            .iter()
            .map(|&beta| (f_key(beta), compute_scores(counts, beta).f_beta))
            .collect();
        Self {
            true_positive: counts.true_positive,
            false_positive: counts.false_positive,
            false_negative: counts.false_negative,
            support: counts.support(),
            precision: base.precision,
            recall: base.recall,
            f_scores,
        }
    }

    pub fn f(&self, beta: f64) -> Option<f64> {
        self.f_scores.get(&f_key(beta)).copied()
    }
}

/// Which stream a skipped record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Hypothesis,
    Reference,
    /// Both records decoded but describe different source sentences.
    Pair,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub side: Side,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// `overall` plus one row per category bucket when requested.
    pub metrics: BTreeMap<String, MetricRow>,
    pub betas: Vec<f64>,
    pub sentence_count: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl Report {
    pub fn overall(&self) -> Option<&MetricRow> {
        self.metrics.get(OVERALL_KEY)
    }

    pub fn category(&self, name: &str) -> Option<&MetricRow> {
        if name == OVERALL_KEY {
            return None;
        }
        self.metrics.get(name)
    }
}

pub fn build_report(
    totals: &ScoreTotals,
    betas: &[f64],
    with_categories: bool,
    skipped: Vec<SkippedRecord>,
) -> Report {
    let mut metrics = BTreeMap::new();
    metrics.insert(
        OVERALL_KEY.to_string(),
        MetricRow::from_counts(totals.overall, betas),
    );
    if with_categories {
        for (category, counts) in &totals.by_category {
            metrics.insert(category.clone(), MetricRow::from_counts(*counts, betas));
        }
    }
    Report {
        metrics,
        betas: betas.to_vec(),
        sentence_count: totals.sentences,
        skipped,
    }
}

/// Pretty JSON with a trailing newline; parent directories are created.
pub fn write_report(path: &Path, report: &Report) -> Result<(), EvalError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| EvalError::io("create report directory", e))?;
    }
    let mut file = File::create(path).map_err(|e| EvalError::io("create report file", e))?;
    serde_json::to_writer_pretty(&mut file, report)
        .map_err(|e| EvalError::json("serialize report", e))?;
    file.write_all(b"\n")
        .map_err(|e| EvalError::io("finalize report file", e))?;
    Ok(())
}
