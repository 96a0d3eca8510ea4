use crate::types::ConfusionCounts;

/// Precision, recall and Fβ of one set of counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub precision: f64,
    pub recall: f64,
    pub f_beta: f64,
}

/// `p = tp / (tp + fp)`, `r = tp / (tp + fn)`,
/// `Fβ = (1 + β²)·p·r / (β²·p + r)`; each is 0 when its denominator is 0.
pub fn compute_scores(counts: ConfusionCounts, beta: f64) -> Scores {
    let tp = counts.true_positive as f64;
    let precision = ratio(tp, tp + counts.false_positive as f64);
    let recall = ratio(tp, tp + counts.false_negative as f64);
    let beta_sq = beta * beta;
    let f_beta = ratio(
        (1.0 + beta_sq) * precision * recall,
        beta_sq * precision + recall,
    );
    Scores {
        precision,
        recall,
        f_beta,
    }
}

pub fn f_beta(counts: ConfusionCounts, beta: f64) -> f64 {
    compute_scores(counts, beta).f_beta
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Report key for a β value: `f0.5`, `f1`, `f2`.
pub fn f_key(beta: f64) -> String {
    format!("f{beta}")
}
