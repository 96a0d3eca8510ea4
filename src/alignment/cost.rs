use std::collections::HashMap;
use std::path::Path;

use crate::alignment::tokenization::is_punctuation;
use crate::error::EvalError;
use crate::pipeline::traits::CharSimilarity;

pub const INSERTION_COST: f64 = 1.0;
pub const DELETION_COST: f64 = 1.0;

/// Both tokens are punctuation.
const PUNCT_PAIR_COST: f64 = 0.0;
/// Neither token is punctuation.
const CONTENT_PAIR_COST: f64 = 0.25;
/// Exactly one token is punctuation. Kept under 0.5 so that a substitution
/// never costs as much as a deletion plus an insertion.
const MIXED_PAIR_COST: f64 = 0.499;

/// Case and full-width/half-width folding; everything else is dissimilar.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrthographicSimilarity;

impl CharSimilarity for OrthographicSimilarity {
    fn similarity(&self, a: char, b: char) -> f64 {
        let (a, b) = (fold_width(a), fold_width(b));
        if a == b || a.to_lowercase().eq(b.to_lowercase()) {
            1.0
        } else {
            0.0
        }
    }
}

fn fold_width(c: char) -> char {
    match c {
        '\u{3000}' => ' ',
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        _ => c,
    }
}

/// Look-alike / sound-alike table layered over [`OrthographicSimilarity`].
#[derive(Debug, Clone, Default)]
pub struct TableCharSimilarity {
    table: HashMap<char, HashMap<char, f64>>,
}

impl TableCharSimilarity {
    pub fn new(table: HashMap<char, HashMap<char, f64>>) -> Self {
        Self { table }
    }

    /// Reads `{"搾": {"榨": 0.9}, ...}`. Keys longer than one character are skipped.
    pub fn load(path: &Path) -> Result<Self, EvalError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| EvalError::io("read similarity table", e))?;
        let raw: HashMap<String, HashMap<String, f64>> = serde_json::from_str(&data)
            .map_err(|e| EvalError::json("parse similarity table", e))?;

        let table = raw
            .into_iter()
            .filter_map(|(k, row)| {
                let c = single_char(&k)?;
                let row = row
                    .into_iter()
                    .filter_map(|(k, v)| Some((single_char(&k)?, v)))
                    .collect::<HashMap<_, _>>();
                Some((c, row))
            })
            .collect();
        Ok(Self { table })
    }

    fn lookup(&self, a: char, b: char) -> Option<f64> {
        self.table.get(&a).and_then(|row| row.get(&b)).copied()
    }
}

impl CharSimilarity for TableCharSimilarity {
    fn similarity(&self, a: char, b: char) -> f64 {
        let base = OrthographicSimilarity.similarity(a, b);
        let table = self
            .lookup(a, b)
            .into_iter()
            .chain(self.lookup(b, a))
            .fold(0.0f64, f64::max);
        base.max(table)
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut it = s.chars();
    let c = it.next()?;
    if it.next().is_some() {
        return None;
    }
    Some(c)
}

/// Number of characters of `a` that have a look-alike somewhere in `b`.
pub(crate) fn similar_char_count(
    a: &str,
    b: &str,
    similarity: &dyn CharSimilarity,
    threshold: f64,
) -> usize {
    a.chars()
        .filter(|&ca| b.chars().any(|cb| similarity.similarity(ca, cb) >= threshold))
        .count()
}

/// Cost of substituting token `a` by token `b`; 0 for identical tokens and
/// always below `INSERTION_COST + DELETION_COST`.
pub fn substitution_cost(
    a: &str,
    b: &str,
    similarity: &dyn CharSimilarity,
    threshold: f64,
) -> f64 {
    if a == b {
        return 0.0;
    }
    let class_cost = match (is_punctuation(a), is_punctuation(b)) {
        (true, true) => PUNCT_PAIR_COST,
        (false, false) => CONTENT_PAIR_COST,
        _ => MIXED_PAIR_COST,
    };
    let len = a.chars().count();
    let shape_cost = if len == 0 {
        0.5
    } else {
        let similar = similar_char_count(a, b, similarity, threshold);
        (len - similar) as f64 / (2 * len) as f64
    };
    class_cost + shape_cost
}
