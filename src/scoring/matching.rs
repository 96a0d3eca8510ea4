use std::collections::BTreeMap;

use crate::config::{Coarsening, CompareConfig, DetectionMode};
use crate::types::{AnnotationBlock, ConfusionCounts, Edit};

/// Category that is never scored in correction mode.
pub const UNKNOWN_CATEGORY: &str = "UNK";

/// What two edits must share to match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchKey {
    pub start: usize,
    pub end: usize,
    /// Replacement text; `None` in the detection modes.
    pub correction: Option<String>,
}

/// Scored units of one block, keyed for matching, valued by category.
/// Units sharing a key collapse into the first one.
pub type UnitSet = BTreeMap<MatchKey, String>;

/// Turn a block into its scoring units under the configured filters and
/// detection mode. Noop edits produce no unit.
pub fn block_units(block: &AnnotationBlock, config: &CompareConfig) -> UnitSet {
    let mut units = UnitSet::new();
    for edit in block.corrections() {
        if !keep_edit(edit, config) {
            continue;
        }
        let category = coarsen(&edit.category, &config.coarsening);
        for key in unit_keys(edit, config.detection) {
            units.entry(key).or_insert_with(|| category.clone());
        }
    }
    units
}

fn keep_edit(edit: &Edit, config: &CompareConfig) -> bool {
    if config.detection == DetectionMode::Correction && edit.category == UNKNOWN_CATEGORY {
        return false;
    }
    if config.ignore_categories.iter().any(|c| *c == edit.category) {
        return false;
    }
    let single = edit.span.len() <= 1 && edit.replacement.len() <= 1;
    if config.single && !single {
        return false;
    }
    if config.multi && single {
        return false;
    }
    true
}

fn unit_keys(edit: &Edit, detection: DetectionMode) -> Vec<MatchKey> {
    let span = edit.span;
    match detection {
        DetectionMode::Correction => vec![MatchKey {
            start: span.start,
            end: span.end,
            correction: Some(edit.replacement_text()),
        }],
        DetectionMode::Span => vec![MatchKey {
            start: span.start,
            end: span.end,
            correction: None,
        }],
        // An insertion affects the token on its right.
        DetectionMode::Token if span.is_empty() => vec![MatchKey {
            start: span.start,
            end: span.start + 1,
            correction: None,
        }],
        DetectionMode::Token => (span.start..span.end)
            .map(|t| MatchKey {
                start: t,
                end: t + 1,
                correction: None,
            })
            .collect(),
    }
}

/// Map a tag to its reporting bucket.
pub fn coarsen(category: &str, coarsening: &Coarsening) -> String {
    match coarsening {
        Coarsening::Full => category.to_string(),
        Coarsening::Operation => category
            .split_once(':')
            .map_or(category, |(op, _)| op)
            .to_string(),
        Coarsening::Kind => category
            .split_once(':')
            .map_or(category, |(_, kind)| kind)
            .to_string(),
        Coarsening::Mapping(map) => map
            .get(category)
            .cloned()
            .unwrap_or_else(|| category.to_string()),
    }
}

/// Counts of one hypothesis block against one reference block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PairCounts {
    pub counts: ConfusionCounts,
    pub by_category: BTreeMap<String, ConfusionCounts>,
}

/// Matched hypothesis units are true positives and unmatched ones false
/// positives, both under the hypothesis category; unmatched reference units
/// are false negatives under the reference category.
pub fn compare_units(hyp: &UnitSet, reference: &UnitSet) -> PairCounts {
    let mut out = PairCounts::default();
    for (key, category) in hyp {
        let delta = if reference.contains_key(key) {
            ConfusionCounts::new(1, 0, 0)
        } else {
            ConfusionCounts::new(0, 1, 0)
        };
        out.add(category, delta);
    }
    for (key, category) in reference {
        if !hyp.contains_key(key) {
            out.add(category, ConfusionCounts::new(0, 0, 1));
        }
    }
    out
}

impl PairCounts {
    fn add(&mut self, category: &str, delta: ConfusionCounts) {
        self.counts += delta;
        *self.by_category.entry(category.to_string()).or_default() += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{tokens_from_texts, Span};

    fn edit(start: usize, end: usize, cor: &[&str], cat: &str) -> Edit {
        Edit::new(Span::new(start, end), tokens_from_texts(cor), cat)
    }

    fn units(edits: Vec<Edit>, config: &CompareConfig) -> UnitSet {
        block_units(&AnnotationBlock::new(0, edits), config)
    }

    #[test]
    fn category_is_ignored_when_matching() {
        let config = CompareConfig::default();
        let hyp = units(vec![edit(2, 3, &["榨"], "S:SPELL")], &config);
        let reference = units(vec![edit(2, 3, &["榨"], "S:OTHER"), edit(5, 5, &["的"], "M:OTHER")], &config);
        let pair = compare_units(&hyp, &reference);
        assert_eq!(pair.counts, ConfusionCounts::new(1, 0, 1));
        assert_eq!(pair.by_category["S:SPELL"], ConfusionCounts::new(1, 0, 0));
        assert_eq!(pair.by_category["M:OTHER"], ConfusionCounts::new(0, 0, 1));
        assert!(!pair.by_category.contains_key("S:OTHER"));
    }

    #[test]
    fn different_replacements_do_not_match() {
        let config = CompareConfig::default();
        let hyp = units(vec![edit(2, 3, &["炸"], "S:OTHER")], &config);
        let reference = units(vec![edit(2, 3, &["榨"], "S:OTHER")], &config);
        assert_eq!(compare_units(&hyp, &reference).counts, ConfusionCounts::new(0, 1, 1));

        let span_only = CompareConfig {
            detection: DetectionMode::Span,
            ..CompareConfig::default()
        };
        let hyp = units(vec![edit(2, 3, &["炸"], "S:OTHER")], &span_only);
        let reference = units(vec![edit(2, 3, &["榨"], "S:OTHER")], &span_only);
        assert_eq!(compare_units(&hyp, &reference).counts, ConfusionCounts::new(1, 0, 0));
    }

    #[test]
    fn noop_blocks_produce_no_units() {
        let config = CompareConfig::default();
        assert!(block_units(&AnnotationBlock::noop(0), &config).is_empty());
    }

    #[test]
    fn token_mode_splits_spans_and_points_insertions_right() {
        let config = CompareConfig {
            detection: DetectionMode::Token,
            ..CompareConfig::default()
        };
        let set = units(vec![edit(1, 1, &["在"], "M:OTHER"), edit(3, 5, &[], "R:OTHER")], &config);
        let starts: Vec<_> = set.keys().map(|k| (k.start, k.end)).collect();
        assert_eq!(starts, vec![(1, 2), (3, 4), (4, 5)]);
    }

    #[test]
    fn filters_drop_edits() {
        let edits = vec![
            edit(0, 1, &["a"], "S:OTHER"),
            edit(2, 4, &["b"], "S:OTHER"),
            edit(5, 6, &["c"], "UNK"),
            edit(7, 8, &["d"], "W"),
        ];
        let single = CompareConfig { single: true, ..CompareConfig::default() };
        assert_eq!(units(edits.clone(), &single).len(), 2);

        let multi = CompareConfig { multi: true, ..CompareConfig::default() };
        assert_eq!(units(edits.clone(), &multi).len(), 1);

        let ignore = CompareConfig {
            ignore_categories: vec!["W".to_string()],
            ..CompareConfig::default()
        };
        assert_eq!(units(edits.clone(), &ignore).len(), 2);

        let span = CompareConfig { detection: DetectionMode::Span, ..CompareConfig::default() };
        assert_eq!(units(edits, &span).len(), 4);
    }

    #[test]
    fn coarsening_variants() {
        assert_eq!(coarsen("S:SPELL", &Coarsening::Full), "S:SPELL");
        assert_eq!(coarsen("S:SPELL", &Coarsening::Operation), "S");
        assert_eq!(coarsen("S:SPELL", &Coarsening::Kind), "SPELL");
        assert_eq!(coarsen("W", &Coarsening::Kind), "W");
        let map = Coarsening::Mapping(BTreeMap::from([("W".to_string(), "order".to_string())]));
        assert_eq!(coarsen("W", &map), "order");
        assert_eq!(coarsen("S:SPELL", &map), "S:SPELL");
    }
}
