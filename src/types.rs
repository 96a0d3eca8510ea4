use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::Serialize;

/// Category tag carried by the sentinel "no correction needed" edit.
pub const NOOP_CATEGORY: &str = "noop";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub text: String,
    /// Zero-based position in the owning sequence. Replacement tokens are
    /// numbered within the replacement, not within the corrected sentence.
    pub position: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, position: usize) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }
}

/// Number a sequence of token texts from zero.
pub fn tokens_from_texts<S: AsRef<str>>(texts: &[S]) -> Vec<Token> {
    texts
        .iter()
        .enumerate()
        .map(|(position, text)| Token::new(text.as_ref(), position))
        .collect()
}

pub fn join_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Half-open token range `[start, end)`. `start == end` is an insertion point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Delete,
    Replace,
    Noop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: Span,
    pub operation: Operation,
    pub replacement: Vec<Token>,
    pub category: String,
}

impl Edit {
    /// Build an edit whose operation follows from its shape.
    pub fn new(span: Span, replacement: Vec<Token>, category: impl Into<String>) -> Self {
        let operation = if span.is_empty() {
            Operation::Insert
        } else if replacement.is_empty() {
            Operation::Delete
        } else {
            Operation::Replace
        };
        Self {
            span,
            operation,
            replacement,
            category: category.into(),
        }
    }

    pub fn noop() -> Self {
        Self {
            span: Span::new(0, 0),
            operation: Operation::Noop,
            replacement: Vec::new(),
            category: NOOP_CATEGORY.to_string(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.operation == Operation::Noop
    }

    pub fn replacement_text(&self) -> String {
        join_tokens(&self.replacement)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationBlock {
    pub annotator_id: u32,
    edits: Vec<Edit>,
}

impl AnnotationBlock {
    /// An empty edit list is stored as the canonical single Noop edit.
    pub fn new(annotator_id: u32, edits: Vec<Edit>) -> Self {
        let edits = if edits.is_empty() {
            vec![Edit::noop()]
        } else {
            edits
        };
        Self {
            annotator_id,
            edits,
        }
    }

    pub fn noop(annotator_id: u32) -> Self {
        Self::new(annotator_id, Vec::new())
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn is_noop(&self) -> bool {
        self.edits.iter().all(Edit::is_noop)
    }

    /// Edits that actually change the sentence.
    pub fn corrections(&self) -> impl Iterator<Item = &Edit> {
        self.edits.iter().filter(|edit| !edit.is_noop())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub source: Vec<Token>,
    pub blocks: Vec<AnnotationBlock>,
}

impl Record {
    pub fn new(source: Vec<Token>, blocks: Vec<AnnotationBlock>) -> Self {
        Self { source, blocks }
    }

    pub fn source_text(&self) -> String {
        join_tokens(&self.source)
    }

    pub fn block(&self, annotator_id: u32) -> Option<&AnnotationBlock> {
        self.blocks
            .iter()
            .find(|block| block.annotator_id == annotator_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConfusionCounts {
    pub true_positive: u64,
    pub false_positive: u64,
    pub false_negative: u64,
}

impl ConfusionCounts {
    pub const ZERO: Self = Self::new(0, 0, 0);

    pub const fn new(true_positive: u64, false_positive: u64, false_negative: u64) -> Self {
        Self {
            true_positive,
            false_positive,
            false_negative,
        }
    }

    pub fn support(&self) -> u64 {
        self.true_positive + self.false_negative
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Add for ConfusionCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            true_positive: self.true_positive + rhs.true_positive,
            false_positive: self.false_positive + rhs.false_positive,
            false_negative: self.false_negative + rhs.false_negative,
        }
    }
}

impl AddAssign for ConfusionCounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for ConfusionCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_operation_follows_shape() {
        let insert = Edit::new(Span::new(2, 2), tokens_from_texts(&["的"]), "M:OTHER");
        let delete = Edit::new(Span::new(2, 3), Vec::new(), "R:OTHER");
        let replace = Edit::new(Span::new(2, 3), tokens_from_texts(&["榨"]), "S:OTHER");
        assert_eq!(insert.operation, Operation::Insert);
        assert_eq!(delete.operation, Operation::Delete);
        assert_eq!(replace.operation, Operation::Replace);
        assert_eq!(replace.replacement_text(), "榨");
    }

    #[test]
    fn empty_block_is_canonical_noop() {
        let block = AnnotationBlock::new(3, Vec::new());
        assert_eq!(block.edits(), &[Edit::noop()]);
        assert!(block.is_noop());
        assert_eq!(block.corrections().count(), 0);
    }

    #[test]
    fn confusion_counts_sum_and_support() {
        let total: ConfusionCounts = [
            ConfusionCounts::new(1, 2, 3),
            ConfusionCounts::new(4, 0, 1),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, ConfusionCounts::new(5, 2, 4));
        assert_eq!(total.support(), 9);
    }
}
