use std::sync::Arc;

use crate::alignment::classification::{classify, EditSides};
use crate::alignment::levenshtein::{AlignOp, OpKind};
use crate::config::TieBreak;
use crate::error::EvalError;
use crate::pipeline::traits::{CharSimilarity, EditMerger, SequenceAligner};
use crate::types::{tokens_from_texts, AnnotationBlock, Edit, Span, Token};

/// Outcome of aligning one source/target pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Cost of the cheapest alignment.
    pub cost: f64,
    /// One edit list per retained alternative; never empty. An unchanged
    /// pair yields the single-Noop list.
    pub alternatives: Vec<Vec<Edit>>,
}

impl Annotation {
    /// Annotation blocks numbered from `first_id`, one per alternative.
    pub fn into_blocks(self, first_id: u32) -> Vec<AnnotationBlock> {
        self.alternatives
            .into_iter()
            .zip(first_id..)
            .map(|(edits, id)| AnnotationBlock::new(id, edits))
            .collect()
    }
}

/// Derives classified edits from a source and a corrected token sequence.
pub struct EditAligner {
    sequence_aligner: Box<dyn SequenceAligner>,
    merger: Box<dyn EditMerger>,
    similarity: Arc<dyn CharSimilarity>,
    similarity_threshold: f64,
    tie_break: TieBreak,
}

pub(crate) struct EditAlignerParts {
    pub sequence_aligner: Box<dyn SequenceAligner>,
    pub merger: Box<dyn EditMerger>,
    pub similarity: Arc<dyn CharSimilarity>,
    pub similarity_threshold: f64,
    pub tie_break: TieBreak,
}

impl EditAligner {
    pub(crate) fn from_parts(parts: EditAlignerParts) -> Self {
        Self {
            sequence_aligner: parts.sequence_aligner,
            merger: parts.merger,
            similarity: parts.similarity,
            similarity_threshold: parts.similarity_threshold,
            tie_break: parts.tie_break,
        }
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    pub fn annotate(&self, source: &[Token], target: &[Token]) -> Result<Annotation, EvalError> {
        let src: Vec<&str> = source.iter().map(|t| t.text.as_str()).collect();
        let tgt: Vec<&str> = target.iter().map(|t| t.text.as_str()).collect();

        if src == tgt {
            return Ok(Annotation {
                cost: 0.0,
                alternatives: vec![vec![Edit::noop()]],
            });
        }
        if src.is_empty() || tgt.is_empty() {
            let (kind, cost) = if src.is_empty() {
                (OpKind::Insert, tgt.len() as f64)
            } else {
                (OpKind::Delete, src.len() as f64)
            };
            let op = AlignOp::new(kind, 0, src.len(), 0, tgt.len());
            return Ok(Annotation {
                cost,
                alternatives: vec![vec![self.to_edit(&op, &src, &tgt)]],
            });
        }

        let first_only = self.tie_break == TieBreak::First;
        let aligned = self.sequence_aligner.align_paths(&src, &tgt, first_only)?;
        if aligned.paths.is_empty() {
            return Err(EvalError::dependency(
                "aligning token sequences",
                "sequence aligner returned no path",
            ));
        }

        let mut candidates: Vec<Vec<Edit>> = Vec::new();
        for path in &aligned.paths {
            let merged = self.merger.merge(path, &src, &tgt);
            let mut edits: Vec<Edit> = merged
                .iter()
                .map(|op| self.to_edit(op, &src, &tgt))
                .collect();
            if edits.is_empty() {
                edits.push(Edit::noop());
            }
            if !candidates.contains(&edits) {
                candidates.push(edits);
            }
        }

        let alternatives = match self.tie_break {
            TieBreak::All => candidates,
            TieBreak::First => candidates.into_iter().take(1).collect(),
            TieBreak::Fewest => fewest_edits(candidates),
        };

        tracing::debug!(
            src_len = src.len(),
            tgt_len = tgt.len(),
            cost = aligned.cost,
            paths = aligned.paths.len(),
            alternatives = alternatives.len(),
            "annotator: aligned sentence pair"
        );
        Ok(Annotation {
            cost: aligned.cost,
            alternatives,
        })
    }

    fn to_edit(&self, op: &AlignOp, src: &[&str], tgt: &[&str]) -> Edit {
        let sides = EditSides::new(op, src, tgt);
        let category = classify(&sides, self.similarity.as_ref(), self.similarity_threshold);
        Edit::new(
            Span::new(op.src_start, op.src_end),
            tokens_from_texts(sides.tgt),
            category,
        )
    }
}

/// The first candidate with the smallest number of edits.
fn fewest_edits(candidates: Vec<Vec<Edit>>) -> Vec<Vec<Edit>> {
    let mut best: Option<Vec<Edit>> = None;
    for edits in candidates {
        if best.as_ref().map_or(true, |b| edits.len() < b.len()) {
            best = Some(edits);
        }
    }
    best.into_iter().collect()
}
