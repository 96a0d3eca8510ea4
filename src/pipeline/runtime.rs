use rayon::prelude::*;

use crate::alignment::annotator::EditAligner;
use crate::alignment::tokenization::clean_text;
use crate::config::{CompareConfig, ConvertConfig};
use crate::error::EvalError;
use crate::m2::{decode_record, encode_block_lines, encode_record};
use crate::pipeline::cache::SegmentationCache;
use crate::pipeline::traits::{ScriptNormalizer, TokenSource};
use crate::scoring::aggregate::{score_pairs, SentencePair};
use crate::scoring::report::{build_report, Report, Side, SkippedRecord};
use crate::types::Record;

pub struct Evaluator {
    convert: ConvertConfig,
    compare: CompareConfig,
    token_source: Box<dyn TokenSource>,
    normalizer: Option<Box<dyn ScriptNormalizer>>,
    edit_aligner: EditAligner,
}

pub(crate) struct EvaluatorParts {
    pub convert: ConvertConfig,
    pub compare: CompareConfig,
    pub token_source: Box<dyn TokenSource>,
    pub normalizer: Option<Box<dyn ScriptNormalizer>>,
    pub edit_aligner: EditAligner,
}

/// Cleaned text of one sample.
struct Sample {
    source: String,
    targets: Vec<String>,
}

impl Evaluator {
    pub(crate) fn from_parts(parts: EvaluatorParts) -> Self {
        Self {
            convert: parts.convert,
            compare: parts.compare,
            token_source: parts.token_source,
            normalizer: parts.normalizer,
            edit_aligner: parts.edit_aligner,
        }
    }

    pub fn convert_config(&self) -> &ConvertConfig {
        &self.convert
    }

    pub fn compare_config(&self) -> &CompareConfig {
        &self.compare
    }

    /// One record per sample: the source plus one block per target (more
    /// when the tie-break keeps several alternatives).
    pub fn convert_to_records(
        &self,
        sources: &[String],
        targets_list: &[Vec<String>],
    ) -> Result<Vec<Record>, EvalError> {
        let samples = self.prepare(sources, targets_list)?;
        let cache = self.segment(&[samples.as_slice()])?;
        self.annotate_samples(&samples, &cache)
    }

    /// M2 text of every sample, without trailing blank lines.
    pub fn convert_multi_to_m2(
        &self,
        sources: &[String],
        targets_list: &[Vec<String>],
    ) -> Result<Vec<String>, EvalError> {
        self.convert_to_records(sources, targets_list)?
            .iter()
            .map(encode_appending)
            .collect()
    }

    /// Score parallel streams of M2 records. Records that fail to decode, or
    /// whose two sides disagree on the source, are skipped and listed.
    pub fn evaluate_m2(
        &self,
        hypothesis_m2: &[String],
        reference_m2: &[String],
    ) -> Result<Report, EvalError> {
        if hypothesis_m2.len() != reference_m2.len() {
            return Err(EvalError::validation(format!(
                "{} hypothesis records but {} reference records",
                hypothesis_m2.len(),
                reference_m2.len()
            )));
        }

        let decoded: Vec<(Result<Record, EvalError>, Result<Record, EvalError>)> = hypothesis_m2
            .par_iter()
            .zip(reference_m2.par_iter())
            .map(|(h, r)| (decode_record(h), decode_record(r)))
            .collect();

        let mut skipped = Vec::new();
        let mut kept = Vec::with_capacity(decoded.len());
        for (index, pair) in decoded.iter().enumerate() {
            match pair {
                (Err(e), _) => skipped.push(skip(index, Side::Hypothesis, e.to_string())),
                (_, Err(e)) => skipped.push(skip(index, Side::Reference, e.to_string())),
                (Ok(h), Ok(r)) if h.source != r.source => skipped.push(skip(
                    index,
                    Side::Pair,
                    format!(
                        "sources differ: {:?} vs {:?}",
                        h.source_text(),
                        r.source_text()
                    ),
                )),
                (Ok(hypothesis), Ok(reference)) => kept.push(SentencePair {
                    index,
                    hypothesis,
                    reference,
                }),
            }
        }

        let totals = score_pairs(&kept, &self.compare);
        Ok(build_report(
            &totals,
            &self.compare.betas,
            self.compare.categories,
            skipped,
        ))
    }

    /// Annotate references and hypotheses against their sources, then score.
    /// All sentences share one segmentation pass.
    pub fn evaluate(
        &self,
        sources: &[String],
        references: &[Vec<String>],
        hypotheses: &[String],
    ) -> Result<Report, EvalError> {
        if hypotheses.len() != sources.len() {
            return Err(EvalError::validation(format!(
                "{} sources but {} hypotheses",
                sources.len(),
                hypotheses.len()
            )));
        }
        let hypotheses: Vec<Vec<String>> = hypotheses.iter().map(|h| vec![h.clone()]).collect();
        let ref_samples = self.prepare(sources, references)?;
        let hyp_samples = self.prepare(sources, &hypotheses)?;
        let cache = self.segment(&[ref_samples.as_slice(), hyp_samples.as_slice()])?;

        let reference_m2 = self.encode_samples(&ref_samples, &cache)?;
        let hypothesis_m2 = self.encode_samples(&hyp_samples, &cache)?;
        self.evaluate_m2(&hypothesis_m2, &reference_m2)
    }

    fn prepare(
        &self,
        sources: &[String],
        targets_list: &[Vec<String>],
    ) -> Result<Vec<Sample>, EvalError> {
        if sources.len() != targets_list.len() {
            return Err(EvalError::validation(format!(
                "{} sources but {} target lists",
                sources.len(),
                targets_list.len()
            )));
        }
        if let Some(index) = targets_list.iter().position(Vec::is_empty) {
            return Err(EvalError::validation(format!(
                "sample {index} has no target sentence"
            )));
        }

        let segmented = self.convert.segmented;
        Ok(sources
            .iter()
            .zip(targets_list)
            .map(|(source, targets)| Sample {
                source: clean_text(source, segmented),
                targets: targets.iter().map(|t| self.prepare_target(t)).collect(),
            })
            .collect())
    }

    fn prepare_target(&self, text: &str) -> String {
        let cleaned = clean_text(text, self.convert.segmented);
        match (&self.normalizer, self.convert.normalize_script) {
            (Some(normalizer), true) => normalizer.normalize(&cleaned),
            _ => cleaned,
        }
    }

    fn segment(&self, sample_sets: &[&[Sample]]) -> Result<SegmentationCache, EvalError> {
        let sentences = sample_sets
            .iter()
            .flat_map(|samples| samples.iter())
            .flat_map(|s| std::iter::once(&s.source).chain(&s.targets));
        SegmentationCache::populate(sentences, self.token_source.as_ref(), self.convert.batch_size)
    }

    fn annotate_samples(
        &self,
        samples: &[Sample],
        cache: &SegmentationCache,
    ) -> Result<Vec<Record>, EvalError> {
        samples
            .par_iter()
            .map(|sample| self.annotate_sample(sample, cache))
            .collect()
    }

    fn annotate_sample(&self, sample: &Sample, cache: &SegmentationCache) -> Result<Record, EvalError> {
        let source = cache.tokens(&sample.source)?;
        let mut blocks = Vec::with_capacity(sample.targets.len());
        let mut next_id = 0u32;
        for target in &sample.targets {
            let target = cache.tokens(target)?;
            let annotation = self.edit_aligner.annotate(&source, &target)?;
            let count = annotation.alternatives.len() as u32;
            blocks.extend(annotation.into_blocks(next_id));
            next_id += count;
        }
        Ok(Record::new(source, blocks))
    }

    fn encode_samples(
        &self,
        samples: &[Sample],
        cache: &SegmentationCache,
    ) -> Result<Vec<String>, EvalError> {
        self.annotate_samples(samples, cache)?
            .iter()
            .map(encode_appending)
            .collect()
    }
}

/// The source line with the first block, then the edit lines of every
/// further block appended.
fn encode_appending(record: &Record) -> Result<String, EvalError> {
    let (first, rest) = record.blocks.split_at(record.blocks.len().min(1));
    let head = Record::new(record.source.clone(), first.to_vec());
    let mut lines = vec![encode_record(&head)?];
    for block in rest {
        lines.extend(encode_block_lines(block)?);
    }
    Ok(lines.join("\n"))
}

fn skip(index: usize, side: Side, message: String) -> SkippedRecord {
    tracing::warn!(index, ?side, %message, "skipping record");
    SkippedRecord {
        index,
        side,
        message,
    }
}
