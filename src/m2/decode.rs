use crate::error::EvalError;
use crate::types::{tokens_from_texts, AnnotationBlock, Edit, Record, Span};

use super::{EDIT_FIELD_COUNT, EDIT_PREFIX, FIELD_SEPARATOR, NONE_FIELD, NOOP_OFFSET, SOURCE_PREFIX};

/// One parsed `A` line.
struct EditLine {
    line: usize,
    annotator_id: u32,
    edit: Edit,
}

/// Decode one record. Surrounding blank lines are ignored; a record
/// without `A` lines gets a single Noop block with annotator id 0.
pub fn decode_record(text: &str) -> Result<Record, EvalError> {
    let mut source = None;
    let mut edit_lines = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        if let Some(rest) = strip_tag(line, SOURCE_PREFIX) {
            if source.is_some() {
                return Err(EvalError::format(line_no, "duplicate source line"));
            }
            if !edit_lines.is_empty() {
                return Err(EvalError::format(line_no, "source line after edit lines"));
            }
            source = Some(tokens_from_texts(&rest.split_whitespace().collect::<Vec<_>>()));
        } else if let Some(rest) = strip_tag(line, EDIT_PREFIX) {
            if source.is_none() {
                return Err(EvalError::format(line_no, "edit line before source line"));
            }
            edit_lines.push(parse_edit_line(rest, line_no)?);
        } else {
            return Err(EvalError::format(
                line_no,
                format!("line is neither a source nor an edit line: {line:?}"),
            ));
        }
    }

    let source = source.ok_or_else(|| EvalError::format(1, "missing source line"))?;
    let blocks = group_blocks(edit_lines, source.len())?;
    Ok(Record::new(source, blocks))
}

/// Split on blank lines and decode every record independently.
pub fn decode_corpus(text: &str) -> Vec<Result<Record, EvalError>> {
    let mut records = Vec::new();
    let mut chunk: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !chunk.is_empty() {
                records.push(decode_record(&chunk.join("\n")));
                chunk.clear();
            }
            continue;
        }
        chunk.push(line);
    }
    if !chunk.is_empty() {
        records.push(decode_record(&chunk.join("\n")));
    }
    records
}

/// `S`/`A` followed by a space or nothing.
fn strip_tag<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(tag)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix(' ')
    }
}

/// Span and category are read from the left and the last three fields from
/// the right, so a correction made of `|` tokens keeps its pipes.
fn split_fields(rest: &str, line: usize) -> Result<[&str; EDIT_FIELD_COUNT], EvalError> {
    let head: Vec<&str> = rest.splitn(3, FIELD_SEPARATOR).collect();
    let back: Vec<&str> = head
        .get(2)
        .map_or_else(Vec::new, |tail| tail.rsplitn(4, FIELD_SEPARATOR).collect());
    match (&head[..], &back[..]) {
        (&[span, category, _], &[id, comment, required, correction]) => {
            Ok([span, category, correction, required, comment, id])
        }
        _ => Err(EvalError::format(
            line,
            format!(
                "expected {EDIT_FIELD_COUNT} fields, found {}",
                head.len().min(2) + back.len()
            ),
        )),
    }
}

fn parse_edit_line(rest: &str, line: usize) -> Result<EditLine, EvalError> {
    let fields = split_fields(rest, line)?;

    let offsets: Vec<&str> = fields[0].split_whitespace().collect();
    let [start, end] = offsets[..] else {
        return Err(EvalError::format(line, format!("bad span field {:?}", fields[0])));
    };
    let start = parse_offset(start, line)?;
    let end = parse_offset(end, line)?;

    let category = fields[1].trim();
    if category.is_empty() {
        return Err(EvalError::format(line, "empty category"));
    }
    let annotator_id = fields[5]
        .trim()
        .parse::<u32>()
        .map_err(|e| EvalError::format(line, format!("bad annotator id {:?}: {e}", fields[5])))?;

    let edit = if start == NOOP_OFFSET && end == NOOP_OFFSET {
        Edit::noop()
    } else {
        if start < 0 || end < 0 {
            return Err(EvalError::format(line, format!("negative span {start} {end}")));
        }
        if start > end {
            return Err(EvalError::format(line, format!("span start {start} exceeds end {end}")));
        }
        let correction = fields[2].trim();
        let replacement = if correction == NONE_FIELD {
            Vec::new()
        } else {
            tokens_from_texts(&correction.split_whitespace().collect::<Vec<_>>())
        };
        Edit::new(Span::new(start as usize, end as usize), replacement, category)
    };

    Ok(EditLine {
        line,
        annotator_id,
        edit,
    })
}

fn parse_offset(field: &str, line: usize) -> Result<i64, EvalError> {
    field
        .parse::<i64>()
        .map_err(|e| EvalError::format(line, format!("bad span offset {field:?}: {e}")))
}

/// Gather contiguous lines of one annotator into a block and check its spans.
fn group_blocks(lines: Vec<EditLine>, source_len: usize) -> Result<Vec<AnnotationBlock>, EvalError> {
    if lines.is_empty() {
        return Ok(vec![AnnotationBlock::noop(0)]);
    }

    let mut blocks: Vec<(u32, Vec<EditLine>)> = Vec::new();
    for edit_line in lines {
        match blocks.last_mut() {
            Some((id, group)) if *id == edit_line.annotator_id => group.push(edit_line),
            _ => {
                if blocks.iter().any(|(id, _)| *id == edit_line.annotator_id) {
                    return Err(EvalError::format(
                        edit_line.line,
                        format!(
                            "lines of annotator {} are not contiguous",
                            edit_line.annotator_id
                        ),
                    ));
                }
                blocks.push((edit_line.annotator_id, vec![edit_line]));
            }
        }
    }

    blocks
        .into_iter()
        .map(|(id, group)| check_block(id, group, source_len))
        .collect()
}

fn check_block(
    annotator_id: u32,
    group: Vec<EditLine>,
    source_len: usize,
) -> Result<AnnotationBlock, EvalError> {
    let has_noop = group.iter().any(|l| l.edit.is_noop());
    if has_noop && group.len() > 1 {
        return Err(EvalError::format(
            group[0].line,
            format!("annotator {annotator_id} mixes a noop with other edits"),
        ));
    }

    let mut previous_end = 0;
    for l in &group {
        if l.edit.is_noop() {
            continue;
        }
        let span = l.edit.span;
        if span.end > source_len {
            return Err(EvalError::format(
                l.line,
                format!("span end {} beyond source length {source_len}", span.end),
            ));
        }
        if span.start < previous_end {
            return Err(EvalError::format(
                l.line,
                format!("span start {} overlaps previous edit ending at {previous_end}", span.start),
            ));
        }
        previous_end = span.end;
    }

    Ok(AnnotationBlock::new(
        annotator_id,
        group.into_iter().map(|l| l.edit).collect(),
    ))
}
