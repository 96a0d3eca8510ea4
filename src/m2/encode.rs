use crate::error::EvalError;
use crate::types::{AnnotationBlock, Edit, Record, Token};

use super::{EDIT_PREFIX, FIELD_SEPARATOR, NONE_FIELD, NOOP_OFFSET, REQUIRED_FIELD, SOURCE_PREFIX};

/// Encode a record: the `S` line, then every block's `A` lines in order.
/// No trailing newline.
pub fn encode_record(record: &Record) -> Result<String, EvalError> {
    let mut lines = vec![source_line(&record.source)?];
    for block in &record.blocks {
        lines.extend(encode_block_lines(block)?);
    }
    Ok(lines.join("\n"))
}

/// `A` lines of one block, used when further targets of an already emitted
/// source are appended to its record.
pub fn encode_block_lines(block: &AnnotationBlock) -> Result<Vec<String>, EvalError> {
    block
        .edits()
        .iter()
        .map(|edit| edit_line(edit, block.annotator_id))
        .collect()
}

/// Records separated by blank lines, with a trailing blank line.
pub fn encode_corpus(records: &[Record]) -> Result<String, EvalError> {
    let mut out = String::new();
    for record in records {
        out.push_str(&encode_record(record)?);
        out.push_str("\n\n");
    }
    Ok(out)
}

fn source_line(source: &[Token]) -> Result<String, EvalError> {
    check_tokens(source, "source")?;
    if source.is_empty() {
        return Ok(SOURCE_PREFIX.to_string());
    }
    let joined = source
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(format!("{SOURCE_PREFIX} {joined}"))
}

fn edit_line(edit: &Edit, annotator_id: u32) -> Result<String, EvalError> {
    if edit.category.is_empty()
        || edit.category.contains(FIELD_SEPARATOR)
        || edit.category.chars().any(char::is_whitespace)
    {
        return Err(EvalError::validation(format!(
            "category {:?} cannot be written to an edit line",
            edit.category
        )));
    }
    let (start, end, correction) = if edit.is_noop() {
        (NOOP_OFFSET, NOOP_OFFSET, NONE_FIELD.to_string())
    } else {
        check_tokens(&edit.replacement, "replacement")?;
        (
            edit.span.start as i64,
            edit.span.end as i64,
            edit.replacement_text(),
        )
    };
    Ok([
        format!("{EDIT_PREFIX} {start} {end}"),
        edit.category.clone(),
        correction,
        REQUIRED_FIELD.to_string(),
        NONE_FIELD.to_string(),
        annotator_id.to_string(),
    ]
    .join(FIELD_SEPARATOR))
}

fn check_tokens(tokens: &[Token], side: &str) -> Result<(), EvalError> {
    match tokens
        .iter()
        .find(|t| t.text.is_empty() || t.text.chars().any(char::is_whitespace))
    {
        Some(bad) => Err(EvalError::validation(format!(
            "{side} token {:?} at position {} is empty or contains whitespace",
            bad.text, bad.position
        ))),
        None => Ok(()),
    }
}
