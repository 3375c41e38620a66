//! Frontmatter codec.
//!
//! Text layout: an opening `---` line, a YAML mapping, a closing `---` line,
//! then the body. The body is never normalized: no newline is added or
//! stripped, and no blank line is required after the closing delimiter.

use crate::error::{Result, StmError};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

/// The delimiter line that opens and closes the metadata block.
pub const DELIMITER: &str = "---";

/// Serialize `metadata` and append `body` verbatim.
pub fn encode<M: Serialize>(metadata: &M, body: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(metadata)
        .map_err(|e| StmError::Validation(format!("failed to serialize task metadata: {}", e)))?;

    let mut output = String::with_capacity(yaml.len() + body.len() + 8);
    output.push_str(DELIMITER);
    output.push('\n');
    output.push_str(&yaml);
    if !yaml.ends_with('\n') {
        output.push('\n');
    }
    output.push_str(DELIMITER);
    output.push('\n');
    output.push_str(body);
    Ok(output)
}

/// Split `text` into its metadata mapping and body.
///
/// Without a well-formed delimiter pair at the very start, the whole input is
/// body and the metadata is empty.
///
/// # Errors
///
/// `StmError::Validation` when the block between the delimiters is not valid
/// YAML or not a mapping.
pub fn decode(text: &str) -> Result<(Mapping, String)> {
    let Some((yaml, body)) = split(text) else {
        return Ok((Mapping::new(), text.to_string()));
    };

    let value: Value = serde_yaml::from_str(yaml)
        .map_err(|e| StmError::Validation(format!("malformed metadata block: {}", e)))?;

    let mapping = match value {
        Value::Null => Mapping::new(),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(StmError::Validation(format!(
                "metadata block must be a mapping, found {}",
                kind_of(&other)
            )));
        }
    };

    Ok((mapping, body.to_string()))
}

/// Locate the metadata block; returns `(yaml, body)` slices of `text`.
fn split(text: &str) -> Option<(&str, &str)> {
    let rest = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    while offset < rest.len() {
        let line_end = rest[offset..]
            .find('\n')
            .map(|i| offset + i + 1)
            .unwrap_or(rest.len());

        let line = rest[offset..line_end].trim_end_matches('\n').trim_end_matches('\r');
        if line == DELIMITER {
            return Some((&rest[..offset], &rest[line_end..]));
        }
        offset = line_end;
    }
    None
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
