//! Parser for the compact operation mini-language.
//!
//! ```text
//! stack      := operation (';' operation)*
//! operation  := type ['@' options]
//! options    := pair (',' pair)*
//! pair       := key ':' value
//! ```
//!
//! Example: `resize@width:800,height:600,fit:cover;rotate@angle:90`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{RenditionError, RenditionResult};

/// One named transformation with string-keyed parameters, exactly as requested.
///
/// Options are kept in a sorted map so two logically identical operations compare (and hash)
/// equal regardless of the order their options were written in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    /// Lowercased operation type, e.g. `resize`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Lowercased keys mapped to decoded, lowercased values.
    pub options: BTreeMap<String, String>,
}

impl Operation {
    /// Build an operation from a type and option pairs.
    pub fn new<K, V>(kind: impl Into<String>, options: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            kind: kind.into(),
            options: options
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up an option value.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }
}

/// Ordered operations; order is significant.
pub type OperationStack = Vec<Operation>;

/// Parse a raw operation string into an ordered stack.
///
/// Empty segments are skipped, so `""` and `";;"` both yield an empty stack.
pub fn parse_stack(raw: &str) -> RenditionResult<OperationStack> {
    raw.split(';')
        .filter(|segment| !segment.trim().is_empty())
        .map(parse_operation)
        .collect()
}

fn parse_operation(segment: &str) -> RenditionResult<Operation> {
    let (kind, definition) = match segment.split_once('@') {
        Some((kind, definition)) => (kind, Some(definition)),
        None => (segment, None),
    };

    let kind = kind.trim().to_lowercase();
    if kind.is_empty() {
        return Err(RenditionError::parse(format!(
            "operation '{segment}' has an empty type"
        )));
    }

    let mut options = BTreeMap::new();
    let Some(definition) = definition else {
        return Ok(Operation { kind, options });
    };
    if definition.contains('@') {
        return Err(RenditionError::parse(format!(
            "operation '{segment}' contains more than one '@'"
        )));
    }

    for element in definition.split(',').filter(|e| !e.trim().is_empty()) {
        let (key, value) = element.split_once(':').ok_or_else(|| {
            RenditionError::parse(format!(
                "option '{element}' of '{kind}' is missing a ':' separator"
            ))
        })?;

        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return Err(RenditionError::parse(format!(
                "option '{element}' of '{kind}' has an empty key"
            )));
        }
        if value.contains(':') {
            return Err(RenditionError::parse(format!(
                "option '{key}' of '{kind}' contains more than one ':'"
            )));
        }

        let value = decode_value(value.trim())?.to_lowercase().trim().to_string();
        if value.is_empty() {
            return Err(RenditionError::parse(format!(
                "option '{key}' of '{kind}' has an empty value"
            )));
        }

        // Later duplicates win.
        options.insert(key, value);
    }

    Ok(Operation { kind, options })
}

fn decode_value(value: &str) -> RenditionResult<String> {
    let bytes = value.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b != b'%' {
            continue;
        }
        let escape = bytes.get(i + 1..i + 3);
        if !escape.is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit)) {
            return Err(RenditionError::parse(format!(
                "value '{value}' has a malformed percent escape"
            )));
        }
    }

    percent_encoding::percent_decode_str(value)
        .decode_utf8()
        .map(|v| v.into_owned())
        .map_err(|e| RenditionError::parse(format!("value '{value}' is not valid UTF-8: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/ops/parse.rs"]
mod tests;
