//! Parsing of the center dataset document.
//!
//! Two shapes are accepted: a bare array of centers, or an object whose
//! `data` member is that array.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::centers::CenterRecord;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unexpected dataset shape: {0}")]
    Shape(String),
}

/// Centers parsed from one dataset document.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub centers: Vec<CenterRecord>,
    /// Entries dropped because they were not objects, had no string
    /// `branch_code`, or did not fit the record shape.
    pub skipped: usize,
}

impl Dataset {
    #[must_use]
    pub fn unlocated_count(&self) -> usize {
        self.centers.iter().filter(|c| c.coords.is_none()).count()
    }
}

/// Read and parse a dataset file.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] if the file cannot be read, otherwise the
/// errors of [`parse_dataset`].
pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let content = std::fs::read_to_string(path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_dataset(&content)
}

/// Parse a dataset document from its JSON text.
///
/// # Errors
///
/// Returns [`DatasetError::Parse`] for invalid JSON and
/// [`DatasetError::Shape`] when the document is neither an array nor an
/// object with a `data` array.
pub fn parse_dataset(json: &str) -> Result<Dataset, DatasetError> {
    let document: Value = serde_json::from_str(json)?;
    dataset_from_value(document)
}

/// Build a [`Dataset`] from an already-decoded JSON document.
///
/// # Errors
///
/// Returns [`DatasetError::Shape`] when the document has no center array.
pub fn dataset_from_value(document: Value) -> Result<Dataset, DatasetError> {
    let entries = match document {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                return Err(DatasetError::Shape(format!(
                    "`data` must be an array, found {}",
                    kind_of(&other)
                )))
            }
            None => {
                return Err(DatasetError::Shape(
                    "object document has no `data` member".to_string(),
                ))
            }
        },
        other => {
            return Err(DatasetError::Shape(format!(
                "expected an array or an object, found {}",
                kind_of(&other)
            )))
        }
    };

    let mut dataset = Dataset::default();
    for entry in entries {
        let has_code = entry
            .get("branch_code")
            .and_then(Value::as_str)
            .is_some_and(|code| !code.trim().is_empty());
        if !has_code {
            dataset.skipped += 1;
            continue;
        }
        match serde_json::from_value::<CenterRecord>(entry) {
            Ok(center) => dataset.centers.push(center),
            Err(_) => dataset.skipped += 1,
        }
    }
    Ok(dataset)
}

/// Extract the raw center objects of a document keyed by branch code.
///
/// Later entries with a repeated code replace earlier ones. Used by the
/// diff, which works on untyped records so every field is compared.
#[must_use]
pub fn raw_centers_by_code(document: &Value) -> std::collections::BTreeMap<String, Value> {
    let entries = match document {
        Value::Array(entries) => entries.as_slice(),
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(entries)) => entries.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    entries
        .iter()
        .filter(|entry| entry.is_object())
        .filter_map(|entry| {
            let code = entry.get("branch_code")?;
            let key = match code {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key, entry.clone()))
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
