//! Field-level comparison of two dataset revisions, and canonical formatting.
//!
//! Records are matched by `branch_code`. The diff runs on untyped JSON so
//! fields this crate never interprets still show up in the report.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::dataset::raw_centers_by_code;

/// Added/deleted records are rendered as JSON and cut to this many characters.
const RECORD_PREVIEW_CHARS: usize = 200;
const FIELD_REMOVED: &str = "<FIELD_REMOVED>";
const FIELD_ADDED: &str = "<FIELD_ADDED>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ChangeKind {
    Added,
    Deleted,
    Modified,
}

/// One row of the comparison report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    #[serde(rename = "ChangeType")]
    pub kind: ChangeKind,
    pub branch_code: String,
    #[serde(rename = "FieldName")]
    pub field: String,
    #[serde(rename = "OldValue")]
    pub old_value: String,
    #[serde(rename = "NewValue")]
    pub new_value: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub added_branches: usize,
    pub deleted_branches: usize,
    pub modified_branches: usize,
    pub field_modifications: usize,
}

impl DiffSummary {
    #[must_use]
    pub fn from_changes(changes: &[Change]) -> Self {
        let distinct = |kind: ChangeKind| {
            changes
                .iter()
                .filter(|c| c.kind == kind)
                .map(|c| c.branch_code.as_str())
                .collect::<BTreeSet<_>>()
                .len()
        };
        Self {
            added_branches: distinct(ChangeKind::Added),
            deleted_branches: distinct(ChangeKind::Deleted),
            modified_branches: distinct(ChangeKind::Modified),
            field_modifications: changes
                .iter()
                .filter(|c| c.kind == ChangeKind::Modified)
                .count(),
        }
    }
}

/// Compare two dataset documents.
///
/// Rows come out grouped as added, deleted, modified; each group is ordered
/// by branch code and modified fields by field name.
#[must_use]
pub fn diff_datasets(old: &Value, new: &Value) -> Vec<Change> {
    let old_centers = raw_centers_by_code(old);
    let new_centers = raw_centers_by_code(new);
    let mut changes = Vec::new();

    for (code, record) in &new_centers {
        if !old_centers.contains_key(code) {
            changes.push(Change {
                kind: ChangeKind::Added,
                branch_code: code.clone(),
                field: String::new(),
                old_value: String::new(),
                new_value: preview(record),
            });
        }
    }

    for (code, record) in &old_centers {
        if !new_centers.contains_key(code) {
            changes.push(Change {
                kind: ChangeKind::Deleted,
                branch_code: code.clone(),
                field: String::new(),
                old_value: preview(record),
                new_value: String::new(),
            });
        }
    }

    for (code, old_record) in &old_centers {
        if let Some(new_record) = new_centers.get(code) {
            if old_record != new_record {
                diff_record(code, old_record, new_record, &mut changes);
            }
        }
    }

    changes
}

fn diff_record(code: &str, old: &Value, new: &Value, changes: &mut Vec<Change>) {
    let empty = Map::new();
    let old_fields = old.as_object().unwrap_or(&empty);
    let new_fields = new.as_object().unwrap_or(&empty);
    let names: BTreeSet<&String> = old_fields.keys().chain(new_fields.keys()).collect();

    let mut modified = |field: String, old_value: String, new_value: String| {
        changes.push(Change {
            kind: ChangeKind::Modified,
            branch_code: code.to_string(),
            field,
            old_value,
            new_value,
        });
    };

    for name in names {
        match (old_fields.get(name), new_fields.get(name)) {
            (Some(Value::Object(old_nested)), Some(Value::Object(new_nested))) => {
                let nested: BTreeSet<&String> =
                    old_nested.keys().chain(new_nested.keys()).collect();
                let blank = Value::String(String::new());
                for key in nested {
                    let old_value = old_nested.get(key).unwrap_or(&blank);
                    let new_value = new_nested.get(key).unwrap_or(&blank);
                    if old_value != new_value {
                        modified(format!("{name}.{key}"), render(old_value), render(new_value));
                    }
                }
            }
            (Some(old_value), Some(new_value)) => {
                if old_value != new_value {
                    modified(name.clone(), render(old_value), render(new_value));
                }
            }
            (Some(old_value), None) => {
                modified(name.clone(), render(old_value), FIELD_REMOVED.to_string());
            }
            (None, Some(new_value)) => {
                modified(name.clone(), FIELD_ADDED.to_string(), render(new_value));
            }
            (None, None) => {}
        }
    }
}

/// Strings render bare, everything else as compact JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn preview(record: &Value) -> String {
    record.to_string().chars().take(RECORD_PREVIEW_CHARS).collect()
}

/// Rewrite a dataset document into canonical form.
///
/// Object keys are sorted. Arrays are sorted by the text of their elements,
/// except coordinate-like pairs, whose order is meaningful.
#[must_use]
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, &Value> = map.iter().collect();
            let mut out = Map::new();
            for (key, item) in sorted {
                out.insert(key.clone(), canonicalize(item));
            }
            Value::Object(out)
        }
        Value::Array(items) if is_coordinate_pair(items) => value.clone(),
        Value::Array(items) => {
            let mut out: Vec<Value> = items.iter().map(canonicalize).collect();
            out.sort_by_cached_key(render);
            Value::Array(out)
        }
        other => other.clone(),
    }
}

fn is_coordinate_pair(items: &[Value]) -> bool {
    items.len() == 2
        && items.iter().all(|item| match item {
            Value::String(s) => s.chars().any(|c| c.is_ascii_digit()),
            Value::Number(_) => true,
            _ => false,
        })
}
