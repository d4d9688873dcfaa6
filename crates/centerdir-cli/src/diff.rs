//! `diff` command: compare two dataset revisions by branch code, write a CSV
//! change report, and install the canonically formatted new dataset.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use centerdir_core::{canonicalize, diff_datasets, Change, DiffSummary};
use serde_json::Value;

const REPORT_HEADER: [&str; 5] = ["ChangeType", "branch_code", "FieldName", "OldValue", "NewValue"];

#[derive(Debug, Clone)]
pub(crate) struct DiffOptions {
    pub old: PathBuf,
    pub new: PathBuf,
    pub output: Option<PathBuf>,
    pub backup_dir: PathBuf,
    /// Overwrite `old` with the formatted new dataset.
    pub update: bool,
}

#[derive(Debug)]
pub(crate) struct DiffOutcome {
    pub summary: DiffSummary,
    pub old_centers: usize,
    pub new_centers: usize,
    pub report: PathBuf,
    pub formatted: PathBuf,
    /// Copy of the old dataset, when one existed and was valid JSON.
    pub backup: Option<PathBuf>,
}

/// Run the comparison. `timestamp` names the report and formatted files.
///
/// A missing or unparseable old dataset is treated as empty, so every new
/// center is reported as added and the old file is created.
///
/// # Errors
///
/// Returns an error if the new dataset cannot be read or parsed, or if any
/// output file cannot be written.
pub(crate) fn run_diff(options: &DiffOptions, timestamp: &str) -> anyhow::Result<DiffOutcome> {
    fs::create_dir_all(&options.backup_dir).with_context(|| {
        format!(
            "failed to create backup directory {}",
            options.backup_dir.display()
        )
    })?;

    let new_doc = read_json(&options.new)
        .with_context(|| format!("failed to load new dataset {}", options.new.display()))?;
    let (old_doc, backup) = read_old(&options.old, &options.backup_dir)?;

    let formatted = canonicalize(&new_doc);
    let formatted_path = options
        .backup_dir
        .join(format!("formatted_source_{timestamp}.json"));
    write_json(&formatted_path, &formatted)?;

    let old_centers = centerdir_core::dataset::raw_centers_by_code(&old_doc).len();
    let new_centers = centerdir_core::dataset::raw_centers_by_code(&new_doc).len();
    let changes = diff_datasets(&old_doc, &new_doc);
    tracing::info!(
        old_centers,
        new_centers,
        changes = changes.len(),
        "dataset comparison finished"
    );

    let report = options.output.clone().unwrap_or_else(|| {
        options
            .backup_dir
            .join(format!("branches_comparison_{timestamp}.csv"))
    });
    write_report(&report, &changes)?;

    if options.update {
        write_json(&options.old, &formatted)?;
    }

    Ok(DiffOutcome {
        summary: DiffSummary::from_changes(&changes),
        old_centers,
        new_centers,
        report,
        formatted: formatted_path,
        backup,
    })
}

pub(crate) fn print_outcome(options: &DiffOptions, outcome: &DiffOutcome) {
    if let Some(backup) = &outcome.backup {
        println!("Backed up old dataset to {}", backup.display());
    }
    println!("Formatted new dataset written to {}", outcome.formatted.display());
    println!("Centers in old dataset: {}", outcome.old_centers);
    println!("Centers in new dataset: {}", outcome.new_centers);
    println!("Added branches: {}", outcome.summary.added_branches);
    println!("Deleted branches: {}", outcome.summary.deleted_branches);
    println!("Modified branches: {}", outcome.summary.modified_branches);
    println!(
        "Total field modifications: {}",
        outcome.summary.field_modifications
    );
    println!("Results saved to {}", outcome.report.display());
    if options.update {
        println!("Formatted dataset copied to {}", options.old.display());
    }
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Load the old dataset and back it up. Missing or invalid files read as `{}`.
fn read_old(path: &Path, backup_dir: &Path) -> anyhow::Result<(Value, Option<PathBuf>)> {
    let empty = Value::Object(serde_json::Map::new());
    if !path.exists() {
        tracing::warn!(path = %path.display(), "old dataset not found; it will be created");
        return Ok((empty, None));
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read old dataset {}", path.display()))?;
    let doc = match serde_json::from_str::<Value>(&raw) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "old dataset is not valid JSON; it will be replaced"
            );
            return Ok((empty, None));
        }
    };

    let file_name = path
        .file_name()
        .map_or_else(|| "dataset.json".into(), |n| n.to_string_lossy().into_owned());
    let backup = backup_dir.join(format!("backup_{file_name}"));
    fs::copy(path, &backup)
        .with_context(|| format!("failed to back up old dataset to {}", backup.display()))?;
    Ok((doc, Some(backup)))
}

fn write_json(path: &Path, value: &Value) -> anyhow::Result<()> {
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}

fn write_report(path: &Path, changes: &[Change]) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to create report {}", path.display()))?;
    writer.write_record(REPORT_HEADER)?;
    for change in changes {
        writer.serialize(change)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
#[path = "diff_test.rs"]
mod tests;
