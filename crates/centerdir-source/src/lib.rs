//! Loads the center dataset from a file or a URL into a [`CenterStore`].

pub mod client;
pub mod error;
mod retry;

use std::path::PathBuf;

use centerdir_core::{CenterStore, Dataset};

pub use client::{DatasetClient, FetchOptions};
pub use error::SourceError;

/// Where the dataset lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetLocation {
    Path(PathBuf),
    Url(String),
}

impl DatasetLocation {
    /// `http://` and `https://` values are URLs; anything else is a path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_owned())
        } else {
            Self::Path(PathBuf::from(trimmed))
        }
    }
}

impl std::fmt::Display for DatasetLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Read or fetch the dataset at `location`.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read, the fetch fails, or
/// the document is not a dataset.
pub async fn load_dataset(
    location: &DatasetLocation,
    options: &FetchOptions,
) -> Result<Dataset, SourceError> {
    match location {
        DatasetLocation::Path(path) => {
            let path = path.clone();
            let dataset =
                tokio::task::spawn_blocking(move || centerdir_core::load_dataset(&path)).await??;
            Ok(dataset)
        }
        DatasetLocation::Url(url) => DatasetClient::new(options)?.fetch_dataset(url).await,
    }
}

/// Load the dataset and wrap it in a read-only store, logging what was kept.
///
/// # Errors
///
/// See [`load_dataset`].
pub async fn load_store(
    location: &DatasetLocation,
    options: &FetchOptions,
) -> Result<CenterStore, SourceError> {
    let dataset = load_dataset(location, options).await?;
    let unlocated = dataset.unlocated_count();

    if dataset.skipped > 0 {
        tracing::warn!(
            source = %location,
            skipped = dataset.skipped,
            "dataset entries skipped: not an object or missing branch_code"
        );
    }
    tracing::info!(
        source = %location,
        centers = dataset.centers.len(),
        unlocated,
        "center dataset loaded"
    );

    Ok(CenterStore::from(dataset))
}
