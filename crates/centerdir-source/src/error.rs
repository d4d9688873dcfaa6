use thiserror::Error;

/// Errors returned while loading the center dataset.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The dataset endpoint answered with a non-2xx status.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The dataset location is not a usable URL.
    #[error("invalid dataset URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The document was fetched or read but is not a usable dataset.
    #[error(transparent)]
    Dataset(#[from] centerdir_core::DatasetError),

    /// A blocking file read could not be joined back onto the runtime.
    #[error("dataset load task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
