//! HTTP client for datasets published at a URL.

use std::time::Duration;

use centerdir_core::{dataset::dataset_from_value, Dataset, DatasetError};
use reqwest::{Client, Url};

use crate::error::SourceError;
use crate::retry::retry_with_backoff;

/// Fetch settings, usually taken from `AppConfig`.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl FetchOptions {
    #[must_use]
    pub fn from_app_config(config: &centerdir_core::AppConfig) -> Self {
        Self {
            timeout_secs: config.fetch_timeout_secs,
            user_agent: config.fetch_user_agent.clone(),
            max_retries: config.fetch_max_retries,
            retry_backoff_ms: config.fetch_retry_backoff_ms,
        }
    }
}

/// Downloads and parses center datasets over HTTP.
pub struct DatasetClient {
    client: Client,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl DatasetClient {
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(options: &FetchOptions) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(options.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            max_retries: options.max_retries,
            retry_backoff_ms: options.retry_backoff_ms,
        })
    }

    /// Fetch and parse the dataset at `url`, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`SourceError::InvalidUrl`] if `url` does not parse.
    /// - [`SourceError::UnexpectedStatus`] / [`SourceError::Http`] once
    ///   retries are exhausted or on a non-retriable status.
    /// - [`SourceError::Dataset`] if the body is not a usable dataset.
    pub async fn fetch_dataset(&self, url: &str) -> Result<Dataset, SourceError> {
        let url = Url::parse(url).map_err(|e| SourceError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        let document = retry_with_backoff(self.max_retries, self.retry_backoff_ms, || {
            self.request_json(&url)
        })
        .await?;

        Ok(dataset_from_value(document)?)
    }

    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, SourceError> {
        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::UnexpectedStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SourceError::Dataset(DatasetError::Parse(e)))
    }
}
