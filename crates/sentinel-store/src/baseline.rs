//! Baseline table retrieval: shared remote copy first, local cache second.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use sentinel_detect::BaselineTable;

use crate::error::StoreError;
use crate::fs::{read_json, write_json_atomic};

/// On-disk and on-wire shape: `{"updated_at": ..., "baselines": {...}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaselineFile {
    /// Unix seconds when the table was computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<f64>,
    pub baselines: BaselineTable,
}

impl BaselineFile {
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file is missing, unreadable or not valid JSON.
    pub fn read(path: &Path) -> Result<Self, StoreError> {
        read_json(path)
    }

    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<(), StoreError> {
        write_json_atomic(path, self)
    }
}

pub struct BaselineProvider {
    client: Client,
    remote_url: Option<String>,
    local_path: PathBuf,
}

impl BaselineProvider {
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the HTTP client cannot be constructed.
    pub fn new(
        remote_url: Option<&str>,
        local_path: impl Into<PathBuf>,
        timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            remote_url: remote_url.map(str::to_owned),
            local_path: local_path.into(),
        })
    }

    /// Load the baseline table for this run. Never fails.
    ///
    /// Tries the remote URL (if configured) and caches a successful result
    /// locally. On remote failure falls back to the local file, then to an
    /// empty table.
    pub async fn load(&self) -> BaselineTable {
        if let Some(url) = &self.remote_url {
            match self.fetch_remote(url).await {
                Ok(file) => {
                    tracing::info!(url = %url, patterns = file.baselines.len(), "loaded remote baselines");
                    if let Err(e) = file.write(&self.local_path) {
                        tracing::warn!(
                            path = %self.local_path.display(),
                            error = %e,
                            "failed to cache remote baselines locally"
                        );
                    }
                    return file.baselines;
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "remote baselines unavailable; using local copy");
                }
            }
        }

        match BaselineFile::read(&self.local_path) {
            Ok(file) => {
                tracing::info!(
                    path = %self.local_path.display(),
                    patterns = file.baselines.len(),
                    "loaded local baselines"
                );
                file.baselines
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.local_path.display(),
                    error = %e,
                    "no usable baselines; every pattern uses the default rate"
                );
                BaselineTable::new()
            }
        }
    }

    async fn fetch_remote(&self, url: &str) -> Result<BaselineFile, StoreError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| StoreError::Json {
            context: url.to_string(),
            source: e,
        })
    }
}
