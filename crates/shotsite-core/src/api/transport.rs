//! Network boundary for the content client.
//!
//! `HttpTransport` talks to the live CMS; `SnapshotTransport` serves the
//! JSON files written by the snapshot exporter for static hosting.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::ApiError;
use crate::export::snapshot_file_name;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 500;

#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `query` (path plus query string, relative to the API root) and
    /// return the parsed response body.
    async fn get_json(&self, query: &str) -> Result<Value, ApiError>;
}

/// Live CMS transport.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    api_base: String,
    initial_backoff: Duration,
}

impl HttpTransport {
    /// `origin` is the CMS host, e.g. `https://cms.example.com`; requests go
    /// to `<origin>/api<query>`.
    pub fn new(origin: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_base: format!("{}/api", origin.trim_end_matches('/')),
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    /// First 429 backoff; doubles on every further retry.
    pub fn with_initial_backoff(self, initial_backoff: Duration) -> Self {
        Self { initial_backoff, ..self }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, query: &str) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.api_base, query);
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            let response = self.client.get(&url).send().await?;
            let status = response.status();

            if status.is_success() {
                let body = response.text().await?;
                debug!(url = %url, bytes = body.len(), "CMS response received");
                return serde_json::from_str(&body)
                    .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", url, e)));
            }

            if status.as_u16() == 429 {
                retries += 1;
                if retries > MAX_RATE_LIMIT_RETRIES {
                    return Err(ApiError::RateLimited);
                }
                warn!(url = %url, retry = retries, backoff_ms = backoff.as_millis() as u64, "Rate limited, backing off");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }
    }
}

/// Reads exported snapshot files instead of hitting the network.
/// Queries that were never exported (e.g. per-slug lookups) yield
/// `ApiError::Snapshot`.
#[derive(Debug, Clone)]
pub struct SnapshotTransport {
    dir: PathBuf,
}

impl SnapshotTransport {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl Transport for SnapshotTransport {
    async fn get_json(&self, query: &str) -> Result<Value, ApiError> {
        let path = self.dir.join(snapshot_file_name(query));
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ApiError::Snapshot(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path.display(), e)))
    }
}
