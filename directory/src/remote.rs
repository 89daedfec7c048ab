//! Remote directory client.
//!
//! Thin wrapper over the directory service's JSON API. Every response is an
//! envelope:
//!
//! ```json
//! { "success": true, "data": [ ... ], "message": "optional" }
//! ```
//!
//! Network errors, timeouts, non-2xx statuses, undecodable bodies and
//! `success: false` envelopes all come back as [`RemoteError`]. Callers only
//! ever see `Ok` or `Err`; nothing here panics on bad input.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::DirectoryConfig;
use crate::record::{CreatePayload, RawVolunteer, VolunteerRecord, normalize_all};

/// Error types for the remote client
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error: HTTP {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Remote rejected request: {message}")]
    Rejected { message: String },

    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Response did not contain a usable volunteer record")]
    MalformedRecord,
}

impl RemoteError {
    /// Machine-readable code for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Http(e) if e.is_timeout() => "timeout",
            Self::Http(_) => "network",
            Self::Status { .. } => "http_status",
            Self::Rejected { .. } => "rejected",
            Self::Decode(_) => "decode",
            Self::MalformedRecord => "malformed_record",
        }
    }
}

/// Result of the service health probe.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Remote directory contract used by the reconciler.
#[async_trait]
pub trait DirectoryRemote: Send + Sync {
    /// Fetch the full volunteer list.
    async fn list(&self) -> Result<Vec<VolunteerRecord>, RemoteError>;

    /// Create a volunteer; returns the server-assigned record.
    async fn create(&self, payload: &CreatePayload) -> Result<VolunteerRecord, RemoteError>;

    /// Delete a volunteer by id.
    async fn delete(&self, id: &str) -> Result<(), RemoteError>;

    /// Probe service health.
    async fn health(&self) -> Result<HealthStatus, RemoteError>;
}

/// `{success, data, message}` wrapper returned by every endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<Option<T>, RemoteError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(RemoteError::Rejected {
                message: self
                    .message
                    .unwrap_or_else(|| "remote reported failure".to_string()),
            })
        }
    }
}

/// HTTP implementation of [`DirectoryRemote`].
pub struct HttpDirectoryClient {
    client: Client,
    base_url: String,
}

impl HttpDirectoryClient {
    /// Create a client from configuration
    pub fn new(config: &DirectoryConfig) -> Result<Self, RemoteError> {
        Self::with_base_url(&config.api_base_url, config.timeout())
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the configured base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn volunteers_url(&self) -> String {
        format!("{}/volunteers", self.base_url)
    }

    /// Check the status line, then decode the body as JSON.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl DirectoryRemote for HttpDirectoryClient {
    async fn list(&self) -> Result<Vec<VolunteerRecord>, RemoteError> {
        let url = self.volunteers_url();
        tracing::debug!("GET {url}");
        let response = self.client.get(&url).send().await?;
        let envelope: Envelope<Vec<RawVolunteer>> = Self::decode(response).await?;
        let raw = envelope.into_data()?.unwrap_or_default();
        Ok(normalize_all(raw))
    }

    async fn create(&self, payload: &CreatePayload) -> Result<VolunteerRecord, RemoteError> {
        let url = self.volunteers_url();
        tracing::debug!("POST {url}");
        let response = self.client.post(&url).json(payload).send().await?;
        let envelope: Envelope<RawVolunteer> = Self::decode(response).await?;
        envelope
            .into_data()?
            .and_then(RawVolunteer::normalize)
            .ok_or(RemoteError::MalformedRecord)
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        let url = format!("{}/{}", self.volunteers_url(), urlencoding::encode(id));
        tracing::debug!("DELETE {url}");
        let response = self.client.delete(&url).send().await?;
        let envelope: Envelope<serde_json::Value> = Self::decode(response).await?;
        envelope.into_data()?;
        Ok(())
    }

    async fn health(&self) -> Result<HealthStatus, RemoteError> {
        let url = format!("{}/health", self.base_url);
        tracing::debug!("GET {url}");
        let response = self.client.get(&url).send().await?;
        Self::decode(response).await
    }
}
