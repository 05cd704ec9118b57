//! `VideoService` trait and the `ApiClient` HTTP implementation.
//!
//! Each operation is exactly one request and one normalized result.  Nothing
//! is retried, cached or stored here; retry policy belongs to the pipeline
//! coordinator.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::config::ServiceConfig;
use crate::service::types::{
    AnalyzeResponse, FormattedTranscript, HealthResponse, RawTranscript, TranslateResponse,
};

// ---------------------------------------------------------------------------
// ServiceError
// ---------------------------------------------------------------------------

/// Normalized failure of a remote operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// The service answered with a non-success status.  Carries the message
    /// found in the response body, or a generic phrase.
    #[error("{0}")]
    Server(String),

    /// The request was sent but no response came back.
    #[error("cannot reach the analysis service, check the network connection")]
    Unreachable,

    /// Anything else: malformed response body, client-side failure.
    #[error("unexpected error talking to the analysis service: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() || e.is_request() {
            ServiceError::Unreachable
        } else {
            ServiceError::Unknown(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// The endpoints exposed by the analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Transcript,
    FormatTranscript,
    Translate,
    Analyze,
    Health,
}

impl Operation {
    /// Path appended to the configured base URL.
    pub fn path(self) -> &'static str {
        match self {
            Operation::Transcript => "/transcript",
            Operation::FormatTranscript => "/format-transcript",
            Operation::Translate => "/translate",
            Operation::Analyze => "/analyze",
            Operation::Health => "/health",
        }
    }

    /// Body field each endpoint puts its error message in.  The other field
    /// is consulted as a fallback.
    fn message_keys(self) -> [&'static str; 2] {
        match self {
            Operation::FormatTranscript | Operation::Translate => ["error", "message"],
            Operation::Transcript | Operation::Analyze | Operation::Health => {
                ["message", "error"]
            }
        }
    }

    fn fallback_message(self) -> &'static str {
        match self {
            Operation::Transcript | Operation::Analyze => "server error",
            Operation::FormatTranscript => "failed to format transcript",
            Operation::Translate => "translation failed",
            Operation::Health => "health check failed",
        }
    }

    /// Extract a human-readable message from an error response body.
    ///
    /// Only string values count: the service sends `"error": true` next to
    /// `message` on some endpoints.
    pub fn server_message(self, body: &str) -> String {
        let json: Option<Value> = serde_json::from_str(body).ok();
        self.message_keys()
            .iter()
            .find_map(|key| {
                json.as_ref()?
                    .get(*key)?
                    .as_str()
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(String::from)
            })
            .unwrap_or_else(|| self.fallback_message().to_string())
    }
}

// ---------------------------------------------------------------------------
// VideoService trait
// ---------------------------------------------------------------------------

/// Async gateway to the remote analysis capability.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks as
/// `Arc<dyn VideoService>`.
#[async_trait]
pub trait VideoService: Send + Sync {
    /// Raw captions of the video at `url`.
    async fn fetch_transcript(&self, url: &str) -> Result<RawTranscript, ServiceError>;

    /// Captions of the video at `url`, split into readable sentences and
    /// paragraphs.
    async fn fetch_formatted_transcript(
        &self,
        url: &str,
    ) -> Result<FormattedTranscript, ServiceError>;

    /// Chinese translation of `text`.
    async fn translate_text(&self, text: &str) -> Result<String, ServiceError>;

    /// Structured content analysis of the video at `url`.
    async fn analyze_video(&self, url: &str) -> Result<String, ServiceError>;

    /// Liveness check.
    async fn health(&self) -> Result<(), ServiceError>;
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// JSON-over-HTTP client for the analysis service.
///
/// The base URL comes exclusively from the [`ServiceConfig`] passed at
/// construction; it is never re-read per call.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build an `ApiClient` from the service config.
    ///
    /// A default (no-timeout) client is used if the builder fails.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self::with_client(client, &config.base_url)
    }

    /// Use a pre-built `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL endpoint paths are appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, op: Operation) -> String {
        format!("{}{}", self.base_url, op.path())
    }

    async fn post<T: DeserializeOwned>(
        &self,
        op: Operation,
        body: Value,
    ) -> Result<T, ServiceError> {
        let request = self.client.post(self.endpoint(op)).json(&body);
        Self::finish(op, request).await
    }

    async fn finish<T: DeserializeOwned>(
        op: Operation,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ServiceError> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = op.server_message(&body);
            log::debug!("service: {} returned {status}: {message}", op.path());
            return Err(ServiceError::Server(message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Unknown(format!("malformed response: {e}")))
    }
}

#[async_trait]
impl VideoService for ApiClient {
    async fn fetch_transcript(&self, url: &str) -> Result<RawTranscript, ServiceError> {
        self.post(Operation::Transcript, serde_json::json!({ "url": url }))
            .await
    }

    async fn fetch_formatted_transcript(
        &self,
        url: &str,
    ) -> Result<FormattedTranscript, ServiceError> {
        self.post(Operation::FormatTranscript, serde_json::json!({ "url": url }))
            .await
    }

    async fn translate_text(&self, text: &str) -> Result<String, ServiceError> {
        let response: TranslateResponse = self
            .post(Operation::Translate, serde_json::json!({ "text": text }))
            .await?;
        Ok(response.translated_text)
    }

    async fn analyze_video(&self, url: &str) -> Result<String, ServiceError> {
        let response: AnalyzeResponse = self
            .post(Operation::Analyze, serde_json::json!({ "url": url }))
            .await?;
        Ok(response.analysis)
    }

    async fn health(&self) -> Result<(), ServiceError> {
        let request = self.client.get(self.endpoint(Operation::Health));
        let response: HealthResponse = Self::finish(Operation::Health, request).await?;
        if response.status == "ok" {
            Ok(())
        } else {
            Err(ServiceError::Server(format!(
                "service reports status {:?}",
                response.status
            )))
        }
    }
}

/// Run [`VideoService::health`] but give up after `limit`.  A check that
/// runs out of time reports [`ServiceError::Unreachable`].
pub async fn check_health(
    service: &dyn VideoService,
    limit: Duration,
) -> Result<(), ServiceError> {
    match tokio::time::timeout(limit, service.health()).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::Unreachable),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
