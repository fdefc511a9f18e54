//! Transport seam for backend calls.
//!
//! Production traffic goes through [`HttpTransport`]; tests implement
//! [`Transport`] with scripted fakes. The transport owns the request
//! timeout; a timed-out call surfaces as [`ApiError::Timeout`] and is
//! treated by the session manager like any other failure.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::ApiError;

/// Default request timeout.
/// 30s allows for slow backend responses while failing fast enough for an
/// interactive login flow.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum length of a response body quoted in an error message.
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Seam for issuing backend calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `base_url` + `path` and return the parsed JSON reply.
    async fn post(&self, base_url: &str, path: &str, body: Value) -> Result<Value, ApiError>;
}

/// Transport backed by reqwest.
/// Clone is cheap - the inner client shares its connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ApiError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Build a transport with an explicit request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, base_url: &str, path: &str, body: Value) -> Result<Value, ApiError> {
        let url = format!("{}{}", base_url, path);
        debug!(url = %url, "sending backend request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = response.status();
        let text = response.text().await.map_err(from_reqwest)?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(|err| ApiError::InvalidResponse(err.to_string()))
        } else {
            Err(parse_backend_error(status, &text))
        }
    }
}

fn from_reqwest(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(err.to_string())
    }
}

/// Backend errors arrive as `{"code": <n>, "message": "..."}`. Anything else
/// degrades to the HTTP status line plus a truncated body.
fn parse_backend_error(status: reqwest::StatusCode, body: &str) -> ApiError {
    #[derive(Deserialize)]
    struct ErrorReply {
        code: u32,
        message: String,
    }

    match serde_json::from_str::<ErrorReply>(body) {
        Ok(reply) => ApiError::Backend {
            code: reply.code,
            message: reply.message,
        },
        Err(_) => ApiError::InvalidResponse(format!("status {}: {}", status, truncate_body(body))),
    }
}

/// Truncate a response body to avoid quoting excessive data.
fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        body.to_string()
    } else {
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..MAX_ERROR_BODY_LENGTH],
            body.len()
        )
    }
}
