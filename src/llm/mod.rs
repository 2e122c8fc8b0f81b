pub mod anthropic;
pub mod config;
pub mod openai;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Response};
use thiserror::Error;

pub use anthropic::TranslationClient;
pub use openai::VisionClient;

pub type Result<T> = std::result::Result<T, LlmError>;

#[derive(Debug, Error)]
pub enum LlmError {
    /// Non-success status, or a success response without the expected text.
    #[error("{provider} upstream error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Upstream {
        provider: &'static str,
        status: Option<u16>,
        message: String,
    },

    #[error("{provider} request timed out after {seconds} seconds")]
    Timeout { provider: &'static str, seconds: u64 },

    #[error("failed to build {provider} client: {message}")]
    Client {
        provider: &'static str,
        message: String,
    },
}

impl LlmError {
    pub(crate) fn upstream(
        provider: &'static str,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::Upstream {
            provider,
            status,
            message: message.into(),
        }
    }

    pub(crate) fn from_transport(
        provider: &'static str,
        timeout: Duration,
        err: reqwest::Error,
    ) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                provider,
                seconds: timeout.as_secs(),
            }
        } else {
            Self::upstream(provider, err.status().map(|s| s.as_u16()), err.to_string())
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Answers a question about an image.
#[async_trait]
pub trait VisionReasoner: Send + Sync {
    async fn analyze(&self, image: &[u8], question: &str) -> Result<String>;
}

/// Translates a finished answer, keeping its notation intact.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String>;
}

pub(crate) fn build_http_client(
    provider: &'static str,
    headers: HeaderMap,
    timeout: Duration,
) -> Result<Client> {
    Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Client {
            provider,
            message: e.to_string(),
        })
}

/// Passes a success response through, turns anything else into `LlmError::Upstream`.
pub(crate) async fn check_response(provider: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or(body);

    Err(LlmError::upstream(provider, Some(status.as_u16()), message))
}

/// Reads a JSON body, treating an unreadable or mis-shaped payload as an upstream failure.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    provider: &'static str,
    timeout: Duration,
    response: Response,
) -> Result<T> {
    let text = response
        .text()
        .await
        .map_err(|e| LlmError::from_transport(provider, timeout, e))?;
    serde_json::from_str(&text)
        .map_err(|e| LlmError::upstream(provider, None, format!("malformed response: {e}")))
}
