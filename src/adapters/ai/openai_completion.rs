//! OpenAI completion client - Implementation of CompletionClient over the
//! Responses API.
//!
//! Threads are kept by the service: each reply carries a response id, and
//! sending it back as `previous_response_id` continues the same thread. The
//! relay never stores conversation history itself.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key)
//!     .with_model("gpt-4o-mini")
//!     .with_timeout(Duration::from_secs(300));
//!
//! let client = OpenAICompletionClient::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{CompletionClient, CompletionError, CompletionReply, CompletionRequest};

const DEFAULT_RETRY_AFTER_SECS: u32 = 30;

/// Configuration for the OpenAI completion client.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    api_key: Secret<String>,
    /// Model to use (e.g., "gpt-4o-mini").
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl OpenAIConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_secret(Secret::new(api_key.into()))
    }

    /// Creates a new configuration from an already-wrapped key.
    pub fn with_secret(api_key: Secret<String>) -> Self {
        Self {
            api_key,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(300),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI Responses API client.
pub struct OpenAICompletionClient {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAICompletionClient {
    /// Creates a client whose HTTP timeout is `config.timeout`.
    pub fn new(config: OpenAIConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn responses_url(&self) -> String {
        format!("{}/responses", self.config.base_url.trim_end_matches('/'))
    }

    fn to_openai_request<'a>(&'a self, request: &'a CompletionRequest) -> ResponsesRequest<'a> {
        ResponsesRequest {
            model: &self.config.model,
            instructions: &request.system_prompt,
            input: &request.text,
            previous_response_id: request.continuation.as_ref().map(|t| t.as_str()),
            max_output_tokens: request.parameters.max_output_tokens,
            temperature: request.parameters.temperature,
            store: true,
        }
    }

    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, CompletionError> {
        self.client
            .post(self.responses_url())
            .bearer_auth(self.config.api_key())
            .json(&self.to_openai_request(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    CompletionError::network(format!("Connection failed: {}", e))
                } else {
                    CompletionError::network(e.to_string())
                }
            })
    }

    async fn parse_response(&self, response: Response) -> Result<CompletionReply, CompletionError> {
        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after_header(response.headers());
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_status(status.as_u16(), retry_after, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::network(format!("Failed to read response: {}", e)))?;
        parse_reply(&body)
    }
}

#[async_trait]
impl CompletionClient for OpenAICompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionReply, CompletionError> {
        tracing::debug!(
            model = %self.config.model,
            continues_thread = request.continuation.is_some(),
            "Requesting completion"
        );
        let response = self.send_request(&request).await?;
        self.parse_response(response).await
    }
}

/// Maps a non-success status to a completion error.
fn map_error_status(status: u16, retry_after: Option<u32>, body: &str) -> CompletionError {
    match status {
        401 | 403 => CompletionError::AuthenticationFailed,
        429 if body.contains("insufficient_quota") => {
            CompletionError::QuotaExceeded(error_message(body))
        }
        429 => CompletionError::rate_limited(
            retry_after
                .or_else(|| retry_after_from_message(body))
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        ),
        400 | 404 | 422 => CompletionError::InvalidRequest(error_message(body)),
        500..=599 => {
            CompletionError::unavailable(format!("Server error {}: {}", status, error_message(body)))
        }
        _ => CompletionError::network(format!("Unexpected status {}: {}", status, body)),
    }
}

fn retry_after_header(headers: &HeaderMap) -> Option<u32> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u32>().ok())
}

/// Extracts the wait from a "try again in 1.5s" style hint, in whole seconds.
///
/// Accepts `ms`, `s` and `m` units and rounds up, so a sub-second hint
/// still waits one second.
fn retry_after_from_message(body: &str) -> Option<u32> {
    let message = error_message(body);
    let idx = message.find("try again in ")?;
    let rest = &message[idx + "try again in ".len()..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(rest.len());
    let value: f64 = rest[..end].trim_end_matches('.').parse().ok()?;

    let unit = &rest[end..];
    let seconds = if unit.starts_with("ms") {
        value / 1000.0
    } else if unit.starts_with('m') {
        value * 60.0
    } else {
        value
    };
    Some(seconds.ceil().max(1.0) as u32)
}

/// The `error.message` field of an error body, or the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.to_string())
}

/// Parses a successful Responses API body.
fn parse_reply(body: &str) -> Result<CompletionReply, CompletionError> {
    let response: ResponsesResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::parse(format!("Failed to parse response: {}", e)))?;

    let text: String = response
        .output
        .iter()
        .flat_map(|item| item.content.iter())
        .filter(|content| content.kind == "output_text")
        .filter_map(|content| content.text.as_deref())
        .collect();

    if response.id.is_empty() {
        return Err(CompletionError::parse("Response has no id"));
    }

    Ok(CompletionReply::new(text, response.id))
}

// ════════════════════════════════════════════════════════════════════════════════
// OpenAI API Types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_response_id: Option<&'a str>,
    max_output_tokens: u32,
    temperature: f32,
    store: bool,
}

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    id: String,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Debug, Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}
