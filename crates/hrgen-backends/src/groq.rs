//! Groq cloud backend adapter.
//!
//! Talks to Groq's OpenAI-compatible chat completions API with bearer
//! authentication. Status codes are distinguished per the taxonomy:
//! 401/403 are terminal credential failures, 429 carries the `Retry-After`
//! header as a hint, 5xx and transport failures are retryable.

use async_trait::async_trait;
use hrgen_core::{
    BackendKind, GatewayError, GatewayResult, GenerationRequest, HealthStatus, TextBackend,
};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

/// Groq backend configuration.
#[derive(Debug, Clone)]
pub struct GroqConfig {
    /// Backend instance id.
    pub id: String,
    /// API key.
    pub api_key: SecretString,
    /// Base URL, e.g. `https://api.groq.com/openai/v1`.
    pub base_url: String,
    /// Model name, e.g. `llama-3.3-70b-versatile`.
    pub model: String,
    /// Per-attempt request timeout.
    pub timeout: Duration,
}

impl GroqConfig {
    /// Create a configuration for the given key and model.
    #[must_use]
    pub fn new(api_key: SecretString, model: impl Into<String>) -> Self {
        Self {
            id: "groq-cloud".to_string(),
            api_key,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: model.into(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Set the instance id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the base URL (used by tests and proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-attempt timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Groq backend adapter.
pub struct GroqBackend {
    config: GroqConfig,
    client: Client,
}

impl GroqBackend {
    /// Create a new Groq backend.
    ///
    /// # Errors
    /// Returns a configuration error if the API key is empty, the base URL
    /// is invalid, or the HTTP client cannot be built.
    pub fn new(config: GroqConfig) -> GatewayResult<Self> {
        if config.api_key.expose_secret().is_empty() {
            return Err(GatewayError::configuration("Groq API key is not set"));
        }
        Url::parse(&config.base_url).map_err(|e| {
            GatewayError::configuration(format!("invalid Groq base URL '{}': {e}", config.base_url))
        })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(8)
            .build()
            .map_err(|e| GatewayError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn map_transport_error(&self, error: &reqwest::Error) -> GatewayError {
        if error.is_timeout() {
            GatewayError::timeout(&self.config.id, self.config.timeout)
        } else if error.is_connect() {
            GatewayError::connection_unavailable(
                &self.config.id,
                format!("cannot connect to Groq API: {error}"),
            )
        } else {
            GatewayError::unknown(&self.config.id, error.to_string())
        }
    }

    fn map_status_error(
        &self,
        status: StatusCode,
        retry_after: Option<Duration>,
        body: &str,
    ) -> GatewayError {
        let detail = parse_error_message(body).unwrap_or_else(|| format!("HTTP {status}"));
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                GatewayError::auth_invalid(&self.config.id, detail)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                GatewayError::rate_limited(&self.config.id, retry_after, detail)
            }
            s if s.is_server_error() => {
                GatewayError::connection_unavailable(&self.config.id, detail)
            }
            _ => GatewayError::unknown(
                &self.config.id,
                format!("HTTP {status}: {detail}"),
            ),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|e| e.error.message)
}

/// Parse a `Retry-After` header, either delta-seconds or an HTTP-date.
///
/// A date in the past yields no hint rather than a zero wait.
fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    let when = chrono::DateTime::parse_from_rfc2822(value).ok()?;
    when.signed_duration_since(chrono::Utc::now()).to_std().ok()
}

#[async_trait]
impl TextBackend for GroqBackend {
    fn id(&self) -> &str {
        &self.config.id
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Cloud
    }

    fn timeout(&self) -> Duration {
        self.config.timeout
    }

    async fn generate(&self, request: &GenerationRequest) -> GatewayResult<String> {
        let url = self.endpoint("chat/completions");
        let params = request.params();
        let payload = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: request.prompt(),
            }],
            temperature: params.temperature.value(),
            max_tokens: params.max_tokens.value(),
        };

        debug!(
            backend = %self.config.id,
            model = %self.config.model,
            request_id = %request.id(),
            "sending Groq chat completion request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(backend = %self.config.id, error = %e, "Groq request failed");
                self.map_transport_error(&e)
            })?;

        let status = response.status();
        let retry_after = parse_retry_after(response.headers());
        let body = response.text().await.map_err(|e| {
            GatewayError::malformed_response(
                &self.config.id,
                format!("failed to read response body: {e}"),
            )
        })?;

        if !status.is_success() {
            let mapped = self.map_status_error(status, retry_after, &body);
            warn!(
                backend = %self.config.id,
                status = status.as_u16(),
                kind = %mapped.kind(),
                "Groq answered with an error status"
            );
            return Err(mapped);
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::malformed_response(&self.config.id, format!("invalid JSON: {e}"))
        })?;

        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            GatewayError::malformed_response(&self.config.id, "no completion choices returned")
        })?;

        if choice.finish_reason.as_deref() == Some("length") {
            return Err(GatewayError::truncated(&self.config.id, "length"));
        }

        let text = choice.message.content.unwrap_or_default();
        if text.trim().is_empty() {
            return Err(GatewayError::malformed_response(
                &self.config.id,
                "empty response text",
            ));
        }

        debug!(
            backend = %self.config.id,
            request_id = %request.id(),
            chars = text.len(),
            "Groq generation succeeded"
        );
        Ok(text)
    }

    async fn health(&self) -> HealthStatus {
        let url = self.endpoint("models");
        match self
            .client
            .get(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .timeout(Duration::from_secs(10))
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => HealthStatus::Healthy,
            Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                HealthStatus::Degraded
            }
            Ok(_) | Err(_) => HealthStatus::Unhealthy,
        }
    }
}
