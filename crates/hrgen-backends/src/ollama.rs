//! Ollama local backend adapter.
//!
//! Talks to a locally hosted Ollama instance via
//! `POST {base}/api/generate` with a non-streaming payload. A local service
//! being down maps to `ConnectionUnavailable`, which is retryable; the
//! policy caps attempts so a stopped daemon is not hammered indefinitely.

use async_trait::async_trait;
use hrgen_core::{
    BackendKind, GatewayError, GatewayResult, GenerationRequest, HealthStatus, TextBackend,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

/// Ollama backend configuration.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Backend instance id.
    pub id: String,
    /// Base URL of the Ollama API, e.g. `http://localhost:11434`.
    pub base_url: String,
    /// Model name, e.g. `deepseek-r1:8b`.
    pub model: String,
    /// Per-attempt request timeout.
    pub timeout: Duration,
}

impl OllamaConfig {
    /// Create a configuration for the given endpoint and model.
    #[must_use]
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: "ollama-local".to_string(),
            base_url: base_url.into(),
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

    /// Set the per-attempt timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Ollama backend adapter.
pub struct OllamaBackend {
    config: OllamaConfig,
    client: Client,
}

impl OllamaBackend {
    /// Create a new Ollama backend.
    ///
    /// # Errors
    /// Returns a configuration error if the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: OllamaConfig) -> GatewayResult<Self> {
        Url::parse(&config.base_url).map_err(|e| {
            GatewayError::configuration(format!("invalid Ollama base URL '{}': {e}", config.base_url))
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
                format!(
                    "cannot connect to Ollama at {}: {error}",
                    self.config.base_url
                ),
            )
        } else {
            GatewayError::unknown(&self.config.id, error.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: String,
    done_reason: Option<String>,
}

#[async_trait]
impl TextBackend for OllamaBackend {
    fn id(&self) -> &str {
        &self.config.id
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn timeout(&self) -> Duration {
        self.config.timeout
    }

    async fn generate(&self, request: &GenerationRequest) -> GatewayResult<String> {
        let url = self.endpoint("api/generate");
        let params = request.params();
        let payload = OllamaGenerateRequest {
            model: &self.config.model,
            prompt: request.prompt(),
            stream: false,
            options: OllamaOptions {
                temperature: params.temperature.value(),
                num_predict: params.max_tokens.value(),
            },
        };

        debug!(
            backend = %self.config.id,
            model = %self.config.model,
            request_id = %request.id(),
            "sending Ollama generate request"
        );

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(backend = %self.config.id, error = %e, "Ollama request failed");
                self.map_transport_error(&e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            GatewayError::malformed_response(
                &self.config.id,
                format!("failed to read response body: {e}"),
            )
        })?;

        if status.is_server_error() {
            // A local daemon answering 5xx is treated like an unavailable
            // service: the condition usually clears once the model loads.
            return Err(GatewayError::connection_unavailable(
                &self.config.id,
                format!("Ollama answered HTTP {status}"),
            ));
        }
        if !status.is_success() {
            return Err(GatewayError::unknown(
                &self.config.id,
                format!("Ollama answered HTTP {status}: {body}"),
            ));
        }

        let parsed: OllamaGenerateResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::malformed_response(&self.config.id, format!("invalid JSON: {e}"))
        })?;

        if let Some(reason) = parsed.done_reason.as_deref() {
            if reason == "length" {
                return Err(GatewayError::truncated(&self.config.id, reason));
            }
        }
        if parsed.response.trim().is_empty() {
            return Err(GatewayError::malformed_response(
                &self.config.id,
                "empty response text",
            ));
        }

        debug!(
            backend = %self.config.id,
            request_id = %request.id(),
            chars = parsed.response.len(),
            "Ollama generation succeeded"
        );
        Ok(parsed.response)
    }

    async fn health(&self) -> HealthStatus {
        let url = self.endpoint("api/tags");
        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => HealthStatus::Healthy,
            Ok(_) => HealthStatus::Degraded,
            Err(_) => HealthStatus::Unhealthy,
        }
    }
}
