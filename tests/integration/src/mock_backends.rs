//! Wiremock-based fakes for the Ollama and Groq HTTP APIs.

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock Ollama server.
pub struct MockOllama {
    /// The underlying wiremock server.
    pub server: MockServer,
}

impl MockOllama {
    /// Start a fresh mock server.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL of this server.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Answer every generate call with the given text.
    pub async fn mock_generate(&self, text: &str) {
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "deepseek-r1:8b",
                "response": text,
                "done": true,
                "done_reason": "stop"
            })))
            .mount(&self.server)
            .await;
    }

    /// Fail the first `failures` generate calls with HTTP 503, then succeed.
    ///
    /// The failing mock is mounted first with `up_to_n_times` so it exhausts
    /// itself before the success mock answers.
    pub async fn mock_flaky_generate(&self, failures: u64, text: &str) {
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(failures)
            .mount(&self.server)
            .await;
        self.mock_generate(text).await;
    }

    /// Answer with a response the model cut off at the token limit.
    pub async fn mock_truncated_generate(&self, partial: &str) {
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "deepseek-r1:8b",
                "response": partial,
                "done": true,
                "done_reason": "length"
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer every generate call with a delay before the body.
    pub async fn mock_slow_generate(&self, text: &str, delay: Duration) {
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": text, "done": true}))
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Serve the tags endpoint so health probes succeed.
    pub async fn mock_tags(&self) {
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
            .mount(&self.server)
            .await;
    }
}

/// Mock Groq (OpenAI-compatible) server.
pub struct MockGroq {
    /// The underlying wiremock server.
    pub server: MockServer,
}

impl MockGroq {
    /// Start a fresh mock server.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL of this server.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Answer every chat completion with the given content.
    pub async fn mock_chat_completion(&self, content: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": content},
                    "finish_reason": "stop"
                }]
            })))
            .mount(&self.server)
            .await;
    }

    /// Throttle every chat completion with a `Retry-After` header.
    pub async fn mock_rate_limited(&self, retry_after_secs: u64) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(429)
                    .set_body_json(json!({
                        "error": {"message": "Rate limit reached", "type": "tokens"}
                    }))
                    .append_header("Retry-After", retry_after_secs.to_string().as_str()),
            )
            .mount(&self.server)
            .await;
    }

    /// Reject every chat completion with an invalid-key error.
    pub async fn mock_auth_error(&self) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Invalid API Key", "type": "invalid_request_error"}
            })))
            .mount(&self.server)
            .await;
    }

    /// Serve the models endpoint so health probes succeed.
    pub async fn mock_models(&self) {
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{"id": "llama-3.3-70b-versatile", "object": "model"}]
            })))
            .mount(&self.server)
            .await;
    }
}
