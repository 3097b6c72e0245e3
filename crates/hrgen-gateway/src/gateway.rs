//! Gateway orchestration.
//!
//! The attempt loop walks the states NOT_STARTED -> ATTEMPTING(n) ->
//! SUCCEEDED | FAILED_TERMINAL. A retryable failure with attempts remaining
//! moves to ATTEMPTING(n+1) after the policy's backoff; a non-retryable
//! failure or exhausted attempts is terminal. The last error's detail is
//! always carried into the terminal failure.

use hrgen_backends::{BackendRegistry, GroqBackend, GroqConfig, OllamaBackend, OllamaConfig};
use hrgen_config::GatewaySettings;
use hrgen_core::{
    BackendKind, GatewayError, GatewayResult, GenerationFailure, GenerationParams,
    GenerationRequest, GenerationResult, HealthStatus, MaxTokens, Temperature,
};
use hrgen_resilience::{bounded, RetryConfig, RetryPolicy};
use hrgen_telemetry::{AttemptEvent, AttemptOutcome, TelemetrySink};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Health of one registered backend.
#[derive(Debug, Clone, Serialize)]
pub struct BackendHealth {
    /// Backend instance id.
    pub backend_id: String,
    /// Backend selector.
    pub backend: BackendKind,
    /// Probe result.
    pub status: HealthStatus,
}

/// Per-backend default generation parameters.
#[derive(Debug, Clone, Copy, Default)]
struct ParamDefaults {
    local: GenerationParams,
    cloud: GenerationParams,
}

/// The generation gateway.
///
/// Stateless across calls apart from its retry policy, backend handles, and
/// telemetry sink, all of which live for the process lifetime.
pub struct Gateway {
    registry: BackendRegistry,
    policy: RetryPolicy,
    sink: Arc<dyn TelemetrySink>,
    defaults: ParamDefaults,
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("policy", &self.policy)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Create a gateway from pre-built components.
    #[must_use]
    pub fn new(
        registry: BackendRegistry,
        policy: RetryPolicy,
        sink: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            registry,
            policy,
            sink,
            defaults: ParamDefaults::default(),
        }
    }

    /// Build both backend adapters, the retry policy, and per-backend
    /// parameter defaults from validated settings.
    ///
    /// # Errors
    /// Returns a configuration error if an adapter cannot be constructed or
    /// a configured default parameter is out of range.
    pub fn from_settings(
        settings: &GatewaySettings,
        sink: Arc<dyn TelemetrySink>,
    ) -> GatewayResult<Self> {
        let local = OllamaBackend::new(
            OllamaConfig::new(settings.local.base_url.clone(), settings.local.model.clone())
                .with_timeout(settings.local.timeout),
        )?;

        let api_key = settings
            .cloud
            .api_key
            .clone()
            .ok_or_else(|| GatewayError::configuration("cloud API key is not set"))?;
        let cloud = GroqBackend::new(
            GroqConfig::new(api_key, settings.cloud.model.clone())
                .with_base_url(settings.cloud.base_url.clone())
                .with_timeout(settings.cloud.timeout),
        )?;

        let policy = RetryPolicy::new(RetryConfig {
            max_attempts: settings.retry.max_attempts,
            base_delay: settings.retry.base_delay,
            max_delay: settings.retry.max_delay,
            jitter: settings.retry.jitter,
        });

        let defaults = ParamDefaults {
            local: params_from(settings.local.temperature, settings.local.max_tokens)?,
            cloud: params_from(settings.cloud.temperature, settings.cloud.max_tokens)?,
        };

        Ok(Self {
            registry: BackendRegistry::new(Arc::new(local), Arc::new(cloud)),
            policy,
            sink,
            defaults,
        })
    }

    /// Build a request using the configured per-backend default parameters.
    ///
    /// # Errors
    /// Returns a validation error if the prompt is empty.
    pub fn request(
        &self,
        prompt: impl Into<String>,
        backend: BackendKind,
    ) -> GatewayResult<GenerationRequest> {
        let params = match backend {
            BackendKind::Local => self.defaults.local,
            BackendKind::Cloud => self.defaults.cloud,
        };
        GenerationRequest::builder()
            .prompt(prompt)
            .backend(backend)
            .params(params)
            .build()
    }

    /// Submit a request, retrying per the policy.
    ///
    /// Each attempt is bounded by the backend's timeout. On success no
    /// further attempts occur; a non-retryable failure returns immediately;
    /// after max attempts the last failure is returned as terminal.
    ///
    /// # Errors
    /// Returns a [`GenerationFailure`] carrying the classified kind, attempt
    /// count, and the last error's full detail.
    pub async fn submit(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResult, GenerationFailure> {
        self.run(request, None).await
    }

    /// Submit with a caller-supplied overall deadline.
    ///
    /// The deadline bounds every suspension point: an in-flight attempt is
    /// aborted and classified `Timeout` (consuming its retry slot), and a
    /// deadline expiring during backoff terminates the call with the last
    /// attempt's failure.
    ///
    /// # Errors
    /// As [`submit`](Self::submit).
    pub async fn submit_with_deadline(
        &self,
        request: GenerationRequest,
        deadline: Duration,
    ) -> Result<GenerationResult, GenerationFailure> {
        self.run(request, Some(deadline)).await
    }

    /// Probe every registered backend.
    pub async fn health(&self) -> Vec<BackendHealth> {
        let mut report = Vec::new();
        for backend in self.registry.all() {
            let status = backend.health().await;
            report.push(BackendHealth {
                backend_id: backend.id().to_string(),
                backend: backend.kind(),
                status,
            });
        }
        report
    }

    async fn run(
        &self,
        request: GenerationRequest,
        deadline: Option<Duration>,
    ) -> Result<GenerationResult, GenerationFailure> {
        let backend = self.registry.resolve(request.backend());
        let started = Instant::now();
        let max_attempts = self.policy.max_attempts();
        let mut last_error: Option<GatewayError> = None;
        let mut attempts_made = 0_u32;

        for attempt in 1..=max_attempts {
            let Some(limit) = attempt_limit(backend.timeout(), deadline, started) else {
                // Deadline spent. The last attempt's error stays; a timeout
                // is synthesized only when no attempt ever ran.
                if last_error.is_none() {
                    last_error = Some(GatewayError::timeout(
                        backend.id(),
                        deadline.unwrap_or_default(),
                    ));
                }
                break;
            };

            let attempt_started = Instant::now();
            let outcome = bounded(backend.id(), limit, backend.generate(&request)).await;
            attempts_made = attempt;

            self.sink.record(&AttemptEvent::new(
                request.id(),
                backend.id(),
                backend.kind(),
                attempt,
                attempt_started.elapsed(),
                match &outcome {
                    Ok(_) => AttemptOutcome::Succeeded,
                    Err(e) => AttemptOutcome::Failed {
                        kind: e.kind(),
                        retryable: e.is_retryable(),
                    },
                },
            ));

            match outcome {
                Ok(text) => {
                    debug!(
                        request_id = %request.id(),
                        backend = %backend.id(),
                        attempts = attempt,
                        "generation succeeded"
                    );
                    return Ok(GenerationResult {
                        text,
                        backend_id: backend.id().to_string(),
                        backend: backend.kind(),
                        duration: started.elapsed(),
                        attempts: attempt,
                        request_id: request.id(),
                    });
                }
                Err(error) => {
                    if !self.policy.is_retryable(&error) || attempt == max_attempts {
                        last_error = Some(error);
                        break;
                    }
                    let delay = self.policy.delay_for_attempt(attempt, error.retry_after());
                    warn!(
                        request_id = %request.id(),
                        backend = %backend.id(),
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "retrying after failure"
                    );
                    last_error = Some(error);
                    sleep_within_deadline(delay, deadline, started).await;
                }
            }
        }

        let error = last_error
            .unwrap_or_else(|| GatewayError::unknown(backend.id(), "no attempts were made"));
        Err(GenerationFailure::from_error(
            &error,
            request.id(),
            backend.id(),
            attempts_made,
            started.elapsed(),
        ))
    }
}

/// Bound for the next attempt: the backend timeout, shrunk to the remaining
/// deadline. `None` means the deadline is already spent.
fn attempt_limit(
    backend_timeout: Duration,
    deadline: Option<Duration>,
    started: Instant,
) -> Option<Duration> {
    match deadline {
        None => Some(backend_timeout),
        Some(deadline) => {
            let remaining = deadline.checked_sub(started.elapsed())?;
            if remaining.is_zero() {
                None
            } else {
                Some(backend_timeout.min(remaining))
            }
        }
    }
}

/// Sleep for the backoff delay, but never past the deadline.
async fn sleep_within_deadline(delay: Duration, deadline: Option<Duration>, started: Instant) {
    let capped = match deadline {
        None => delay,
        Some(deadline) => delay.min(deadline.saturating_sub(started.elapsed())),
    };
    if !capped.is_zero() {
        tokio::time::sleep(capped).await;
    }
}

fn params_from(temperature: f32, max_tokens: u32) -> GatewayResult<GenerationParams> {
    Ok(GenerationParams {
        temperature: Temperature::new(temperature)
            .map_err(|e| GatewayError::configuration(e.to_string()))?,
        max_tokens: MaxTokens::new(max_tokens)
            .map_err(|e| GatewayError::configuration(e.to_string()))?,
    })
}
