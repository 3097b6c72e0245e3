//! End-to-end flows through the gateway against mock HTTP backends.

use crate::fixtures::{test_gateway, test_settings};
use crate::mock_backends::{MockGroq, MockOllama};
use hrgen_core::{BackendKind, FailureKind};
use hrgen_telemetry::AttemptOutcome;
use std::time::Duration;

#[tokio::test]
async fn cloud_generation_succeeds_first_attempt() {
    let ollama = MockOllama::start().await;
    let groq = MockGroq::start().await;
    groq.mock_chat_completion("Dear candidate, we are pleased to...")
        .await;

    let settings = test_settings(&ollama.url(), &groq.url());
    let (gateway, sink) = test_gateway(&settings);

    let request = gateway
        .request("Draft an offer letter", BackendKind::Cloud)
        .expect("valid request");
    let result = gateway.submit(request).await.expect("success");

    assert_eq!(result.text, "Dear candidate, we are pleased to...");
    assert_eq!(result.attempts, 1);
    assert_eq!(result.backend, BackendKind::Cloud);
    assert_eq!(result.backend_id, "groq-cloud");
    assert_eq!(result.http_status(), 200);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, AttemptOutcome::Succeeded);
    assert_eq!(events[0].request_id, result.request_id);
}

#[tokio::test]
async fn flaky_local_backend_recovers_within_retry_budget() {
    let ollama = MockOllama::start().await;
    let groq = MockGroq::start().await;
    // 503 on attempts 1-2, then text on attempt 3.
    ollama.mock_flaky_generate(2, "Onboarding checklist: ...").await;

    let settings = test_settings(&ollama.url(), &groq.url());
    let (gateway, sink) = test_gateway(&settings);

    let request = gateway
        .request("Draft an onboarding checklist", BackendKind::Local)
        .expect("valid request");
    let result = gateway.submit(request).await.expect("success");

    assert_eq!(result.attempts, 3);
    assert_eq!(result.text, "Onboarding checklist: ...");

    let events = sink.events();
    assert_eq!(events.len(), 3);
    assert_eq!(
        events[0].outcome,
        AttemptOutcome::Failed {
            kind: FailureKind::ConnectionUnavailable,
            retryable: true
        }
    );
    assert_eq!(events[2].outcome, AttemptOutcome::Succeeded);
}

#[tokio::test]
async fn persistent_rate_limit_exhausts_attempts() {
    let ollama = MockOllama::start().await;
    let groq = MockGroq::start().await;
    groq.mock_rate_limited(0).await;

    let settings = test_settings(&ollama.url(), &groq.url());
    let (gateway, sink) = test_gateway(&settings);

    let request = gateway
        .request("Summarize this policy", BackendKind::Cloud)
        .expect("valid request");
    let failure = gateway.submit(request).await.expect_err("failure");

    assert_eq!(failure.kind, FailureKind::RateLimited);
    assert_eq!(failure.attempts, 3);
    assert_eq!(failure.retry_after, Some(Duration::from_secs(0)));
    assert!(failure.message.contains("Rate limit reached"));
    assert_eq!(failure.http_status(), 429);
    assert_eq!(sink.events().len(), 3);
}

#[tokio::test]
async fn invalid_api_key_fails_without_retrying() {
    let ollama = MockOllama::start().await;
    let groq = MockGroq::start().await;
    groq.mock_auth_error().await;

    let settings = test_settings(&ollama.url(), &groq.url());
    let (gateway, sink) = test_gateway(&settings);

    let request = gateway
        .request("Draft interview questions", BackendKind::Cloud)
        .expect("valid request");
    let failure = gateway.submit(request).await.expect_err("failure");

    assert_eq!(failure.kind, FailureKind::AuthInvalid);
    assert_eq!(failure.attempts, 1);
    assert!(!failure.retryable);
    assert!(failure.message.contains("Invalid API Key"));
    assert_eq!(failure.http_status(), 401);
    assert_eq!(sink.events().len(), 1);
}

#[tokio::test]
async fn truncated_local_output_is_terminal() {
    let ollama = MockOllama::start().await;
    let groq = MockGroq::start().await;
    ollama.mock_truncated_generate("The employee handbook cov").await;

    let settings = test_settings(&ollama.url(), &groq.url());
    let (gateway, _sink) = test_gateway(&settings);

    let request = gateway
        .request("Write the employee handbook", BackendKind::Local)
        .expect("valid request");
    let failure = gateway.submit(request).await.expect_err("failure");

    assert_eq!(failure.kind, FailureKind::Truncated);
    assert_eq!(failure.attempts, 1);
    assert_eq!(failure.http_status(), 502);
}

#[tokio::test]
async fn deadline_cuts_off_a_slow_backend() {
    let ollama = MockOllama::start().await;
    let groq = MockGroq::start().await;
    ollama
        .mock_slow_generate("too late", Duration::from_millis(500))
        .await;

    let settings = test_settings(&ollama.url(), &groq.url());
    let (gateway, _sink) = test_gateway(&settings);

    let request = gateway
        .request("Draft a memo", BackendKind::Local)
        .expect("valid request");
    let failure = gateway
        .submit_with_deadline(request, Duration::from_millis(50))
        .await
        .expect_err("failure");

    assert_eq!(failure.kind, FailureKind::Timeout);
    assert_eq!(failure.attempts, 1);
    assert_eq!(failure.http_status(), 504);
}

#[tokio::test]
async fn health_reports_both_backends() {
    let ollama = MockOllama::start().await;
    let groq = MockGroq::start().await;
    ollama.mock_tags().await;
    groq.mock_models().await;

    let settings = test_settings(&ollama.url(), &groq.url());
    let (gateway, _sink) = test_gateway(&settings);

    let report = gateway.health().await;
    assert_eq!(report.len(), 2);
    assert!(report.iter().any(|h| h.backend == BackendKind::Local));
    assert!(report.iter().any(|h| h.backend == BackendKind::Cloud));
    assert!(report.iter().all(|h| h.status.is_healthy()));
}
