//! Settings loading wired through to a working gateway.

use crate::fixtures::test_gateway;
use crate::mock_backends::{MockGroq, MockOllama};
use hrgen_config::GatewaySettings;
use hrgen_core::BackendKind;
use hrgen_gateway::Gateway;
use hrgen_telemetry::NullSink;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

fn config_toml(local_url: &str, cloud_url: &str) -> String {
    format!(
        r#"
[service]
environment = "test"

[local]
base_url = "{local_url}"
model = "deepseek-r1:8b"
timeout = "5s"

[cloud]
api_key = "gsk_file_key"
base_url = "{cloud_url}"
model = "llama-3.3-70b-versatile"
timeout = "5s"

[retry]
max_attempts = 2
base_delay = "1ms"
max_delay = "10ms"
jitter = false
"#
    )
}

#[tokio::test]
async fn gateway_built_from_config_file_serves_requests() {
    let ollama = MockOllama::start().await;
    let groq = MockGroq::start().await;
    groq.mock_chat_completion("Generated from file-config gateway")
        .await;

    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp file");
    file.write_all(config_toml(&ollama.url(), &groq.url()).as_bytes())
        .expect("write");

    let settings = GatewaySettings::load(file.path()).expect("load settings");
    assert_eq!(settings.retry.max_attempts, 2);
    assert_eq!(settings.cloud.timeout, Duration::from_secs(5));

    let gateway =
        Gateway::from_settings(&settings, Arc::new(NullSink)).expect("gateway from settings");
    let request = gateway
        .request("Draft a policy summary", BackendKind::Cloud)
        .expect("valid request");
    let result = gateway.submit(request).await.expect("success");
    assert_eq!(result.text, "Generated from file-config gateway");
}

#[tokio::test]
async fn env_overlay_supplies_the_cloud_key() {
    let groq = MockGroq::start().await;
    groq.mock_chat_completion("overlay worked").await;

    let mut settings = GatewaySettings::default();
    settings.cloud.base_url = groq.url();
    settings.retry.base_delay = Duration::from_millis(1);
    assert!(settings.cloud.api_key.is_none());

    settings.overlay(|name| (name == "GROQ_API_KEY").then(|| "gsk_env_key".to_string()));
    settings.ensure_valid().expect("valid after overlay");

    let (gateway, _sink) = test_gateway(&settings);
    let request = gateway
        .request("Draft a note", BackendKind::Cloud)
        .expect("valid request");
    let result = gateway.submit(request).await.expect("success");
    assert_eq!(result.text, "overlay worked");
}

#[tokio::test]
async fn missing_cloud_key_blocks_gateway_construction() {
    let settings = GatewaySettings::default();
    let err = Gateway::from_settings(&settings, Arc::new(NullSink)).expect_err("should fail");
    assert!(err.to_string().contains("API key"));
}
