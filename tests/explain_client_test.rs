use esg_portal::adapters::explain::{ExplainClient, NewsItem};
use esg_portal::config::toml_config::ExplainConfig;
use esg_portal::PortalError;
use httpmock::prelude::*;

fn config_for(server: &MockServer) -> ExplainConfig {
    ExplainConfig {
        endpoint: server.url("/v1"),
        api_key: Some("test-key".to_string()),
        api_key_env: None,
        ..ExplainConfig::default()
    }
}

fn news() -> NewsItem {
    NewsItem {
        title: Some("CBAM definitive period begins".to_string()),
        summary: Some("Importers must buy CBAM certificates from 2026.".to_string()),
        source: Some("European Commission".to_string()),
        published_at: None,
    }
}

#[tokio::test]
async fn test_explain_returns_trimmed_first_choice() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("authorization", "Bearer test-key")
            .json_body_partial(r#"{"model": "gpt-4o"}"#)
            .body_contains("concise ESG policy analyst");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "\n• What it means: carbon costs at the EU border.\n"}},
                    {"message": {"role": "assistant", "content": "ignored"}}
                ]
            }));
    });

    let client = ExplainClient::from_config(&config_for(&server)).unwrap();
    let brief = client.explain(&news()).await.unwrap();

    api_mock.assert();
    assert_eq!(brief, "• What it means: carbon costs at the EU border.");
}

#[tokio::test]
async fn test_explain_empty_choices_yield_empty_text() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(serde_json::json!({"choices": []}));
    });

    let client = ExplainClient::from_config(&config_for(&server)).unwrap();
    assert_eq!(client.explain(&news()).await.unwrap(), "");
}

#[tokio::test]
async fn test_explain_surfaces_upstream_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(401).body("invalid api key");
    });

    let client = ExplainClient::from_config(&config_for(&server)).unwrap();
    let err = client.explain(&news()).await.unwrap_err();
    match err {
        PortalError::ApiStatusError { status, ref body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(err.recovery_suggestion().contains("OPENAI_API_KEY"));
}

#[tokio::test]
async fn test_explain_rejects_empty_news_without_calling_out() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200);
    });

    let client = ExplainClient::from_config(&config_for(&server)).unwrap();
    let err = client.explain(&NewsItem::default()).await.unwrap_err();
    assert!(matches!(err, PortalError::ValidationError { .. }));
    api_mock.assert_hits(0);
}
