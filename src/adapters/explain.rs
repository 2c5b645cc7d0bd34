use crate::config::toml_config::ExplainConfig;
use crate::utils::error::{PortalError, Result};
use crate::utils::validation::validate_required_field;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const SYSTEM_PROMPT: &str = "You are a concise ESG policy analyst for Indian MSMEs. \
Explain updates in plain English, be pragmatic, and focus on actions small firms can take. \
Prefer bullets. Avoid hype. Cite no private data.";

/// A news item to brief an MSME owner on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

impl NewsItem {
    fn present(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn user_prompt(&self) -> String {
        let mut lines = vec!["News item:".to_string()];
        if let Some(title) = Self::present(&self.title) {
            lines.push(format!("Title: {}", title));
        }
        if let Some(source) = Self::present(&self.source) {
            lines.push(format!("Source: {}", source));
        }
        if let Some(published) = Self::present(&self.published_at) {
            lines.push(format!("Published: {}", published));
        }
        if let Some(summary) = Self::present(&self.summary) {
            lines.push(format!("Summary: {}", summary));
        }
        lines.extend(
            [
                "",
                "Write a short MSME-focused brief with sections:",
                "• What it means",
                "• Who is affected",
                "• Immediate actions (3 bullet points)",
                "Keep it under 160 words.",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatReply>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

pub struct ExplainClient {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

impl ExplainClient {
    pub fn from_config(config: &ExplainConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key: config.api_key(),
        })
    }

    pub async fn explain(&self, item: &NewsItem) -> Result<String> {
        let api_key = validate_required_field("explain.api_key (OPENAI_API_KEY)", &self.api_key)?;
        if NewsItem::present(&item.title).is_none() && NewsItem::present(&item.summary).is_none() {
            return Err(PortalError::validation("Provide at least a title or summary"));
        }

        let user_prompt = item.user_prompt();
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
        };

        let url = format!("{}/chat/completions", self.endpoint);
        tracing::debug!("Requesting ESG brief from {}", url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("❌ ESG explain request failed with {}", status);
            return Err(PortalError::ApiStatusError {
                status: status.as_u16(),
                body,
            });
        }

        let reply: ChatResponse = response.json().await?;
        Ok(reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|text| text.trim().to_string())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_skips_missing_fields() {
        let item = NewsItem {
            title: Some("EU CBAM enters transitional phase".to_string()),
            source: Some("  ".to_string()),
            ..Default::default()
        };
        let prompt = item.user_prompt();
        assert!(prompt.starts_with("News item:\nTitle: EU CBAM enters transitional phase\n\n"));
        assert!(!prompt.contains("Source:"));
        assert!(prompt.ends_with("Keep it under 160 words."));
    }

    #[test]
    fn test_missing_api_key_fails_before_request() {
        let config = ExplainConfig {
            api_key: None,
            api_key_env: None,
            ..ExplainConfig::default()
        };
        let client = ExplainClient::from_config(&config).unwrap();
        let item = NewsItem {
            title: Some("x".to_string()),
            ..Default::default()
        };
        let err = tokio_test::block_on(client.explain(&item)).unwrap_err();
        assert!(matches!(err, PortalError::MissingConfigError { .. }));
    }
}
