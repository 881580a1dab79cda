use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use log::warn;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::llm_manager::{ChatMessage, LLMProvider};

pub const DEFAULT_MODEL: &str = "qwen3:8b";
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    choices: Vec<OllamaChoice>,
}

#[derive(Debug, Deserialize)]
struct OllamaChoice {
    message: OllamaMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: OllamaErrorDetails,
}

#[derive(Debug, Deserialize)]
struct OllamaErrorDetails {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

/// Ollama local LLM provider implementation
pub struct OllamaProvider {
    model: String,
    base_url: String,
    client: Client,
    temperature: f32,
}

impl OllamaProvider {
    pub fn new(model: Option<String>, temperature: Option<f32>, base_url: Option<String>) -> Self {
        Self {
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client: Client::new(),
            temperature: temperature.unwrap_or(0.7),
        }
    }

    fn parse_error(body: &str) -> Option<OllamaErrorDetails> {
        serde_json::from_str::<OllamaError>(body).ok().map(|e| e.error)
    }

    /// Content of the first choice in a successful response body.
    fn parse_reply(body: &str) -> Result<String> {
        let api_response: OllamaResponse =
            serde_json::from_str(body).context("Failed to parse Ollama API response")?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No choices in Ollama response"))?;

        match choice.finish_reason.as_deref() {
            Some("stop") | None => {}
            Some("length") => warn!("Ollama response was truncated. Response may be incomplete."),
            Some(other) => warn!("Ollama response finished with reason: {}", other),
        }

        Ok(choice.message.content)
    }
}

#[async_trait]
impl LLMProvider for OllamaProvider {
    fn name(&self) -> &str {
        "Ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = OllamaRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Ollama")?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(match Self::parse_error(&response_text) {
                Some(error) => anyhow!(
                    "Ollama API error: {} (type: {:?})",
                    error.message,
                    error.error_type
                ),
                None => anyhow!("Ollama API error (status {}): {}", status, response_text),
            });
        }

        Self::parse_reply(&response_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let provider = OllamaProvider::new(None, None, None);
        assert_eq!(provider.model_name(), DEFAULT_MODEL);
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(provider.temperature, 0.7);
    }

    #[test]
    fn test_parse_reply() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"Lima."},"finish_reason":"stop"}]}"#;
        assert_eq!(OllamaProvider::parse_reply(body).unwrap(), "Lima.");

        let truncated = r#"{"choices":[{"message":{"role":"assistant","content":"Li"},"finish_reason":"length"}]}"#;
        assert_eq!(OllamaProvider::parse_reply(truncated).unwrap(), "Li");

        let err = OllamaProvider::parse_reply(r#"{"choices":[]}"#).unwrap_err();
        assert_eq!(err.to_string(), "No choices in Ollama response");
        assert!(OllamaProvider::parse_reply("not json").is_err());
    }

    #[test]
    fn test_parse_error_body() {
        let body = r#"{"error":{"message":"model \"qwen3:8b\" not found","type":"api_error"}}"#;
        let details = OllamaProvider::parse_error(body).unwrap();
        assert_eq!(details.message, "model \"qwen3:8b\" not found");
        assert_eq!(details.error_type.as_deref(), Some("api_error"));

        let untyped = OllamaProvider::parse_error(r#"{"error":{"message":"busy"}}"#).unwrap();
        assert!(untyped.error_type.is_none());

        assert!(OllamaProvider::parse_error("502 Bad Gateway").is_none());
    }
}
