use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use log::{info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::llm_manager::{ChatMessage, LLMProvider};

pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Gemini API provider, spoken through its OpenAI-compatible endpoint.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetails,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetails {
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl GeminiProvider {
    /// Create a new Gemini provider. `None` values fall back to the defaults.
    pub fn new(
        api_key: String,
        model: Option<String>,
        temperature: Option<f32>,
        base_url: Option<String>,
    ) -> Self {
        Self {
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client: Client::new(),
            max_tokens: 8192,
            temperature: temperature.unwrap_or(0.7),
        }
    }

    /// Errors come back either as an object or wrapped in a one-element array.
    fn parse_error(body: &str) -> Option<GeminiErrorDetails> {
        if let Ok(error) = serde_json::from_str::<GeminiError>(body) {
            return Some(error.error);
        }
        serde_json::from_str::<Vec<GeminiError>>(body)
            .ok()?
            .pop()
            .map(|e| e.error)
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = GeminiRequest {
            model: &self.model,
            messages,
            max_tokens: Some(self.max_tokens),
            temperature: self.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(match Self::parse_error(&response_text) {
                Some(error) => anyhow!(
                    "Gemini API error: {} (status: {}, code: {})",
                    error.message,
                    error.status.unwrap_or_else(|| "unknown".to_string()),
                    error.code.map(|c| c.to_string()).unwrap_or_else(|| status.as_u16().to_string())
                ),
                None => anyhow!("Gemini API error (status {}): {}", status, response_text),
            });
        }

        let gemini_response: GeminiResponse =
            serde_json::from_str(&response_text).context("Failed to parse Gemini response")?;

        let choice = gemini_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No response choices from Gemini"))?;

        if choice.finish_reason.as_deref() == Some("length") {
            warn!(
                "Gemini response was truncated due to max_tokens limit ({}). Response may be incomplete.",
                self.max_tokens
            );
        }

        if let Some(usage) = gemini_response.usage {
            info!(
                "Gemini token usage - Prompt: {}, Completion: {}, Total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        choice
            .message
            .content
            .ok_or_else(|| anyhow!("Gemini returned an empty message"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let provider = GeminiProvider::new("key".to_string(), None, None, None);
        assert_eq!(provider.model_name(), DEFAULT_MODEL);
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_parse_error_shapes() {
        let object = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        let details = GeminiProvider::parse_error(object).unwrap();
        assert_eq!(details.message, "API key not valid");
        assert_eq!(details.status.as_deref(), Some("INVALID_ARGUMENT"));

        let array = r#"[{"error":{"code":401,"message":"unauthorized"}}]"#;
        let details = GeminiProvider::parse_error(array).unwrap();
        assert_eq!(details.message, "unauthorized");

        assert!(GeminiProvider::parse_error("<html>").is_none());
    }
}
