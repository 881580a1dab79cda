use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;

pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// A stateless translation service.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` (or `"auto"`) into `target`.
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;
}

/// Client for Google's public translation endpoint.
pub struct GoogleTranslator {
    endpoint: String,
    client: Client,
}

impl GoogleTranslator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: Client::new(),
        }
    }

    /// The body is nested arrays; the first element lists `[translated, original, ...]` segments.
    fn parse_response(body: &Value) -> Result<String> {
        let segments = body
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow!("Unexpected translation response shape"))?;

        let translated: String = segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(Value::as_str))
            .collect();

        if translated.trim().is_empty() {
            return Err(anyhow!("Translation service returned no text"));
        }
        Ok(translated)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        debug!("Translating {:?} ({} -> {})", text, source, target);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .context("Failed to reach translation service")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Translation service returned status {}", status));
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse translation response")?;
        Self::parse_response(&body)
    }
}
