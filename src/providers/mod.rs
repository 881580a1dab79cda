pub mod gemini;
pub mod ollama;

use anyhow::{Result, bail};

use crate::config::LlmConfig;
use crate::llm_manager::{LLMProvider, LocalProvider};

/// Build the provider named in the `[llm]` config section.
pub fn from_config(config: &LlmConfig, api_key: String) -> Result<Box<dyn LLMProvider>> {
    let provider: Box<dyn LLMProvider> = match config.provider.to_lowercase().as_str() {
        "gemini" => Box::new(gemini::GeminiProvider::new(
            api_key,
            config.model.clone(),
            config.temperature,
            config.base_url.clone(),
        )),
        "ollama" => Box::new(ollama::OllamaProvider::new(
            config.model.clone(),
            config.temperature,
            config.base_url.clone(),
        )),
        "local" => Box::new(LocalProvider),
        other => bail!("Unknown LLM provider '{}' (expected gemini, ollama or local)", other),
    };
    Ok(provider)
}
