use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable holding the conversational model credential.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Used when the credential is unset; requests made with it are rejected by the service.
pub const PLACEHOLDER_API_KEY: &str = "your-api-key";

/// Main configuration structure for chat_agent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Conversational model settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Translation service settings
    #[serde(default)]
    pub translator: TranslatorConfig,

    /// Interaction log locations
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Terminal display settings
    #[serde(default)]
    pub ui: UIConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "gemini", "ollama" or "local"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model to use; each provider has its own default
    pub model: Option<String>,

    /// Temperature setting
    pub temperature: Option<f32>,

    /// Override for the provider endpoint
    pub base_url: Option<String>,

    /// Optional system message sent ahead of the conversation
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Base URL of the translation endpoint
    #[serde(default = "default_translator_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory holding both interaction logs
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    #[serde(default = "default_text_file")]
    pub text_file: String,

    #[serde(default = "default_json_file")]
    pub json_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UIConfig {
    /// Enable colorful output
    #[serde(default = "default_colorful")]
    pub colorful: bool,
}

// Default value functions
fn default_provider() -> String { "gemini".to_string() }
fn default_translator_endpoint() -> String { crate::translator::DEFAULT_ENDPOINT.to_string() }
fn default_log_dir() -> PathBuf { PathBuf::from(".") }
fn default_text_file() -> String { "interaction_logs.txt".to_string() }
fn default_json_file() -> String { "interaction_logs.json".to_string() }
fn default_colorful() -> bool { true }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            temperature: None,
            base_url: None,
            system_prompt: None,
        }
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self { endpoint: default_translator_endpoint() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            text_file: default_text_file(),
            json_file: default_json_file(),
        }
    }
}

impl Default for UIConfig {
    fn default() -> Self {
        Self { colorful: default_colorful() }
    }
}

impl LoggingConfig {
    pub fn text_path(&self) -> PathBuf {
        self.log_dir.join(&self.text_file)
    }

    pub fn json_path(&self) -> PathBuf {
        self.log_dir.join(&self.json_file)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))
    }

    /// Load configuration from command line argument or default locations
    pub fn load(config_path: &Option<String>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::from_file(shellexpand::tilde(path).as_ref());
        }

        let default_paths = [
            "chat_agent.toml",
            ".chat_agent.toml",
            "~/.config/chat_agent/config.toml",
        ];

        for path in default_paths {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                match Self::from_file(expanded_path.as_ref()) {
                    Ok(config) => return Ok(config),
                    Err(e) => log::warn!("Failed to load config from {}: {:#}", path, e),
                }
            }
        }

        Ok(Self::default())
    }

    /// Merge with command-line arguments (CLI args take precedence)
    pub fn merge_with_args(&mut self, offline: bool, plain: bool, log_dir: Option<PathBuf>) {
        if offline {
            self.llm.provider = "local".to_string();
        }
        if plain {
            self.ui.colorful = false;
        }
        if let Some(dir) = log_dir {
            self.logging.log_dir = dir;
        }
    }
}

/// Read the model credential, falling back to a placeholder that fails at call time.
pub fn api_key() -> String {
    match env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            log::warn!("{} is not set; model requests will be rejected", API_KEY_VAR);
            PLACEHOLDER_API_KEY.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [llm]
            provider = "ollama"
            model = "llama3.2"

            [logging]
            log_dir = "/tmp/chat"
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model.as_deref(), Some("llama3.2"));
        assert!(config.llm.temperature.is_none());
        assert_eq!(config.logging.text_path(), PathBuf::from("/tmp/chat/interaction_logs.txt"));
        assert_eq!(config.logging.json_path(), PathBuf::from("/tmp/chat/interaction_logs.json"));
        assert!(config.ui.colorful);
        assert_eq!(config.translator.endpoint, crate::translator::DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.logging.log_dir, PathBuf::from("."));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();
        config.merge_with_args(true, true, Some(PathBuf::from("logs")));
        assert_eq!(config.llm.provider, "local");
        assert!(!config.ui.colorful);
        assert_eq!(config.logging.text_path(), PathBuf::from("logs/interaction_logs.txt"));
    }

    #[test]
    fn test_from_file_reports_missing_path() {
        let err = Config::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
