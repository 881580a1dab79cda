use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Speaker of a chat message, serialized the way OpenAI-compatible endpoints expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Trait representing a conversational model backend.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Name of the provider.
    fn name(&self) -> &str;

    /// Model name of the provider.
    fn model_name(&self) -> &str {
        "Unknown"
    }

    /// Continue the conversation given in `messages` and return the reply text.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Offline provider used when no remote model should be contacted.
pub struct LocalProvider;

#[async_trait]
impl LLMProvider for LocalProvider {
    fn name(&self) -> &str {
        "local"
    }

    fn model_name(&self) -> &str {
        "echo"
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let question = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .ok_or_else(|| anyhow!("No user message to answer"))?;
        let turn = messages.iter().filter(|m| m.role == Role::User).count();
        Ok(format!(
            "(offline, turn {}) I can't reach a language model, but you asked: {}",
            turn, question.content
        ))
    }
}

/// Conversation with a single provider, keeping the history across turns.
///
/// Created once at startup and never reset; every general query goes through
/// [`ChatSession::send_message`] so later questions see earlier answers.
pub struct ChatSession {
    provider: Box<dyn LLMProvider>,
    system_prompt: Option<String>,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(provider: Box<dyn LLMProvider>, system_prompt: Option<String>) -> Self {
        info!(
            "Starting chat session with {} ({})",
            provider.name(),
            provider.model_name()
        );
        Self {
            provider,
            system_prompt,
            history: Vec::new(),
        }
    }

    /// Messages exchanged so far, oldest first. The system prompt is not included.
    #[allow(dead_code)]
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Send `text` as the next user turn and return the trimmed reply.
    ///
    /// On failure the history is left untouched.
    pub async fn send_message(&mut self, text: &str) -> Result<String> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        if let Some(prompt) = &self.system_prompt {
            messages.push(ChatMessage::new(Role::System, prompt.as_str()));
        }
        messages.extend(self.history.iter().cloned());
        messages.push(ChatMessage::new(Role::User, text));

        debug!(
            "Sending {} message(s) to {}",
            messages.len(),
            self.provider.name()
        );
        let reply = self.provider.chat(&messages).await?;
        let reply = reply.trim().to_string();

        self.history.push(ChatMessage::new(Role::User, text));
        self.history.push(ChatMessage::new(Role::Assistant, reply.as_str()));
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingProvider;

    #[async_trait]
    impl LLMProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn chat(&self, _messages: &[ChatMessage]) -> Result<String> {
            Err(anyhow!("service unavailable"))
        }
    }

    #[tokio::test]
    async fn test_history_accumulates() {
        let mut session = ChatSession::new(Box::new(LocalProvider), Some("be brief".to_string()));

        let first = session.send_message("hello").await.unwrap();
        assert!(first.contains("turn 1"));
        let second = session.send_message("again").await.unwrap();
        assert!(second.contains("turn 2"));
        assert!(second.ends_with("again"));

        let history = session.history();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0], ChatMessage::new(Role::User, "hello"));
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[2], ChatMessage::new(Role::User, "again"));
    }

    #[tokio::test]
    async fn test_failed_call_leaves_history_untouched() {
        let mut session = ChatSession::new(Box::new(FailingProvider), None);
        let err = session.send_message("hello").await.unwrap_err();
        assert_eq!(err.to_string(), "service unavailable");
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&ChatMessage::new(Role::Assistant, "hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }
}
