use log::{debug, info};

use crate::calculator;
use crate::interpreter::Task;
use crate::llm_manager::ChatSession;
use crate::translator::Translator;

pub const SOURCE_LANGUAGE: &str = "auto";
pub const TARGET_LANGUAGE: &str = "de";

/// Routes each detected task to its handler.
///
/// Every handler answers with displayable text: failures of the external
/// services are turned into error lines here and never reach the caller.
pub struct Dispatcher {
    session: ChatSession,
    translator: Box<dyn Translator>,
}

impl Dispatcher {
    pub fn new(session: ChatSession, translator: Box<dyn Translator>) -> Self {
        Self { session, translator }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Run one task and return its result line(s).
    pub async fn dispatch(&mut self, task: &Task) -> String {
        info!("Dispatching {}", task);
        let result = match task {
            Task::Math(expression) => calculator::calculate(expression),
            Task::Translate(phrase) => self.translate(phrase).await,
            Task::GeneralQuery(question) => self.ask(question).await,
        };
        result.trim().to_string()
    }

    /// Send free text to the conversational model, continuing the session.
    pub async fn ask(&mut self, text: &str) -> String {
        match self.session.send_message(text).await {
            Ok(reply) => reply,
            Err(e) => {
                debug!("{} request failed: {:#}", self.session.provider_name(), e);
                format!("LLM Error: {:#}", e)
            }
        }
    }

    async fn translate(&self, phrase: &str) -> String {
        match self
            .translator
            .translate(phrase, SOURCE_LANGUAGE, TARGET_LANGUAGE)
            .await
        {
            Ok(translated) => format!("🇩🇪 German Translation: {}", translated.trim()),
            Err(e) => {
                debug!("Translation of {:?} failed: {:#}", phrase, e);
                format!("[Translation Error] {:#}", e)
            }
        }
    }
}
