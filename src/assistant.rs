use anyhow::Result;
use log::info;

use crate::dispatcher::Dispatcher;
use crate::interpreter::{Task, detect_tasks};
use crate::transcript::InteractionLog;

/// Join per-task results into one reply, one result per line, trimmed at both ends.
pub fn assemble<S: AsRef<str>>(results: &[S]) -> String {
    results
        .iter()
        .map(|r| r.as_ref())
        .collect::<Vec<&str>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Runs the detect, dispatch and assemble cycle for each user message.
pub struct Assistant {
    dispatcher: Dispatcher,
    log: Option<InteractionLog>,
}

impl Assistant {
    pub fn new(dispatcher: Dispatcher, log: Option<InteractionLog>) -> Self {
        Self { dispatcher, log }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Produce the reply for one message. Never fails: handler errors are part of the text.
    pub async fn respond(&mut self, input: &str) -> String {
        let tasks: Vec<Task> = detect_tasks(input);

        if tasks.is_empty() {
            info!("No tasks detected, asking the model directly");
            return self.dispatcher.ask(input).await;
        }

        info!("Detected {} task(s)", tasks.len());
        let mut results = Vec::with_capacity(tasks.len());
        for task in &tasks {
            results.push(self.dispatcher.dispatch(task).await);
        }
        assemble(&results)
    }

    /// Answer a submitted message. Blank input yields `None`.
    ///
    /// Nothing is logged here; call [`Assistant::record`] once the reply is shown.
    pub async fn handle(&mut self, input: &str) -> Option<String> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        Some(self.respond(input).await)
    }

    /// Append an answered exchange to the interaction log, if one is configured.
    pub fn record(&self, input: &str, reply: &str) -> Result<()> {
        if let Some(log) = &self.log {
            log.record(input.trim(), reply)?;
        }
        Ok(())
    }
}
