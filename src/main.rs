use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

mod assistant;
mod calculator;
mod config;
mod dispatcher;
mod interpreter;
mod llm_manager;
mod logger;
mod providers;
mod transcript;
mod translator;
mod ui;

use assistant::Assistant;
use config::Config;
use dispatcher::Dispatcher;
use llm_manager::ChatSession;
use transcript::InteractionLog;
use translator::GoogleTranslator;
use ui::{ChatUI, Sender};

#[derive(Parser)]
#[command(name = "chat_agent", version, about)]
struct Args {
    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
    /// Debug logging (implies verbose)
    #[arg(long)]
    debug: bool,
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<String>,
    /// Directory for interaction_logs.txt and interaction_logs.json
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// Use the offline local provider instead of a remote model
    #[arg(long)]
    offline: bool,
    /// Disable colors and screen clearing
    #[arg(long)]
    plain: bool,
    /// Answer this message and exit instead of starting a chat
    #[arg(last = true)]
    message: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.verbose, args.debug);
    dotenv::dotenv().ok();

    let mut config = Config::load(&args.config)?;
    config.merge_with_args(args.offline, args.plain, args.log_dir.clone());

    let provider = providers::from_config(&config.llm, config::api_key())
        .context("Failed to set up the conversational model")?;
    let session = ChatSession::new(provider, config.llm.system_prompt.clone());
    let translator = GoogleTranslator::new(config.translator.endpoint.clone());
    let log = InteractionLog::new(config.logging.text_path(), config.logging.json_path());
    let mut assistant = Assistant::new(Dispatcher::new(session, Box::new(translator)), Some(log));

    let mut ui = ChatUI::new(config.ui.colorful);

    if !args.message.is_empty() {
        let input = args.message.join(" ");
        if let Some(reply) = assistant.handle(&input).await {
            ui.display_message(&reply, Sender::Bot);
            assistant.record(&input, &reply)?;
        }
        return Ok(());
    }

    ui.start(assistant.dispatcher().session().provider_name())?;
    while let Some(input) = ui.read_message().await? {
        if input.trim().is_empty() {
            continue;
        }
        ui.display_message(input.trim(), Sender::User);
        if let Some(reply) = assistant.handle(&input).await {
            ui.display_message(&reply, Sender::Bot);
            assistant.record(&input, &reply)?;
        }
    }
    Ok(())
}
