//! Menu-driven terminal chat against OpenRouter-compatible completion APIs.
//!
//! # Usage
//!
//! ```bash
//! # Pick one of the built-in free models
//! OPENROUTER_API_KEY=sk-or-... routechat
//!
//! # Offer whatever free models the endpoint currently lists
//! routechat --discover
//!
//! # Keep a diagnostic log (RUST_LOG controls the level)
//! RUST_LOG=debug routechat --log-file routechat.log
//! ```
//!
//! While chatting, type `/menu` to clear the history, switch models or exit.

use std::fs::OpenOptions;
use std::path::Path;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use arrrg::CommandLine;
use tracing_subscriber::EnvFilter;

use routechat::chat::{
    ChatArgs, ChatConfig, InterruptSignal, Outcome, PlainTextRenderer, SessionController,
    TerminalConsole,
};
use routechat::{Error, ModelCatalog, OpenRouter, resolve_credential};

#[tokio::main]
async fn main() -> ExitCode {
    let (args, _) = ChatArgs::from_command_line_relaxed("routechat [OPTIONS]");
    let config = ChatConfig::from(args);

    match run(config).await {
        Ok(outcome) => {
            tracing::info!(?outcome, "routechat finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "routechat failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ChatConfig) -> Result<Outcome, Error> {
    if let Some(path) = config.log_file.as_deref() {
        init_logging(path)?;
    }
    config.validate()?;

    let credential = resolve_credential(&config.api_key_var, &config.env_file)?;
    let client = Arc::new(config.build_client(credential)?);
    let catalog = load_catalog(&client, config.discover).await;

    // Ctrl+C cancels an in-flight request; at the prompt rustyline sees it first.
    let interrupt = Arc::new(InterruptSignal::new());
    let handler = Arc::clone(&interrupt);
    ctrlc::set_handler(move || handler.trigger())
    .map_err(|err| Error::config(format!("cannot install Ctrl+C handler: {err}"), None))?;

    let console = TerminalConsole::new(config.use_color)?;
    let renderer =
        PlainTextRenderer::with_color(config.use_color).with_spinner(config.show_spinner);
    let mut controller =
        SessionController::new(client, catalog, console, renderer).with_interrupt(interrupt);
    controller.run().await
}

async fn load_catalog(client: &OpenRouter, discover: bool) -> ModelCatalog {
    if !discover {
        return ModelCatalog::builtin();
    }
    match client.free_model_catalog().await {
        Ok(catalog) => catalog,
        Err(err) => {
            tracing::warn!(error = %err, "model discovery failed; using built-in catalog");
            eprintln!("Model discovery failed ({err}); using the built-in list.");
            ModelCatalog::builtin()
        }
    }
}

fn init_logging(path: &Path) -> Result<(), Error> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| Error::io(format!("cannot open log file {}", path.display()), err))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
