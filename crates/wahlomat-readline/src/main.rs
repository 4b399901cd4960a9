use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tokio::sync::mpsc;

use wahlomat_application::{SessionRegistry, SessionUseCase};
use wahlomat_core::assistant::{AssistantClient, RunProgress};
use wahlomat_infrastructure::ConfigService;
use wahlomat_interaction::OpenAIAssistantClient;

mod command;
mod helper;
mod logging;
mod repl;

use repl::Repl;

const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Parser)]
#[command(name = "wahlomat")]
#[command(about = "Wahl-O-Mat Agent - compare your positions with the party platforms", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Party preselected for the comparison
    #[arg(long)]
    party: Option<String>,
}

/// The main entry point for the Wahl-O-Mat readline REPL.
///
/// 1. Loads the configuration and installs file logging
/// 2. Builds the assistant client and the session use case
/// 3. Creates one session and asks for the API key unless `OPENAI_API_KEY` is set
/// 4. Runs the REPL until `quit`, `exit` or EOF
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging is optional: without a config directory the REPL still works
    let _log_guard = match logging::init() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("{}", format!("Logging disabled: {:#}", e).yellow());
            None
        }
    };

    // ===== Backend Initialization =====
    let config_service = match cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new_default()?,
    };
    let config = config_service.get_config()?;
    tracing::info!(
        "[Main] Configuration loaded from {}",
        config_service.path().display()
    );

    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<RunProgress>();
    let client: Arc<dyn AssistantClient> =
        Arc::new(OpenAIAssistantClient::from_config(&config).with_progress_sender(progress_tx));
    let use_case = SessionUseCase::from_config(client, &config)?;

    // Print run status changes while a request is in flight
    let progress_printer = tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            if let RunProgress::StatusChanged { status, elapsed_ms } = event {
                println!(
                    "{}",
                    format!("  ... {} ({:.1}s)", status, elapsed_ms as f64 / 1000.0)
                        .bright_black()
                );
            }
        }
    });

    let registry = SessionRegistry::new();
    let (session_id, session) = registry
        .create(use_case.party_catalog().default_party().clone())
        .await;

    if let Some(name) = cli.party.as_deref() {
        let mut guard = session.lock().await;
        use_case.select_party(&mut guard, name)?;
    }

    // ===== REPL =====
    let mut repl = Repl::new(use_case, session)?;
    let env_key = std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty());
    repl.init_credential(env_key).await?;
    repl.run().await?;

    registry.remove(&session_id).await;
    progress_printer.abort();

    Ok(())
}
