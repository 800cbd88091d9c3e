use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod cli;

use cli::Cli;
use reviewbot::api::PracticumClient;
use reviewbot::config::{Config, Credentials};
use reviewbot::notify::{Notifier, TelegramMessenger};
use reviewbot::poll::PollLoop;

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reviewbot")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("reviewbot.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    // All three credentials must be present; this is the only fatal path
    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(err) => {
            log::error!("{}. Программа принудительно остановлена", err);
            eprintln!("{}", err.to_string().red());
            eyre::bail!("{}", err);
        }
    };

    let api = PracticumClient::new(
        config.api.endpoint.clone(),
        credentials.practicum_token.clone(),
        Duration::from_millis(config.api.timeout_ms),
    )
    .context("Failed to create API client")?;

    let messenger = TelegramMessenger::new(
        &credentials.telegram_token,
        credentials.telegram_chat_id.clone(),
        Duration::from_millis(config.telegram.timeout_ms),
    )
    .context("Failed to create Telegram client")?;

    let mut poll = PollLoop::new(
        Arc::new(api),
        Notifier::new(Box::new(messenger)),
        Duration::from_secs(config.poll.period_secs),
    );

    println!(
        "{} period={}s",
        "Starting poll loop...".cyan(),
        config.poll.period_secs
    );
    poll.run().await;

    Ok(())
}
