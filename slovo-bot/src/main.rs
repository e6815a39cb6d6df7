//! slovo-bot — Telegram vocabulary trainer entrypoint.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use slovo_core::{BotConfig, SessionRegistry};
use slovo_telegram::TelegramClient;
use tracing::info;

mod dispatcher;

use dispatcher::Dispatcher;

#[derive(Parser)]
#[command(name = "slovo-bot", version, about = "Telegram vocabulary trainer")]
struct Cli {
    /// Bot API token.
    #[arg(long, env = "SLOVO_BOT_TOKEN", hide_env_values = true)]
    token: String,

    /// Path to the TOML configuration file. Defaults apply without one.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("slovo=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => BotConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => BotConfig::default(),
    };

    info!(
        backend = ?config.storage.backend,
        data_dir = %config.storage.data_dir.display(),
        "starting slovo-bot"
    );

    let registry = Arc::new(SessionRegistry::new(config.storage.store_factory()));
    let client = TelegramClient::with_base_url(&config.telegram.api_url, cli.token);
    let dispatcher = Dispatcher::new(
        client,
        registry,
        Duration::from_millis(config.polling.interval_ms),
    );

    match dispatcher.run().await {}
}
