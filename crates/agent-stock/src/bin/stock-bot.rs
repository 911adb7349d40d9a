//! Stock command bot
//!
//! Watches a chat channel and answers `!commands` with market data.
//!
//! # Usage
//!
//! ```bash
//! # Set up environment variables (or put them in .env)
//! export CHAT_CHANNEL_URL="console://local"
//! export FINNHUB_API_KEY="..."
//! export SEARCH_API_KEY="..."
//!
//! # Run the bot
//! cargo run --bin stock-bot -p agent-stock
//! ```

use agent_runtime::ShutdownHandle;
use agent_stock::{BotConfig, ConsoleSession, Providers, bot_builder};
use agent_utils::{LogFormat, env_var, init_tracing_with};
use anyhow::Context;
use clap::Parser;
use std::time::Duration;
use tracing::info;

const DEFAULT_BOT_NAME: &str = "stock-bot";

#[derive(Debug, Parser)]
#[command(name = "stock-bot", version, about = "Answer !commands in a chat channel with market data")]
struct Args {
    /// Seconds to wait after each command before polling again
    #[arg(long)]
    cooldown_secs: Option<u64>,

    /// Extra users whose messages are never answered
    #[arg(long = "ignore", value_name = "USER")]
    ignored_users: Vec<String>,

    /// Log output format
    #[arg(long, value_name = "pretty|json")]
    log_format: Option<LogFormat>,
}

fn load_config(args: &Args) -> anyhow::Result<BotConfig> {
    let mut config = BotConfig::from_env().context("failed to load configuration")?;

    if let Some(secs) = args.cooldown_secs {
        config.cooldown = Duration::from_secs(secs);
    }
    config.ignored_users.extend(args.ignored_users.iter().cloned());
    // The console needs a name to post under, and the bot must ignore it
    if config.credentials.username.is_empty() {
        config.credentials.username = DEFAULT_BOT_NAME.to_string();
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real environment variables still apply
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let log_format = match args.log_format {
        Some(format) => format,
        None => env_var("LOG_FORMAT")
            .map(|v| v.parse::<LogFormat>())
            .transpose()
            .map_err(anyhow::Error::msg)?
            .unwrap_or_default(),
    };
    init_tracing_with(log_format);

    let config = load_config(&args)?;
    info!(
        channel = %config.channel_url,
        cooldown = ?config.cooldown,
        ignored = config.ignore_list().len(),
        "Configuration loaded"
    );

    let providers = Providers::from_config(&config)?;

    let shutdown = ShutdownHandle::new();
    let _ctrl_c = shutdown.stop_on_ctrl_c();

    let session = ConsoleSession::new(&config.channel_url, config.read_timeout)
        .stop_on_eof(shutdown.clone());
    let mut bot = bot_builder(session, &config, &providers)?
        .shutdown(shutdown)
        .build();

    let stats = bot.run(&config.credentials).await?;
    info!(
        polls = stats.polls,
        dispatches = stats.dispatches,
        unknown_commands = stats.unknown_commands,
        write_failures = stats.write_failures,
        handler_panics = stats.handler_panics,
        "Bot stopped"
    );

    Ok(())
}
