//! Stock command bot for a single chat channel
//!
//! This crate wires market data providers into `!command` handlers and hands
//! them to the generic agent loop. It includes:
//!
//! - Quotes and option chains from Yahoo Finance
//! - Analyst recommendation trends from Finnhub
//! - Same-day news from Bing web search
//! - Plain-text table rendering for chat replies
//! - A console channel session for running the bot from a terminal
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_stock::{BotConfig, ConsoleSession, Providers, bot_builder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BotConfig::from_env()?;
//!     let providers = Providers::from_config(&config)?;
//!     let session = ConsoleSession::new(&config.channel_url, config.read_timeout);
//!
//!     let mut bot = bot_builder(session, &config, &providers)?.build();
//!     let stats = bot.run(&config.credentials).await?;
//!     println!("{stats:?}");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod bot;
pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod platforms;

pub use bot::{GENERIC_ERROR, Providers, default_registry};
pub use config::{BotConfig, BotConfigBuilder};
pub use error::{Result, StockError};
pub use platforms::ConsoleSession;

use agent_core::ChannelSession;
use agent_runtime::{AgentLoop, AgentLoopBuilder, LoopConfig};
use agent_tools::IgnoreList;

/// Agent loop builder over `session` with every built-in command registered
///
/// The bot's own username is always on the ignore list so it never answers
/// its own replies. Callers may still swap the clock or shutdown handle
/// before building.
pub fn bot_builder<S: ChannelSession>(
    session: S,
    config: &BotConfig,
    providers: &Providers,
) -> Result<AgentLoopBuilder<S>> {
    let registry = default_registry(providers, config.sleep_duration)?;
    let ignored: IgnoreList = config.ignore_list().into_iter().collect();

    tracing::debug!(
        commands = registry.len(),
        ignored = ignored.len(),
        "Bot assembled"
    );

    Ok(AgentLoop::builder(session)
        .registry(registry)
        .ignored(ignored)
        .config(LoopConfig {
            cooldown: config.cooldown,
            backoff: config.backoff,
            panic_notice: GENERIC_ERROR.to_string(),
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        MockNewsProvider, MockOptionsProvider, MockQuoteProvider, MockRecommendationProvider,
        QuoteSummary,
    };
    use agent_core::{ManualClock, MemorySession};
    use agent_runtime::ShutdownHandle;
    use std::sync::Arc;
    use std::time::Duration;

    fn config() -> BotConfig {
        BotConfig::builder()
            .channel_url("memory://room")
            .credentials("stonkbot", "secret")
            .ignore_user("automod")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_bot_answers_commands_end_to_end() {
        let mut quotes = MockQuoteProvider::new();
        quotes.expect_quote_summary().times(1).returning(|symbol| {
            Ok(QuoteSummary {
                symbol: symbol.to_string(),
                long_name: "Tesla, Inc.".to_string(),
                price: 420.5,
                day_low: 410.0,
                day_high: 425.25,
            })
        });
        let mut options = MockOptionsProvider::new();
        options.expect_option_chain().times(0);
        let providers = Providers {
            quotes: Arc::new(quotes),
            options: Arc::new(options),
            recommendations: Arc::new(MockRecommendationProvider::new()),
            news: Arc::new(MockNewsProvider::new()),
        };

        let config = config();
        let clock = Arc::new(ManualClock::new());
        let shutdown = ShutdownHandle::new();
        let stop = shutdown.clone();
        let session = MemorySession::new("memory://room")
            .with_clock(clock.clone())
            .post("alice", "!info tsla")
            .post("automod", "!help")
            .post("bob", "!calls TSLA 2020-09-11")
            .post("bob", "!sleep")
            .on_drained(move || stop.stop());

        let mut bot = bot_builder(session, &config, &providers)
            .unwrap()
            .clock(clock.clone())
            .shutdown(shutdown)
            .build();
        let stats = bot.run(&config.credentials).await.unwrap();

        assert_eq!(
            bot.session().written(),
            [
                "[TSLA] Tesla, Inc.\nPrice: 420.50\nDay Range: 410.00 - 425.25",
                "Sorry, I don't understand.\nI need the symbol, date (YYYY-MM-DD) and strike",
                "Zzzz 😴",
            ]
        );
        assert_eq!(stats.dispatches, 3);
        assert!(stats.ignored_messages >= 2);
        assert!(clock.sleeps().contains(&Duration::from_secs(60)));
        assert!(bot.session().is_closed());
    }

    #[test]
    fn test_builder_ignores_self_and_configured_users() {
        let providers = Providers {
            quotes: Arc::new(MockQuoteProvider::new()),
            options: Arc::new(MockOptionsProvider::new()),
            recommendations: Arc::new(MockRecommendationProvider::new()),
            news: Arc::new(MockNewsProvider::new()),
        };

        let bot = bot_builder(MemorySession::new("memory://room"), &config(), &providers)
            .unwrap()
            .build();

        assert!(bot.ignored().contains("stonkbot"));
        assert!(bot.ignored().contains("automod"));
        assert_eq!(bot.registry().len(), 7);
        assert_eq!(bot.config().cooldown, Duration::from_secs(5));
    }
}
