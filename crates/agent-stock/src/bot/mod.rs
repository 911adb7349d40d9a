//! Built-in chat commands
//!
//! Every handler answers with a plain-text [`Outcome`]; the agent loop owns
//! the channel and writes the reply.
//!
//! [`Outcome`]: agent_tools::Outcome

mod help;
mod info;
mod news;
mod options;
mod recom;
mod sleep;

pub use help::HelpCommand;
pub use info::InfoCommand;
pub use news::NewsCommand;
pub use options::{OptionsCommand, select_strike_window};
pub use recom::RecomCommand;
pub use sleep::SleepCommand;

use crate::api::{
    BingNewsClient, FinnhubClient, NewsProvider, OptionSide, OptionsProvider, QuoteProvider,
    RecommendationProvider, YahooFinanceClient,
};
use crate::config::BotConfig;
use crate::error::Result;
use agent_tools::CommandRegistry;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

/// Reply for any provider failure without a more specific apology
pub const GENERIC_ERROR: &str = "Woops! Something went wrong :(";

static SYMBOL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9^][A-Za-z0-9.\-=^]{0,14}$").ok());

/// Whether `text` is shaped like a ticker (`AAPL`, `BRK.B`, `^GSPC`, `EURUSD=X`)
pub fn is_ticker_symbol(text: &str) -> bool {
    SYMBOL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(text))
}

/// Data sources the built-in commands draw on
#[derive(Clone)]
pub struct Providers {
    pub quotes: Arc<dyn QuoteProvider>,
    pub options: Arc<dyn OptionsProvider>,
    pub recommendations: Arc<dyn RecommendationProvider>,
    pub news: Arc<dyn NewsProvider>,
}

impl Providers {
    /// Live clients for Yahoo Finance, Finnhub and Bing search
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        let yahoo = Arc::new(YahooFinanceClient::new(config)?);

        if config.finnhub_api_key.is_none() {
            tracing::warn!("FINNHUB_API_KEY not set, !recom will not find anything");
        }
        if config.search_api_key.is_none() {
            tracing::warn!("SEARCH_API_KEY not set, !news will fail");
        }

        Ok(Self {
            quotes: yahoo.clone(),
            options: yahoo,
            recommendations: Arc::new(FinnhubClient::new(config)?),
            news: Arc::new(BingNewsClient::new(config)?),
        })
    }
}

/// Registry with every built-in command, in the order `!help` lists them
pub fn default_registry(providers: &Providers, sleep_duration: Duration) -> Result<CommandRegistry> {
    let mut registry = CommandRegistry::new();
    registry.register(Arc::new(HelpCommand))?;
    registry.register(Arc::new(SleepCommand::new(sleep_duration)))?;
    registry.register(Arc::new(InfoCommand::new(providers.quotes.clone())))?;
    registry.register(Arc::new(RecomCommand::new(
        providers.recommendations.clone(),
    )))?;
    registry.register(Arc::new(NewsCommand::new(providers.news.clone())))?;
    registry.register(Arc::new(OptionsCommand::new(
        OptionSide::Calls,
        providers.options.clone(),
    )))?;
    registry.register(Arc::new(OptionsCommand::new(
        OptionSide::Puts,
        providers.options.clone(),
    )))?;
    Ok(registry)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        MockNewsProvider, MockOptionsProvider, MockQuoteProvider, MockRecommendationProvider,
    };

    fn idle_providers() -> Providers {
        Providers {
            quotes: Arc::new(MockQuoteProvider::new()),
            options: Arc::new(MockOptionsProvider::new()),
            recommendations: Arc::new(MockRecommendationProvider::new()),
            news: Arc::new(MockNewsProvider::new()),
        }
    }

    #[test]
    fn test_default_registry_order() {
        let registry = default_registry(&idle_providers(), Duration::from_secs(60)).unwrap();
        let keywords: Vec<&str> = registry.list().into_iter().map(|(kw, _)| kw).collect();
        assert_eq!(
            keywords,
            vec!["help", "sleep", "info", "recom", "news", "calls", "puts"]
        );
    }

    #[test]
    fn test_ticker_symbol_shape() {
        for symbol in ["AAPL", "tsla", "BRK.B", "^GSPC", "EURUSD=X", "BTC-USD"] {
            assert!(is_ticker_symbol(symbol), "{symbol} should be accepted");
        }
        for text in ["", "AAPL;DROP", "two words", "$TSLA", "ABCDEFGHIJKLMNOPQ"] {
            assert!(!is_ticker_symbol(text), "{text:?} should be rejected");
        }
    }
}
