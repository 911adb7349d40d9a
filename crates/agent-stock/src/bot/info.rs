//! `!info <symbol>`

use super::{GENERIC_ERROR, is_ticker_symbol};
use crate::api::QuoteProvider;
use agent_tools::{CommandContext, CommandHandler, Outcome};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

const USAGE: &str = "Sorry, I need a ticker symbol, e.g. !info AAPL";

/// Name, price and day range of a symbol
pub struct InfoCommand {
    quotes: Arc<dyn QuoteProvider>,
}

impl InfoCommand {
    pub fn new(quotes: Arc<dyn QuoteProvider>) -> Self {
        Self { quotes }
    }
}

fn not_found(symbol: &str) -> Outcome {
    Outcome::error(format!("Sorry, I couldn't find {symbol}"))
}

#[async_trait]
impl CommandHandler for InfoCommand {
    fn keyword(&self) -> &str {
        "info"
    }

    fn help_text(&self) -> &str {
        "Get info on a stock, e.g. !info AAPL"
    }

    async fn invoke(&self, _ctx: &mut CommandContext<'_>, args: &[String]) -> Outcome {
        let Some(symbol) = args.first() else {
            debug!("!info without a symbol");
            return Outcome::reply(USAGE);
        };
        if !is_ticker_symbol(symbol) {
            return not_found(symbol);
        }

        match self.quotes.quote_summary(&symbol.to_uppercase()).await {
            Ok(quote) => Outcome::reply(format!(
                "[{}] {}\nPrice: {:.2}\nDay Range: {:.2} - {:.2}",
                quote.symbol, quote.long_name, quote.price, quote.day_low, quote.day_high
            )),
            Err(e) if e.is_not_found() => {
                debug!(symbol, "Quote lookup found nothing: {e}");
                not_found(symbol)
            }
            Err(e) => {
                error!(symbol, "Quote lookup failed: {e}");
                Outcome::error(GENERIC_ERROR)
            }
        }
    }
}
