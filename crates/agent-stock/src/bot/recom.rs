//! `!recom <symbol>`

use super::is_ticker_symbol;
use crate::api::RecommendationProvider;
use crate::format::recommendation_table;
use agent_tools::{CommandContext, CommandHandler, Outcome};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

/// Number of most recent periods shown
const PERIODS: usize = 4;

const USAGE: &str = "Sorry, I need a ticker symbol, e.g. !recom TSLA";

/// Analyst recommendation trends as a table
pub struct RecomCommand {
    recommendations: Arc<dyn RecommendationProvider>,
}

impl RecomCommand {
    pub fn new(recommendations: Arc<dyn RecommendationProvider>) -> Self {
        Self { recommendations }
    }
}

fn nothing_found(symbol: &str) -> Outcome {
    Outcome::error(format!(
        "Sorry, I couldn't find any recommendations for {symbol}"
    ))
}

#[async_trait]
impl CommandHandler for RecomCommand {
    fn keyword(&self) -> &str {
        "recom"
    }

    fn help_text(&self) -> &str {
        "Get analyst recommendations, e.g. !recom TSLA"
    }

    async fn invoke(&self, _ctx: &mut CommandContext<'_>, args: &[String]) -> Outcome {
        let Some(symbol) = args.first() else {
            debug!("!recom without a symbol");
            return Outcome::reply(USAGE);
        };
        if !is_ticker_symbol(symbol) {
            return nothing_found(symbol);
        }

        match self.recommendations.recommendations(symbol).await {
            Ok(trends) if trends.is_empty() => {
                debug!(symbol, "No recommendation trends");
                nothing_found(symbol)
            }
            Ok(trends) => {
                let recent = &trends[..trends.len().min(PERIODS)];
                Outcome::reply(recommendation_table(recent))
            }
            Err(e) => {
                error!(symbol, "Recommendation lookup failed: {e}");
                nothing_found(symbol)
            }
        }
    }
}
