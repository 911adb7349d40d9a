//! `!news <query...>`

use super::GENERIC_ERROR;
use crate::api::NewsProvider;
use agent_tools::{CommandContext, CommandHandler, Outcome};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

const USAGE: &str = "Sorry, what should I look for? e.g. !news US Economy";

/// Today's news matching a free-text query
pub struct NewsCommand {
    news: Arc<dyn NewsProvider>,
}

impl NewsCommand {
    pub fn new(news: Arc<dyn NewsProvider>) -> Self {
        Self { news }
    }
}

#[async_trait]
impl CommandHandler for NewsCommand {
    fn keyword(&self) -> &str {
        "news"
    }

    fn help_text(&self) -> &str {
        "Get today's news on a topic, e.g. !news US Economy"
    }

    async fn invoke(&self, _ctx: &mut CommandContext<'_>, args: &[String]) -> Outcome {
        let query = args.join(" ");
        if query.is_empty() {
            debug!("!news without a query");
            return Outcome::reply(USAGE);
        }

        match self.news.search_news(&query).await {
            Ok(articles) if articles.is_empty() => {
                Outcome::reply(format!("Sorry, I couldn't find any news on {query}"))
            }
            Ok(articles) => Outcome::reply(
                articles
                    .iter()
                    .map(|a| format!("▸ {} ({})", a.title, a.url))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            Err(e) => {
                error!(query, "News search failed: {e}");
                Outcome::error(GENERIC_ERROR)
            }
        }
    }
}
