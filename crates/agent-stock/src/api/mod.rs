//! API clients for market data and news providers
//!
//! Handlers only see the provider traits defined here, so every client can
//! be swapped for a mock in tests.

pub mod bing;
pub mod finnhub;
pub mod yahoo;

pub use bing::BingNewsClient;
pub use finnhub::FinnhubClient;
pub use yahoo::YahooFinanceClient;

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(test)]
use mockall::automock;

/// Snapshot of a listed symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSummary {
    pub symbol: String,
    pub long_name: String,
    pub price: f64,
    pub day_low: f64,
    pub day_high: f64,
}

/// Analyst recommendation counts for one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// First day of the period, `YYYY-MM-DD`
    pub period: String,
    pub buy: u32,
    pub hold: u32,
    pub sell: u32,
    pub strong_buy: u32,
    pub strong_sell: u32,
}

/// A news article found by a web search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
}

/// Which half of an options chain to look at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionSide {
    Calls,
    Puts,
}

impl OptionSide {
    /// Chat keyword for this side
    pub fn keyword(self) -> &'static str {
        match self {
            OptionSide::Calls => "calls",
            OptionSide::Puts => "puts",
        }
    }
}

impl fmt::Display for OptionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One row of an options chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    pub strike: f64,
    pub ask: f64,
    pub bid: f64,
    pub volume: Option<u64>,
    pub implied_volatility: f64,
    pub in_the_money: bool,
}

/// Current quote lookups
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fails with `SymbolNotFound` when the provider does not list `symbol`
    async fn quote_summary(&self, symbol: &str) -> Result<QuoteSummary>;
}

/// Options chain lookups
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OptionsProvider: Send + Sync {
    /// Contracts for one expiry, sorted by ascending strike
    async fn option_chain(
        &self,
        symbol: &str,
        expiry: NaiveDate,
        side: OptionSide,
    ) -> Result<Vec<OptionContract>>;
}

/// Analyst recommendation lookups
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RecommendationProvider: Send + Sync {
    /// Periods ordered newest first
    async fn recommendations(&self, symbol: &str) -> Result<Vec<Recommendation>>;
}

/// Same-day news search
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn search_news(&self, query: &str) -> Result<Vec<NewsArticle>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_wire_format() {
        let json = r#"{"buy":24,"hold":7,"period":"2020-09-01","sell":0,"strongBuy":13,"strongSell":0,"symbol":"AAPL"}"#;
        let rec: Recommendation = serde_json::from_str(json).unwrap();
        assert_eq!(rec.period, "2020-09-01");
        assert_eq!(rec.strong_buy, 13);
        assert_eq!(rec.buy, 24);
    }

    #[test]
    fn test_option_side_keyword() {
        assert_eq!(OptionSide::Calls.to_string(), "calls");
        assert_eq!(OptionSide::Puts.keyword(), "puts");
    }
}
