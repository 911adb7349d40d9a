//! Yahoo Finance API client

use super::{OptionContract, OptionSide, OptionsProvider, QuoteProvider, QuoteSummary};
use crate::cache::{CacheKey, ResponseCache};
use crate::config::BotConfig;
use crate::error::{Result, StockError};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;
use yahoo_finance_api as yahoo;

const OPTIONS_URL: &str = "https://query2.finance.yahoo.com/v7/finance/options";

// Yahoo rejects requests without a browser-like agent
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)";

/// Yahoo Finance API client
///
/// Quotes go through `yahoo_finance_api`; option chains are read from the
/// v7 options endpoint directly because the connector does not expose them.
pub struct YahooFinanceClient {
    connector: yahoo::YahooConnector,
    http: Client,
    quotes: ResponseCache<QuoteSummary>,
    chains: ResponseCache<Vec<OptionContract>>,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new(config: &BotConfig) -> Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            connector,
            http,
            quotes: ResponseCache::new(config.cache_ttl_realtime),
            chains: ResponseCache::new(config.cache_ttl_realtime),
        })
    }

    async fn fetch_quote_summary(&self, symbol: &str) -> Result<QuoteSummary> {
        let search = self
            .connector
            .search_ticker(symbol)
            .await
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        // The search is fuzzy; only an exact listing counts as found
        let listing = search
            .quotes
            .iter()
            .find(|item| item.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| StockError::SymbolNotFound(symbol.to_string()))?;
        let long_name = if listing.long_name.is_empty() {
            listing.short_name.clone()
        } else {
            listing.long_name.clone()
        };

        let response = self
            .connector
            .get_latest_quotes(&listing.symbol, "1d")
            .await
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;
        let quote = response
            .last_quote()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        Ok(QuoteSummary {
            symbol: listing.symbol.to_uppercase(),
            long_name,
            price: quote.close,
            day_low: quote.low,
            day_high: quote.high,
        })
    }

    async fn fetch_option_chain(
        &self,
        symbol: &str,
        expiry: NaiveDate,
        side: OptionSide,
    ) -> Result<Vec<OptionContract>> {
        let expiry_ts = expiry.and_time(NaiveTime::MIN).and_utc().timestamp();
        let url = format!("{OPTIONS_URL}/{symbol}");

        debug!(symbol, %expiry, %side, "Fetching option chain");
        let response = self
            .http
            .get(&url)
            .query(&[("date", expiry_ts)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StockError::SymbolNotFound(symbol.to_string()));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StockError::ApiError(format!(
                "Yahoo options error {status}: {body}"
            )));
        }

        let body = response.text().await?;
        parse_option_chain(symbol, &body, expiry, side)
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceClient {
    async fn quote_summary(&self, symbol: &str) -> Result<QuoteSummary> {
        self.quotes
            .get_or_fetch(CacheKey::new(symbol, "quote"), || {
                self.fetch_quote_summary(symbol)
            })
            .await
    }
}

#[async_trait]
impl OptionsProvider for YahooFinanceClient {
    async fn option_chain(
        &self,
        symbol: &str,
        expiry: NaiveDate,
        side: OptionSide,
    ) -> Result<Vec<OptionContract>> {
        let key = CacheKey::new(symbol, side.keyword()).with_params(expiry.to_string());
        self.chains
            .get_or_fetch(key, || self.fetch_option_chain(symbol, expiry, side))
            .await
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionChainResponse {
    option_chain: OptionChainBody,
}

#[derive(Debug, Deserialize)]
struct OptionChainBody {
    #[serde(default)]
    result: Vec<OptionChainResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionChainResult {
    #[serde(default)]
    expiration_dates: Vec<i64>,
    #[serde(default)]
    options: Vec<ExpiryOptions>,
}

#[derive(Debug, Deserialize)]
struct ExpiryOptions {
    #[serde(default)]
    calls: Vec<RawContract>,
    #[serde(default)]
    puts: Vec<RawContract>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContract {
    strike: f64,
    #[serde(default)]
    ask: f64,
    #[serde(default)]
    bid: f64,
    volume: Option<u64>,
    #[serde(default)]
    implied_volatility: f64,
    #[serde(default)]
    in_the_money: bool,
}

impl From<RawContract> for OptionContract {
    fn from(raw: RawContract) -> Self {
        Self {
            strike: raw.strike,
            ask: raw.ask,
            bid: raw.bid,
            volume: raw.volume,
            implied_volatility: raw.implied_volatility,
            in_the_money: raw.in_the_money,
        }
    }
}

/// Decode a v7 options response into contracts sorted by strike
fn parse_option_chain(
    symbol: &str,
    body: &str,
    expiry: NaiveDate,
    side: OptionSide,
) -> Result<Vec<OptionContract>> {
    let response: OptionChainResponse = serde_json::from_str(body)?;
    let result = response
        .option_chain
        .result
        .into_iter()
        .next()
        .ok_or_else(|| StockError::SymbolNotFound(symbol.to_string()))?;

    let unavailable = || StockError::DataUnavailable {
        symbol: symbol.to_uppercase(),
        reason: format!("no options expiring {expiry}"),
    };

    let expiry_ts = expiry.and_time(NaiveTime::MIN).and_utc().timestamp();
    if !result.expiration_dates.contains(&expiry_ts) {
        return Err(unavailable());
    }

    let options = result.options.into_iter().next().ok_or_else(unavailable)?;
    let raw = match side {
        OptionSide::Calls => options.calls,
        OptionSide::Puts => options.puts,
    };

    let mut contracts: Vec<OptionContract> = raw.into_iter().map(Into::into).collect();
    contracts.sort_by(|a, b| a.strike.total_cmp(&b.strike));
    Ok(contracts)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2020-09-11T00:00:00Z
    const EXPIRY_TS: i64 = 1_599_782_400;

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 9, 11).unwrap()
    }

    fn fixture() -> String {
        serde_json::json!({
            "optionChain": {
                "result": [{
                    "underlyingSymbol": "TSLA",
                    "expirationDates": [EXPIRY_TS, EXPIRY_TS + 604_800],
                    "options": [{
                        "expirationDate": EXPIRY_TS,
                        "calls": [
                            {"strike": 430.0, "ask": 9.1, "bid": 8.9, "volume": 120,
                             "impliedVolatility": 0.91, "inTheMoney": false},
                            {"strike": 420.0, "ask": 12.5, "bid": 12.2, "volume": 812,
                             "impliedVolatility": 0.93, "inTheMoney": true}
                        ],
                        "puts": [
                            {"strike": 400.0, "ask": 3.2, "bid": 3.0,
                             "impliedVolatility": 0.88, "inTheMoney": false}
                        ]
                    }]
                }],
                "error": null
            }
        })
        .to_string()
    }

    #[test]
    fn test_parse_calls_sorted_by_strike() {
        let calls = parse_option_chain("TSLA", &fixture(), expiry(), OptionSide::Calls).unwrap();
        let strikes: Vec<f64> = calls.iter().map(|c| c.strike).collect();
        assert_eq!(strikes, vec![420.0, 430.0]);
        assert!(calls[0].in_the_money);
        assert_eq!(calls[0].volume, Some(812));
    }

    #[test]
    fn test_parse_puts_without_volume() {
        let puts = parse_option_chain("TSLA", &fixture(), expiry(), OptionSide::Puts).unwrap();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].volume, None);
    }

    #[test]
    fn test_unknown_expiry_is_unavailable() {
        let other = NaiveDate::from_ymd_opt(2020, 9, 12).unwrap();
        let err = parse_option_chain("tsla", &fixture(), other, OptionSide::Calls).unwrap_err();
        match err {
            StockError::DataUnavailable { symbol, reason } => {
                assert_eq!(symbol, "TSLA");
                assert!(reason.contains("2020-09-12"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_result_is_not_found() {
        let body = r#"{"optionChain":{"result":[],"error":null}}"#;
        let err = parse_option_chain("ZZZZ", body, expiry(), OptionSide::Calls).unwrap_err();
        assert!(matches!(err, StockError::SymbolNotFound(s) if s == "ZZZZ"));
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_live_quote_summary() {
        let config = BotConfig::default();
        let client = YahooFinanceClient::new(&config).unwrap();
        let summary = client.quote_summary("AAPL").await.unwrap();
        assert_eq!(summary.symbol, "AAPL");
        assert!(summary.price > 0.0);
    }
}
