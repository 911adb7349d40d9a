//! Finnhub client for analyst recommendation trends

use super::{Recommendation, RecommendationProvider};
use crate::cache::{CacheKey, ResponseCache};
use crate::config::BotConfig;
use crate::error::{Result, StockError};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use std::num::NonZeroU32;
use std::sync::Arc;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const RECOMMENDATION_URL: &str = "https://finnhub.io/api/v1/stock/recommendation";

/// Finnhub client with client-side rate limiting
pub struct FinnhubClient {
    client: Client,
    api_key: Option<String>,
    rate_limiter: SharedRateLimiter,
    cache: ResponseCache<Vec<Recommendation>>,
}

impl FinnhubClient {
    /// Create a new Finnhub client
    ///
    /// A missing API key is not an error here; lookups fail with
    /// `NotConfigured` instead so the rest of the bot keeps working.
    pub fn new(config: &BotConfig) -> Result<Self> {
        let per_minute = NonZeroU32::new(config.finnhub_rate_limit).ok_or_else(|| {
            StockError::ConfigError("finnhub_rate_limit must be greater than 0".to_string())
        })?;
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

        Ok(Self {
            client: Client::builder().timeout(config.request_timeout).build()?,
            api_key: config.finnhub_api_key.clone(),
            rate_limiter,
            cache: ResponseCache::new(config.cache_ttl_recommendations),
        })
    }

    async fn fetch_recommendations(&self, symbol: &str) -> Result<Vec<Recommendation>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| StockError::NotConfigured {
            provider: "Finnhub".to_string(),
        })?;

        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(RECOMMENDATION_URL)
            .query(&[("symbol", symbol), ("token", api_key)])
            .send()
            .await
            .map_err(|e| StockError::ApiError(format!("Finnhub request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StockError::ApiError(format!(
                "Finnhub API error {status}: {body}"
            )));
        }

        let mut trends = response
            .json::<Vec<Recommendation>>()
            .await
            .map_err(|e| StockError::ApiError(format!("Failed to parse Finnhub response: {e}")))?;

        // ISO dates sort lexically
        trends.sort_by(|a, b| b.period.cmp(&a.period));
        Ok(trends)
    }
}

#[async_trait]
impl RecommendationProvider for FinnhubClient {
    async fn recommendations(&self, symbol: &str) -> Result<Vec<Recommendation>> {
        let symbol = symbol.to_uppercase();
        self.cache
            .get_or_fetch(CacheKey::new(&symbol, "recommendation"), || {
                self.fetch_recommendations(&symbol)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let client = FinnhubClient::new(&BotConfig::default()).unwrap();
        let err = client.recommendations("AAPL").await.unwrap_err();
        assert!(matches!(err, StockError::NotConfigured { .. }));
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let config = BotConfig {
            finnhub_rate_limit: 0,
            ..BotConfig::default()
        };
        assert!(FinnhubClient::new(&config).is_err());
    }

    #[tokio::test]
    #[ignore = "requires FINNHUB_API_KEY and network access"]
    async fn test_live_recommendations() {
        let config = BotConfig {
            finnhub_api_key: std::env::var("FINNHUB_API_KEY").ok(),
            ..BotConfig::default()
        };
        let client = FinnhubClient::new(&config).unwrap();
        let trends = client.recommendations("AAPL").await.unwrap();
        assert!(!trends.is_empty());
        assert!(trends[0].period >= trends[trends.len() - 1].period);
    }
}
