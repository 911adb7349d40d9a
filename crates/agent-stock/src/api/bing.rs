//! Bing web search client restricted to today's news

use super::{NewsArticle, NewsProvider};
use crate::config::BotConfig;
use crate::error::{Result, StockError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

const SUBSCRIPTION_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Bing web search client
pub struct BingNewsClient {
    client: Client,
    search_url: Url,
    api_key: Option<String>,
}

impl BingNewsClient {
    pub fn new(config: &BotConfig) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(config.request_timeout).build()?,
            search_url: search_url(&config.search_endpoint)?,
            api_key: config.search_api_key.clone(),
        })
    }
}

/// `<endpoint>/v7.0/search`, tolerating a trailing slash on the endpoint
fn search_url(endpoint: &str) -> Result<Url> {
    let mut base = Url::parse(endpoint)
        .map_err(|e| StockError::ConfigError(format!("invalid search endpoint: {e}")))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("v7.0/search")
        .map_err(|e| StockError::ConfigError(format!("invalid search endpoint: {e}")))
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    news: Option<NewsAnswer>,
}

#[derive(Debug, Deserialize)]
struct NewsAnswer {
    #[serde(default)]
    value: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    name: String,
    url: String,
}

/// A search without a news answer simply found nothing
fn parse_search_response(body: &str) -> Result<Vec<NewsArticle>> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .news
        .map(|news| news.value)
        .unwrap_or_default()
        .into_iter()
        .map(|item| NewsArticle {
            title: item.name,
            url: item.url,
        })
        .collect())
}

#[async_trait]
impl NewsProvider for BingNewsClient {
    async fn search_news(&self, query: &str) -> Result<Vec<NewsArticle>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| StockError::NotConfigured {
            provider: "Bing search".to_string(),
        })?;

        let response = self
            .client
            .get(self.search_url.clone())
            .header(SUBSCRIPTION_HEADER, api_key)
            .query(&[
                ("q", query),
                ("responseFilter", "News"),
                ("freshness", "Day"),
            ])
            .send()
            .await
            .map_err(|e| StockError::ApiError(format!("Bing search request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StockError::ApiError(format!(
                "Bing search error {status}: {body}"
            )));
        }

        parse_search_response(&response.text().await?)
    }
}
