//! Configuration for the stock chat bot

use crate::error::{Result, StockError};
use agent_core::Credentials;
use agent_utils::{env_list, env_parse, env_var, require_env};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Bing search endpoint; `/v7.0/search` is appended
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://api.bing.microsoft.com";

/// Configuration for a bot instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Chat channel the bot observes and posts to
    pub channel_url: String,

    /// Login for the channel; the username also goes on the ignore list
    pub credentials: Credentials,

    /// Authors whose messages are never dispatched
    pub ignored_users: Vec<String>,

    /// Pause after every dispatch cycle
    pub cooldown: Duration,

    /// Pause after a poll that produced nothing to do
    pub backoff: Duration,

    /// How long `!sleep` silences the bot
    pub sleep_duration: Duration,

    /// Bounded wait for a new message in interactive sessions
    pub read_timeout: Duration,

    /// Timeout for outbound HTTP requests
    pub request_timeout: Duration,

    /// Finnhub API key for analyst recommendations
    pub finnhub_api_key: Option<String>,

    /// Finnhub requests allowed per minute
    pub finnhub_rate_limit: u32,

    /// Bing web search endpoint
    pub search_endpoint: String,

    /// Bing web search subscription key
    pub search_api_key: Option<String>,

    /// Cache TTL for quotes and option chains
    pub cache_ttl_realtime: Duration,

    /// Cache TTL for analyst recommendations
    pub cache_ttl_recommendations: Duration,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            channel_url: String::new(),
            credentials: Credentials::default(),
            ignored_users: Vec::new(),
            cooldown: Duration::from_secs(5),
            backoff: Duration::from_millis(100),
            sleep_duration: Duration::from_secs(60),
            read_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
            finnhub_api_key: None,
            finnhub_rate_limit: 60,
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            search_api_key: None,
            cache_ttl_realtime: Duration::from_secs(60),
            cache_ttl_recommendations: Duration::from_secs(3600),
        }
    }
}

impl BotConfig {
    /// Create a new configuration builder
    pub fn builder() -> BotConfigBuilder {
        BotConfigBuilder::default()
    }

    /// Load configuration from environment variables
    ///
    /// `CHAT_CHANNEL_URL` is required. The older `REDDIT_*` names are
    /// accepted as fallbacks for the channel variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let channel_url = match env_var("REDDIT_CHAT_URL") {
            Some(url) if env_var("CHAT_CHANNEL_URL").is_none() => url,
            _ => require_env("CHAT_CHANNEL_URL")?,
        };
        let username = env_var("CHAT_USERNAME")
            .or_else(|| env_var("REDDIT_USERNAME"))
            .unwrap_or_default();
        let password = env_var("CHAT_PASSWORD")
            .or_else(|| env_var("REDDIT_PASSWORD"))
            .unwrap_or_default();

        let config = Self {
            channel_url,
            credentials: Credentials::new(username, password),
            ignored_users: env_list("IGNORED_USERS"),
            cooldown: env_parse("BOT_COOLDOWN_SECS")?
                .map_or(defaults.cooldown, Duration::from_secs),
            backoff: env_parse("BOT_BACKOFF_MS")?.map_or(defaults.backoff, Duration::from_millis),
            sleep_duration: env_parse("BOT_SLEEP_SECS")?
                .map_or(defaults.sleep_duration, Duration::from_secs),
            read_timeout: env_parse("BOT_READ_TIMEOUT_MS")?
                .map_or(defaults.read_timeout, Duration::from_millis),
            request_timeout: env_parse("BOT_REQUEST_TIMEOUT_SECS")?
                .map_or(defaults.request_timeout, Duration::from_secs),
            finnhub_api_key: env_var("FINNHUB_API_KEY").or_else(|| env_var("FINNHUB_API")),
            finnhub_rate_limit: env_parse("FINNHUB_RATE_LIMIT")?
                .unwrap_or(defaults.finnhub_rate_limit),
            search_endpoint: env_var("SEARCH_ENDPOINT").unwrap_or(defaults.search_endpoint),
            search_api_key: env_var("SEARCH_API_KEY").or_else(|| env_var("SEARCH_API")),
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.channel_url.trim().is_empty() {
            return Err(StockError::ConfigError(
                "channel URL must not be empty".to_string(),
            ));
        }

        if self.cooldown.is_zero() {
            return Err(StockError::ConfigError(
                "cooldown must be greater than 0".to_string(),
            ));
        }

        if self.finnhub_rate_limit == 0 {
            return Err(StockError::ConfigError(
                "finnhub_rate_limit must be greater than 0".to_string(),
            ));
        }

        url::Url::parse(&self.search_endpoint).map_err(|e| {
            StockError::ConfigError(format!("invalid search endpoint: {e}"))
        })?;

        Ok(())
    }

    /// Everyone the bot must not answer, itself included
    pub fn ignore_list(&self) -> Vec<String> {
        let mut users = self.ignored_users.clone();
        let own = &self.credentials.username;
        if !own.is_empty() && !users.contains(own) {
            users.push(own.clone());
        }
        users
    }
}

/// Builder for BotConfig
#[derive(Debug, Default)]
pub struct BotConfigBuilder {
    channel_url: Option<String>,
    credentials: Option<Credentials>,
    ignored_users: Vec<String>,
    cooldown: Option<Duration>,
    backoff: Option<Duration>,
    sleep_duration: Option<Duration>,
    read_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    finnhub_api_key: Option<String>,
    finnhub_rate_limit: Option<u32>,
    search_endpoint: Option<String>,
    search_api_key: Option<String>,
}

impl BotConfigBuilder {
    pub fn channel_url(mut self, url: impl Into<String>) -> Self {
        self.channel_url = Some(url.into());
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    pub fn ignore_user(mut self, user: impl Into<String>) -> Self {
        self.ignored_users.push(user.into());
        self
    }

    pub fn cooldown(mut self, duration: Duration) -> Self {
        self.cooldown = Some(duration);
        self
    }

    pub fn backoff(mut self, duration: Duration) -> Self {
        self.backoff = Some(duration);
        self
    }

    pub fn sleep_duration(mut self, duration: Duration) -> Self {
        self.sleep_duration = Some(duration);
        self
    }

    pub fn read_timeout(mut self, duration: Duration) -> Self {
        self.read_timeout = Some(duration);
        self
    }

    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    pub fn finnhub_api_key(mut self, key: impl Into<String>) -> Self {
        self.finnhub_api_key = Some(key.into());
        self
    }

    pub fn finnhub_rate_limit(mut self, per_minute: u32) -> Self {
        self.finnhub_rate_limit = Some(per_minute);
        self
    }

    pub fn search_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.search_endpoint = Some(endpoint.into());
        self
    }

    pub fn search_api_key(mut self, key: impl Into<String>) -> Self {
        self.search_api_key = Some(key.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<BotConfig> {
        let defaults = BotConfig::default();

        let config = BotConfig {
            channel_url: self.channel_url.unwrap_or(defaults.channel_url),
            credentials: self.credentials.unwrap_or(defaults.credentials),
            ignored_users: self.ignored_users,
            cooldown: self.cooldown.unwrap_or(defaults.cooldown),
            backoff: self.backoff.unwrap_or(defaults.backoff),
            sleep_duration: self.sleep_duration.unwrap_or(defaults.sleep_duration),
            read_timeout: self.read_timeout.unwrap_or(defaults.read_timeout),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            finnhub_api_key: self.finnhub_api_key,
            finnhub_rate_limit: self.finnhub_rate_limit.unwrap_or(defaults.finnhub_rate_limit),
            search_endpoint: self.search_endpoint.unwrap_or(defaults.search_endpoint),
            search_api_key: self.search_api_key,
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }
}
