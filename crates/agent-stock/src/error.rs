//! Error types for market data and bot configuration

use agent_utils::EnvError;
use thiserror::Error;

/// Market data and configuration errors
#[derive(Debug, Error)]
pub enum StockError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// The provider does not know the requested symbol
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// Symbol exists but the requested data does not
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Provider credentials were never configured
    #[error("{provider} is not configured")]
    NotConfigured {
        provider: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Environment variable missing or malformed
    #[error("Configuration error: {0}")]
    Env(#[from] EnvError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl StockError {
    /// Whether the failure means "the thing you asked for does not exist"
    /// rather than "the provider is broken"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StockError::SymbolNotFound(_) | StockError::DataUnavailable { .. }
        )
    }
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

/// Convert agent_core::Error to StockError
impl From<agent_core::Error> for StockError {
    fn from(err: agent_core::Error) -> Self {
        StockError::Other(err.to_string())
    }
}
