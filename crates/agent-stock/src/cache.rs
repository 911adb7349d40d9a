//! Caching layer for provider responses to reduce API calls

use cached::{Cached, TimedCache};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Cache key for a provider lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Upper-cased ticker symbol
    pub symbol: String,
    /// Lookup kind, e.g. `quote` or `calls`
    pub endpoint: &'static str,
    /// Extra discriminator such as an expiry date
    pub params: String,
}

impl CacheKey {
    pub fn new(symbol: &str, endpoint: &'static str) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            endpoint,
            params: String::new(),
        }
    }

    pub fn with_params(mut self, params: impl Into<String>) -> Self {
        self.params = params.into();
        self
    }
}

/// Thread-safe time-bounded cache for decoded provider responses
///
/// Only successful lookups are stored; errors always reach the caller and
/// the next request tries the provider again.
pub struct ResponseCache<V> {
    cache: Arc<RwLock<TimedCache<CacheKey, V>>>,
}

impl<V: Clone> ResponseCache<V> {
    /// Create a new cache with specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        // TimedCache evicts expired entries on lookup, hence the write lock
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    pub async fn insert(&self, key: CacheKey, value: V) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value);
    }

    /// Return the cached value or run `fetcher` and remember its success
    pub async fn get_or_fetch<F, Fut, E>(&self, key: CacheKey, fetcher: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!(?key, "Cache hit");
            return Ok(value);
        }

        tracing::debug!(?key, "Cache miss");
        let value = fetcher().await?;
        self.insert(key, value.clone()).await;

        Ok(value)
    }

    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<V> Clone for ResponseCache<V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_normalizes_symbol() {
        let key = CacheKey::new("tsla", "calls").with_params("2020-09-11");
        assert_eq!(key.symbol, "TSLA");
        assert_eq!(key, CacheKey::new("TSLA", "calls").with_params("2020-09-11"));
        assert_ne!(key, CacheKey::new("TSLA", "puts").with_params("2020-09-11"));
    }

    #[tokio::test]
    async fn test_get_or_fetch_only_fetches_once() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let mut call_count = 0;

        let first = cache
            .get_or_fetch(CacheKey::new("AAPL", "quote"), || {
                call_count += 1;
                async { Ok::<_, String>(150.25) }
            })
            .await;
        assert_eq!(first, Ok(150.25));

        let second = cache
            .get_or_fetch(CacheKey::new("AAPL", "quote"), || {
                call_count += 1;
                async { Ok::<_, String>(0.0) }
            })
            .await;
        assert_eq!(second, Ok(150.25));
        assert_eq!(call_count, 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: ResponseCache<f64> = ResponseCache::new(Duration::from_secs(60));
        let key = CacheKey::new("AAPL", "quote");

        let failed = cache
            .get_or_fetch(key.clone(), || async { Err::<f64, _>("timeout") })
            .await;
        assert!(failed.is_err());
        assert!(cache.is_empty().await);

        let retried = cache
            .get_or_fetch(key, || async { Ok::<_, &str>(1.0) })
            .await;
        assert_eq!(retried, Ok(1.0));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        for symbol in ["AAPL", "MSFT", "TSLA"] {
            cache.insert(CacheKey::new(symbol, "quote"), 1_u32).await;
        }
        assert_eq!(cache.len().await, 3);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
