//! Caching layer for station search.
//!
//! Station names and CRS codes change a few times a year, so search
//! results are kept for a day. Only successful lookups are cached; a
//! failed lookup is retried on the next request.

use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::providers::{HuxleyClient, Payload, ProviderResult};

/// Configuration for the station search cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached queries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            max_capacity: 1000,
        }
    }
}

/// Huxley station search with a per-query cache.
pub struct CachedStationSearch {
    client: HuxleyClient,
    results: MokaCache<String, Payload>,
}

impl CachedStationSearch {
    pub fn new(client: HuxleyClient, config: &CacheConfig) -> Self {
        let results = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { client, results }
    }

    /// Search stations by name, using the cache if available.
    ///
    /// Queries are case- and whitespace-insensitive.
    pub async fn search(&self, query: &str) -> ProviderResult {
        let key = normalize_query(query);

        if let Some(cached) = self.results.get(&key).await {
            return ProviderResult::Success(cached);
        }

        let result = self.client.search_stations(&key).await;
        if let ProviderResult::Success(payload) = &result {
            self.results.insert(key, payload.clone()).await;
        }
        result
    }

    /// Get cache statistics.
    pub fn entry_count(&self) -> u64 {
        self.results.entry_count()
    }
}

fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
