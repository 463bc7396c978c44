//! TTL response cache for idempotent lookup calls.
//!
//! Only routes on the configured allow-list are cached. Expiry is lazy:
//! entries are checked when read and the observed-expired entry is evicted
//! then, with no background sweep. Concurrent writers to the same key are
//! last-writer-wins.

use crate::envelope::{CarrierResponse, Envelope};
use crate::error::StructuredError;
use crate::interceptor::{RequestFlow, RequestInterceptor, ResponseInterceptor};
use crate::metrics::CacheMetrics;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Response cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a stored response stays live
    pub ttl: Duration,
    /// Entry count that triggers eviction of expired entries
    pub max_entries: usize,
    /// Routes (`model/method`) whose responses may be cached
    pub cacheable_targets: HashSet<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_entries: 1000,
            cacheable_targets: HashSet::new(),
        }
    }
}

impl CacheConfig {
    /// Set the entry TTL.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the eviction threshold.
    #[must_use]
    pub const fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Allow-list a route for caching.
    #[must_use]
    pub fn with_cacheable_target(mut self, route: impl Into<String>) -> Self {
        self.cacheable_targets.insert(route.into());
        self
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CarrierResponse,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_live(&self) -> bool {
        self.stored_at.elapsed() <= self.ttl
    }
}

/// Keyed TTL store of carrier responses.
#[derive(Debug)]
pub struct ResponseCache {
    config: CacheConfig,
    entries: RwLock<HashMap<String, CacheEntry>>,
    metrics: CacheMetrics,
}

impl ResponseCache {
    /// Create a cache with the given configuration.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
            metrics: CacheMetrics::new("carrier_transport"),
        }
    }

    /// Deterministic key for an envelope.
    ///
    /// The parameter bag serializes with sorted keys, so two envelopes with
    /// the same parameters produce the same key regardless of insertion
    /// order.
    #[must_use]
    pub fn cache_key(envelope: &Envelope) -> String {
        let parameters = Value::Object(envelope.parameters.clone());
        format!("{}:{parameters}", envelope.target.route())
    }

    /// Whether the route is on the allow-list.
    #[must_use]
    pub fn is_cacheable(&self, route: &str) -> bool {
        self.config.cacheable_targets.contains(route)
    }

    /// Look up a live entry, evicting it if it is observed expired.
    pub async fn get(&self, key: &str) -> Option<CarrierResponse> {
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.is_live() => {
                self.metrics.record_hit();
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                self.metrics.record_miss();
                self.metrics.update_size(entries.len() as u64);
                None
            }
            None => {
                self.metrics.record_miss();
                None
            }
        }
    }

    /// Store a response under the configured TTL.
    pub async fn put(&self, key: String, value: CarrierResponse) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
                ttl: self.config.ttl,
            },
        );

        if entries.len() > self.config.max_entries {
            entries.retain(|_, entry| entry.is_live());
        }
        self.metrics.update_size(entries.len() as u64);
    }

    /// Number of stored entries, live or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Hit/miss/size metrics.
    #[must_use]
    pub const fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }
}

/// Serves cache hits for allow-listed routes and stores their successful
/// responses.
///
/// Register the same instance as both a request and a response interceptor;
/// a hit short-circuits the pipeline via [`RequestFlow::Resolved`].
#[derive(Debug, Clone)]
pub struct CachingInterceptor {
    cache: Arc<ResponseCache>,
}

impl CachingInterceptor {
    /// Create an interceptor over the given cache.
    #[must_use]
    pub const fn new(cache: Arc<ResponseCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl RequestInterceptor for CachingInterceptor {
    async fn on_request(&self, envelope: Envelope) -> Result<RequestFlow, StructuredError> {
        let route = envelope.target.route();
        if self.cache.is_cacheable(&route) {
            let key = ResponseCache::cache_key(&envelope);
            if let Some(hit) = self.cache.get(&key).await {
                debug!(route = %route, "Serving carrier response from cache");
                return Ok(RequestFlow::Resolved(hit));
            }
        }
        Ok(RequestFlow::Continue(envelope))
    }
}

#[async_trait]
impl ResponseInterceptor for CachingInterceptor {
    async fn on_response(
        &self,
        envelope: &Envelope,
        response: CarrierResponse,
    ) -> Result<CarrierResponse, StructuredError> {
        let route = envelope.target.route();
        if self.cache.is_cacheable(&route) && response.is_success() {
            let key = ResponseCache::cache_key(envelope);
            self.cache.put(key, response.clone()).await;
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::CallTarget;
    use serde_json::json;

    fn lookup_envelope() -> Envelope {
        Envelope::new(CallTarget::new("rates", "lookup")).with_parameter("zone", "EU")
    }

    fn cache_with_lookup(ttl: Duration) -> Arc<ResponseCache> {
        Arc::new(ResponseCache::new(
            CacheConfig::default()
                .with_ttl(ttl)
                .with_cacheable_target("rates/lookup"),
        ))
    }

    #[tokio::test]
    async fn test_key_is_order_independent() {
        let a = Envelope::new(CallTarget::new("rates", "lookup"))
            .with_parameter("origin", "DE")
            .with_parameter("zone", "EU");
        let b = Envelope::new(CallTarget::new("rates", "lookup"))
            .with_parameter("zone", "EU")
            .with_parameter("origin", "DE");

        assert_eq!(ResponseCache::cache_key(&a), ResponseCache::cache_key(&b));
    }

    #[tokio::test]
    async fn test_key_differs_per_target_and_parameters() {
        let a = lookup_envelope();
        let b = Envelope::new(CallTarget::new("rates", "lookup")).with_parameter("zone", "US");
        let c = Envelope::new(CallTarget::new("rates", "list")).with_parameter("zone", "EU");

        assert_ne!(ResponseCache::cache_key(&a), ResponseCache::cache_key(&b));
        assert_ne!(ResponseCache::cache_key(&a), ResponseCache::cache_key(&c));
    }

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let cache = cache_with_lookup(Duration::from_secs(60));
        let key = ResponseCache::cache_key(&lookup_envelope());
        cache
            .put(key.clone(), CarrierResponse::new(200, json!({"rate": 5})))
            .await;

        let hit = cache.get(&key).await;
        assert_eq!(hit.map(|r| r.payload), Some(json!({"rate": 5})));
        assert_eq!(cache.metrics().hits.get(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_evicted_on_read() {
        let cache = cache_with_lookup(Duration::from_millis(1));
        let key = ResponseCache::cache_key(&lookup_envelope());
        cache
            .put(key.clone(), CarrierResponse::new(200, json!({})))
            .await;

        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(cache.get(&key).await.is_none());
        assert!(cache.is_empty().await);
        assert_eq!(cache.metrics().misses.get(), 1);
    }

    #[tokio::test]
    async fn test_size_pressure_drops_expired_entries() {
        let cache = Arc::new(ResponseCache::new(
            CacheConfig::default()
                .with_ttl(Duration::from_millis(1))
                .with_max_entries(2)
                .with_cacheable_target("rates/lookup"),
        ));

        cache
            .put("a".to_string(), CarrierResponse::new(200, json!(1)))
            .await;
        cache
            .put("b".to_string(), CarrierResponse::new(200, json!(2)))
            .await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        cache
            .put("c".to_string(), CarrierResponse::new(200, json!(3)))
            .await;

        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_interceptor_resolves_hit() {
        let cache = cache_with_lookup(Duration::from_secs(60));
        let interceptor = CachingInterceptor::new(cache.clone());

        let envelope = lookup_envelope();
        let response = CarrierResponse::new(200, json!({"rate": 9}));
        interceptor
            .on_response(&envelope, response)
            .await
            .unwrap();

        let flow = interceptor.on_request(lookup_envelope()).await.unwrap();
        let RequestFlow::Resolved(hit) = flow else {
            panic!("expected Resolved");
        };
        assert_eq!(hit.payload, json!({"rate": 9}));
    }

    #[tokio::test]
    async fn test_interceptor_ignores_unlisted_route() {
        let cache = cache_with_lookup(Duration::from_secs(60));
        let interceptor = CachingInterceptor::new(cache.clone());

        let envelope = Envelope::new(CallTarget::new("shipments", "create"));
        interceptor
            .on_response(&envelope, CarrierResponse::new(200, json!({})))
            .await
            .unwrap();

        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_interceptor_skips_failed_responses() {
        let cache = cache_with_lookup(Duration::from_secs(60));
        let interceptor = CachingInterceptor::new(cache.clone());

        interceptor
            .on_response(&lookup_envelope(), CarrierResponse::new(502, json!({})))
            .await
            .unwrap();

        assert!(cache.is_empty().await);
    }
}
