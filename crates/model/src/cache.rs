//! Model instance cache with LRU eviction and TTL expiry.
//!
//! Constructing an instance builds headers and a request template; callers
//! issue many requests against one configuration, so instances are memoized.
//! Entries expire after a TTL so rotated credentials and changed endpoints
//! do not linger.

use crate::provider::Model;
use crate::registry::Registry;
use llm::{ChatConfig, Error, Result};
use lru::LruCache;
use reqwest::Client;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Default number of cached instances.
pub const DEFAULT_CAPACITY: usize = 10;
/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Identity of a cached instance.
///
/// Only fields that change the constructed instance participate; sampling
/// knobs like `top_p` live in the request template of the instance itself
/// but `temperature` and `max_tokens` alter the Claude request body enough
/// to key on. Floats key by bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    provider: compact_str::CompactString,
    model: compact_str::CompactString,
    key_prefix: compact_str::CompactString,
    base_url: Option<String>,
    temperature: Option<u64>,
    max_tokens: Option<u32>,
}

impl CacheKey {
    fn new(provider: &str, config: &ChatConfig) -> Self {
        Self {
            provider: provider.into(),
            model: config.model.clone(),
            key_prefix: config.key_prefix(),
            base_url: config.base_url.clone(),
            temperature: config.temperature.map(f64::to_bits),
            max_tokens: config.max_tokens,
        }
    }
}

struct CacheEntry {
    model: Model,
    created: Instant,
    last_used: Instant,
}

impl CacheEntry {
    fn expired(&self, ttl: Duration) -> bool {
        self.created.elapsed() >= ttl
    }
}

/// LRU + TTL cache over constructed model instances.
pub struct ModelCache {
    registry: Arc<Registry>,
    client: Client,
    inner: Mutex<LruCache<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl ModelCache {
    /// A cache with the default capacity and TTL over the given registry.
    pub fn new(registry: Arc<Registry>, client: Client) -> Self {
        Self::with(registry, client, DEFAULT_CAPACITY, DEFAULT_TTL)
    }

    /// A cache with explicit capacity and TTL.
    pub fn with(registry: Arc<Registry>, client: Client, capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            registry,
            client,
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// The registry backing this cache.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Resolve, validate, and return an instance for this configuration,
    /// constructing one only on a miss or after expiry.
    pub fn get_or_create(&self, config: &ChatConfig) -> Result<Model> {
        let spec = self.registry.resolve(config)?;
        let key = CacheKey::new(spec.name(), config);
        {
            let mut cache = self.inner.lock().expect("model cache lock poisoned");
            // get_mut() refreshes LRU recency on a hit.
            if let Some(entry) = cache.get_mut(&key) {
                if !entry.expired(self.ttl) {
                    entry.last_used = Instant::now();
                    return Ok(entry.model.clone());
                }
                cache.pop(&key);
            }
        }
        // Build outside the lock; construction may do real work.
        spec.validate(config)?;
        let model = spec.build(self.client.clone(), config).map_err(|e| match e {
            Error::Configuration(_) | Error::Validation(_) => e,
            other => Error::Configuration(format!(
                "failed to construct '{}' instance: {other}",
                spec.name()
            )),
        })?;
        let now = Instant::now();
        let entry = CacheEntry {
            model: model.clone(),
            created: now,
            last_used: now,
        };
        self.inner
            .lock()
            .expect("model cache lock poisoned")
            .put(key, entry);
        Ok(model)
    }

    /// Time since the entry for this configuration was last handed out,
    /// without touching its recency.
    pub fn idle_for(&self, config: &ChatConfig) -> Option<Duration> {
        let spec = self.registry.resolve(config).ok()?;
        let key = CacheKey::new(spec.name(), config);
        let cache = self.inner.lock().expect("model cache lock poisoned");
        cache.peek(&key).map(|entry| entry.last_used.elapsed())
    }

    /// Drop every cached instance belonging to a provider. Call after
    /// unregistering or replacing a spec.
    pub fn invalidate_provider(&self, name: &str) {
        let mut cache = self.inner.lock().expect("model cache lock poisoned");
        let stale: Vec<CacheKey> = cache
            .iter()
            .filter(|(key, _)| key.provider == name)
            .map(|(key, _)| key.clone())
            .collect();
        for key in stale {
            cache.pop(&key);
        }
    }

    /// Drop expired entries.
    pub fn cleanup(&self) {
        let mut cache = self.inner.lock().expect("model cache lock poisoned");
        let expired: Vec<CacheKey> = cache
            .iter()
            .filter(|(_, entry)| entry.expired(self.ttl))
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            cache.pop(&key);
        }
    }

    /// Number of cached entries, including any not yet expired-swept.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("model cache lock poisoned").len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
