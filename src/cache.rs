use crate::config::CacheConfig;
use crate::error::StoreError;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    inserted_at: Instant,
    last_used: u64,
}

impl<T: Clone> CacheEntry<T> {
    fn new(value: T, tick: u64) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            last_used: tick,
        }
    }

    fn is_expired(&self, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|ttl| self.inserted_at.elapsed() > ttl)
    }

    fn access(&mut self, tick: u64) -> T {
        self.last_used = tick;
        self.value.clone()
    }
}

/// Memo of fetched records keyed by id.
pub trait CacheTrait<T>: Send + Sync
where
    T: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<T>;
    fn insert(&self, key: String, value: T) -> Result<(), StoreError>;
    fn contains_key(&self, key: &str) -> bool;
    fn clear(&self);
    fn size(&self) -> usize;
    fn hit_rate(&self) -> f64;
    fn cleanup_expired(&self);
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            self.hits as f64 / (self.hits + self.misses) as f64
        }
    }
}

struct Inner<T> {
    entries: HashMap<String, CacheEntry<T>>,
    stats: CacheStats,
    // bumped on every insert and hit; orders entries by recency
    clock: u64,
}

impl<T> Inner<T> {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// In-memory cache living as long as the session.
///
/// With the default configuration nothing is ever evicted or expired; only
/// [`CacheTrait::clear`] (a full reload) empties it.
pub struct SessionCache<T>
where
    T: Clone + Send + Sync,
{
    inner: Mutex<Inner<T>>,
    config: CacheConfig,
}

impl<T> SessionCache<T>
where
    T: Clone + Send + Sync,
{
    pub fn new(config: CacheConfig) -> Self {
        tracing::info!(
            "Initializing session cache with max_size: {}, expiration: {}s",
            config.max_size,
            config.expiration
        );

        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                stats: CacheStats::default(),
                clock: 0,
            }),
            config,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.r#type == "memory"
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn stats(&self) -> CacheStats {
        self.inner
            .lock()
            .map(|inner| inner.stats.clone())
            .unwrap_or_default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|inner| inner.entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn ttl(&self) -> Option<Duration> {
        (self.config.expiration > 0).then(|| Duration::from_secs(self.config.expiration as u64))
    }

    fn evict_least_recent(&self, inner: &mut Inner<T>) {
        if self.config.max_size == 0 || inner.entries.len() < self.config.max_size as usize {
            return;
        }

        let victim = inner
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());

        if let Some(key) = victim {
            inner.entries.remove(&key);
            inner.stats.evictions += 1;
            tracing::debug!("Evicted cache entry: {}", key);
        }
    }
}

impl<T> Default for SessionCache<T>
where
    T: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<T> CacheTrait<T> for SessionCache<T>
where
    T: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<T> {
        if key.is_empty() {
            tracing::warn!("Attempted to get cache entry with empty key");
            return None;
        }
        let ttl = self.ttl();

        let mut inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(e) => {
                tracing::error!("Failed to acquire cache lock for key {}: {}", key, e);
                return None;
            }
        };

        let expired = match inner.entries.get(key) {
            Some(entry) => entry.is_expired(ttl),
            None => {
                inner.stats.misses += 1;
                tracing::debug!("Cache miss for key: {}", key);
                return None;
            }
        };

        if expired {
            tracing::debug!("Cache entry expired for key: {}", key);
            inner.entries.remove(key);
            inner.stats.misses += 1;
            return None;
        }

        inner.stats.hits += 1;
        tracing::debug!("Cache hit for key: {}", key);
        let tick = inner.tick();
        inner.entries.get_mut(key).map(|entry| entry.access(tick))
    }

    fn insert(&self, key: String, value: T) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("Key cannot be empty".to_string()));
        }

        let mut inner = self.inner.lock().map_err(|e| {
            let error_msg = format!("Failed to acquire cache write lock: {}", e);
            tracing::error!("{}", error_msg);
            StoreError::LockError(error_msg)
        })?;

        if !inner.entries.contains_key(&key) {
            self.evict_least_recent(&mut inner);
        }
        let tick = inner.tick();
        if inner
            .entries
            .insert(key.clone(), CacheEntry::new(value, tick))
            .is_some()
        {
            tracing::debug!("Updated cache entry: {}", key);
        } else {
            tracing::debug!("Inserted cache entry: {}", key);
        }
        inner.stats.inserts += 1;
        Ok(())
    }

    fn contains_key(&self, key: &str) -> bool {
        self.inner
            .lock()
            .map(|inner| inner.entries.contains_key(key))
            .unwrap_or(false)
    }

    fn clear(&self) {
        match self.inner.lock() {
            Ok(mut inner) => {
                let size = inner.entries.len();
                inner.entries.clear();
                inner.stats = CacheStats::default();
                tracing::info!("Cleared cache ({} entries)", size);
            }
            Err(e) => {
                tracing::error!("Failed to acquire cache lock for clearing: {}", e);
            }
        }
    }

    fn size(&self) -> usize {
        self.inner.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    fn hit_rate(&self) -> f64 {
        self.stats().hit_rate()
    }

    fn cleanup_expired(&self) {
        let Some(ttl) = self.ttl() else {
            return;
        };
        if let Ok(mut inner) = self.inner.lock() {
            let before = inner.entries.len();
            inner.entries.retain(|_, entry| !entry.is_expired(Some(ttl)));
            let removed = before - inner.entries.len();
            if removed > 0 {
                inner.stats.evictions += removed as u64;
                tracing::debug!("Cleaned up {} expired cache entries", removed);
            }
        }
    }
}
