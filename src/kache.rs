//! Cache Facade
//!
//! Thread-safe public API over a [`CacheStore`].
//!
//! One `parking_lot::Mutex` per cache instance guards the whole store, so
//! every operation (including reads, which reposition entries) is
//! serialized in lock-acquisition order. The expiry sweeper takes the same
//! lock. Share a `Kache` between threads with `Arc`.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::info;

use crate::cache::{CacheStats, CacheStore};
use crate::config::CacheConfig;
use crate::tasks::{spawn_sweeper, Sweeper};

// == Kache ==
/// In-process key-value cache with pluggable replacement strategies and
/// per-entry TTL.
///
/// # Example
/// ```
/// use kache::{CacheConfig, Kache, ReplacementStrategy};
///
/// let cache = Kache::new(
///     CacheConfig::new().with_clean_strategy(ReplacementStrategy::Lru, 2, 1),
/// );
/// cache.set("a", 1);
/// cache.set("b", 2);
/// assert_eq!(cache.get("a"), Some(1));
///
/// // "b" is now least recently used and is evicted first
/// cache.set("c", 3);
/// assert_eq!(cache.keys(), vec!["a", "c"]);
/// ```
pub struct Kache<K, V> {
    store: Arc<Mutex<CacheStore<K, V>>>,
    sweeper: Sweeper,
    config: CacheConfig,
}

impl<K, V> Kache<K, V>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    // == Constructor ==
    /// Creates a cache and starts its expiry sweeper.
    pub fn new(config: CacheConfig) -> Self {
        let store = Arc::new(Mutex::new(CacheStore::new(&config)));
        let sweeper = spawn_sweeper(&store, config.effective_poll_interval());

        info!(
            "Cache created: strategy={}, max_records={}, clean_batch={}",
            config.replacement_strategy, config.max_record_threshold, config.clean_batch_size
        );

        Self {
            store,
            sweeper,
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Set ==
    /// Stores a value that never expires, replacing any previous value and TTL.
    pub fn set(&self, key: K, value: V) {
        self.store.lock().set(key, value, None);
    }

    /// Stores a value that expires `ttl` from now. A zero TTL never expires.
    pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.store.lock().set(key, value, Some(ttl));
    }

    // == Get ==
    /// Returns a copy of the value, updating recency and frequency per strategy.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.lock().get(key).cloned()
    }

    /// Remaining time-to-live of `key`, without counting as an access.
    ///
    /// None when the key is absent or never expires.
    pub fn ttl<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.lock().ttl(key)
    }

    // == Delete ==
    /// Removes `key`. Returns false if it was absent.
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.lock().delete(key)
    }

    // == Flush ==
    pub fn flush(&self) {
        self.store.lock().flush();
    }

    // == Keys ==
    /// Snapshot of live keys in eviction order, next victim first.
    pub fn keys(&self) -> Vec<K> {
        self.store.lock().keys()
    }

    // == Count ==
    pub fn count(&self) -> usize {
        self.store.lock().len()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    /// Runs one expiry sweep immediately, returning the number of removed entries.
    pub fn purge_expired(&self) -> usize {
        self.store.lock().cleanup_expired()
    }

    // == Close ==
    /// Stops the expiry sweeper. Entries are kept and the cache stays usable;
    /// expired entries are then only dropped when read or purged.
    ///
    /// Calling it again is a no-op.
    pub fn close(&self) {
        if self.sweeper.stop() {
            info!("Cache closed, expiry sweeper stopped");
        }
    }

    pub fn is_closed(&self) -> bool {
        !self.sweeper.is_running()
    }
}

impl<K, V> Default for Kache<K, V>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<K, V> fmt::Debug for Kache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kache")
            .field("config", &self.config)
            .field("sweeping", &self.sweeper.is_running())
            .finish_non_exhaustive()
    }
}
