//! Cache Store Module
//!
//! Main cache engine combining the ordering index with a replacement
//! strategy, capacity-triggered eviction and TTL expiration.
//!
//! The store is not synchronized; [`crate::Kache`] wraps it in a lock.

use std::borrow::Borrow;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::index::OrderingIndex;
use crate::cache::{CacheEntry, CacheStats, ReplacementStrategy};
use crate::config::CacheConfig;

// == Cache Store ==
/// Main cache storage with policy-driven eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key lookup plus eviction order
    index: OrderingIndex<K, V>,
    /// Active replacement strategy
    strategy: ReplacementStrategy,
    /// Record count at which a set triggers eviction, 0 = disabled
    max_record_threshold: usize,
    /// Entries removed per eviction, 0 = disabled
    clean_batch_size: usize,
    /// Performance statistics
    stats: CacheStats,
}

impl<K: Hash + Eq + Clone, V> CacheStore<K, V> {
    // == Constructor ==
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            index: OrderingIndex::new(),
            strategy: config.replacement_strategy,
            max_record_threshold: config.max_record_threshold,
            clean_batch_size: config.clean_batch_size,
            stats: CacheStats::new(),
        }
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL.
    ///
    /// The eviction trigger is checked first. An existing live key keeps its
    /// position (except under LRU/MRU) and access count, but its value and
    /// expiry are replaced. An expired key is dropped and inserted afresh.
    pub fn set(&mut self, key: K, value: V, ttl: Option<Duration>) {
        if self.should_evict() {
            self.evict();
        }

        // An expired entry is dead even if no sweep has removed it yet
        let live = match self.index.lookup(&key) {
            Some(handle) if self.index.entry(handle).is_some_and(CacheEntry::is_expired) => {
                self.index.remove_handle(handle);
                self.stats.record_expirations(1);
                None
            }
            other => other,
        };

        match live {
            Some(handle) => {
                if let Some(entry) = self.index.entry_mut(handle) {
                    entry.replace(value, ttl);
                }
                self.strategy.on_update(&mut self.index, handle);
            }
            None => {
                self.strategy
                    .insert(&mut self.index, CacheEntry::new(key, value, ttl));
            }
        }
    }

    // == Get ==
    /// Retrieves a value by key, updating recency and frequency metadata.
    ///
    /// An entry whose TTL has elapsed is removed and reported as missing,
    /// whether or not a sweep has run yet.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(handle) = self.index.lookup(key) else {
            self.stats.record_miss();
            return None;
        };

        if self.index.entry(handle).is_some_and(CacheEntry::is_expired) {
            self.index.remove_handle(handle);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        self.index.entry_mut(handle)?.touch();
        self.strategy.on_access(&mut self.index, handle);
        self.stats.record_hit();

        self.index.entry(handle).map(|entry| &entry.value)
    }

    // == Time To Live ==
    /// Remaining TTL of a live entry; None when absent or without expiry.
    pub fn ttl<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.index.lookup(key)?;
        self.index.entry(handle)?.ttl_remaining()
    }

    // == Delete ==
    /// Removes an entry by key. Returns false if the key was absent.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.remove(key).is_some()
    }

    // == Flush ==
    pub fn flush(&mut self) {
        self.index.clear();
    }

    // == Keys ==
    /// Snapshot of keys from the eviction-first end to the eviction-last end.
    pub fn keys(&self) -> Vec<K> {
        self.index.keys()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.index.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes every entry whose TTL elapsed at or before `now`.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired_at(&mut self, now: Instant) -> usize {
        let removed = self.index.remove_where(|entry| entry.is_expired_at(now));
        self.stats.record_expirations(removed);
        removed
    }

    pub fn cleanup_expired(&mut self) -> usize {
        self.cleanup_expired_at(Instant::now())
    }

    // == Eviction ==
    /// True when the next set must harvest victims first.
    pub fn should_evict(&self) -> bool {
        self.max_record_threshold > 0
            && self.clean_batch_size > 0
            && self.strategy.evicts()
            && self.index.len() >= self.max_record_threshold
    }

    /// Removes up to one batch of entries from the eviction-first end.
    pub fn evict(&mut self) -> usize {
        let evicted = self.index.remove_front(self.clean_batch_size).len();
        self.stats.record_evictions(evicted);
        debug!(
            "{} eviction: removed {} entries, {} remain",
            self.strategy,
            evicted,
            self.index.len()
        );
        evicted
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        self.index.is_consistent() && self.index.iter().count() == self.index.len()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn store(strategy: ReplacementStrategy, max: usize, batch: usize) -> CacheStore<String, String> {
        CacheStore::new(&CacheConfig::new().with_clean_strategy(strategy, max, batch))
    }

    fn fill(store: &mut CacheStore<String, String>, range: std::ops::Range<u32>) {
        for i in range {
            store.set(i.to_string(), "value".to_string(), None);
        }
    }

    fn keys_of(range: impl IntoIterator<Item = u32>) -> Vec<String> {
        range.into_iter().map(|i| i.to_string()).collect()
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store(ReplacementStrategy::None, 0, 0);

        store.set("key1".to_string(), "value1".to_string(), None);

        assert_eq!(store.get("key1"), Some(&"value1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store(ReplacementStrategy::Lru, 10, 1);
        assert_eq!(store.get("nonexistent"), None);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_delete() {
        let mut store = store(ReplacementStrategy::Fifo, 10, 1);

        store.set("key1".to_string(), "value1".to_string(), None);
        assert!(store.delete("key1"));
        assert!(!store.delete("key1"));

        assert!(store.is_empty());
        assert_eq!(store.get("key1"), None);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store(ReplacementStrategy::Fifo, 10, 1);

        store.set("key1".to_string(), "value1".to_string(), None);
        store.set("key1".to_string(), "value2".to_string(), None);

        assert_eq!(store.get("key1"), Some(&"value2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_flush() {
        let mut store = store(ReplacementStrategy::Lru, 10, 1);
        fill(&mut store, 0..5);

        store.flush();
        assert!(store.is_empty());
        store.flush();
        assert!(store.is_empty());
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_fifo_eviction_count() {
        let mut store = store(ReplacementStrategy::Fifo, 1000, 100);
        fill(&mut store, 0..1001);

        assert_eq!(store.len(), 901);
        assert_eq!(store.stats().evictions, 100);
    }

    #[test]
    fn test_fifo_eviction_order() {
        let mut store = store(ReplacementStrategy::Fifo, 10, 6);
        fill(&mut store, 0..11);

        assert_eq!(store.keys(), keys_of(6..11));
    }

    #[test]
    fn test_lifo_eviction_order() {
        let mut store = store(ReplacementStrategy::Lifo, 10, 6);
        fill(&mut store, 0..11);

        assert_eq!(store.keys(), keys_of([10, 3, 2, 1, 0]));
    }

    #[test]
    fn test_lru_eviction_order() {
        let mut store = store(ReplacementStrategy::Lru, 10, 6);
        fill(&mut store, 0..10);
        for i in (0..10).rev() {
            store.get(i.to_string().as_str());
        }
        store.set("10".to_string(), "value".to_string(), None);

        assert_eq!(store.keys(), keys_of([3, 2, 1, 0, 10]));
    }

    #[test]
    fn test_mru_eviction_order() {
        let mut store = store(ReplacementStrategy::Mru, 10, 6);
        fill(&mut store, 0..10);
        for i in (0..10).rev() {
            store.get(i.to_string().as_str());
        }
        store.set("10".to_string(), "value".to_string(), None);

        assert_eq!(store.keys(), keys_of([6, 7, 8, 9, 10]));
    }

    #[test]
    fn test_lfu_eviction_order() {
        let mut store = store(ReplacementStrategy::Lfu, 10, 6);
        fill(&mut store, 0..10);
        for round in 0..10 {
            for j in round..10 {
                store.get((9 - j).to_string().as_str());
            }
        }
        store.set("10".to_string(), "value".to_string(), None);

        assert_eq!(store.keys(), keys_of([3, 2, 1, 0, 10]));
    }

    #[test]
    fn test_mfu_eviction_order() {
        let mut store = store(ReplacementStrategy::Mfu, 10, 6);
        fill(&mut store, 0..10);
        for round in 0..10 {
            for j in round..10 {
                store.get((9 - j).to_string().as_str());
            }
        }
        store.set("10".to_string(), "value".to_string(), None);
        for _ in 0..10 {
            store.get("10");
        }

        assert_eq!(store.keys(), keys_of([10, 6, 7, 8, 9]));
        assert!(store.is_consistent());
    }

    #[test]
    fn test_none_strategy_never_evicts() {
        let mut store = store(ReplacementStrategy::None, 10, 6);
        fill(&mut store, 0..50);

        assert_eq!(store.len(), 50);
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_zero_batch_never_evicts() {
        let mut store = store(ReplacementStrategy::Fifo, 10, 0);
        fill(&mut store, 0..20);
        assert_eq!(store.len(), 20);
    }

    #[test]
    fn test_batch_larger_than_len_evicts_all() {
        let mut store = store(ReplacementStrategy::Fifo, 3, 10);
        fill(&mut store, 0..4);

        assert_eq!(store.keys(), keys_of([3]));
        assert_eq!(store.stats().evictions, 3);
    }

    #[test]
    fn test_update_does_not_move_fifo_entry() {
        let mut store = store(ReplacementStrategy::Fifo, 10, 1);
        fill(&mut store, 0..3);

        store.set("0".to_string(), "updated".to_string(), None);

        assert_eq!(store.keys(), keys_of(0..3));
        assert_eq!(store.get("0"), Some(&"updated".to_string()));
    }

    #[test]
    fn test_update_moves_lru_entry_back() {
        let mut store = store(ReplacementStrategy::Lru, 10, 1);
        fill(&mut store, 0..3);

        store.set("0".to_string(), "updated".to_string(), None);

        assert_eq!(store.keys(), keys_of([1, 2, 0]));
    }

    #[test]
    fn test_update_at_threshold_may_evict_updated_key() {
        let mut store = store(ReplacementStrategy::Fifo, 3, 1);
        fill(&mut store, 0..3);

        store.set("0".to_string(), "again".to_string(), None);

        assert_eq!(store.keys(), keys_of([1, 2, 0]));
        assert_eq!(store.len(), 3);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = store(ReplacementStrategy::None, 0, 0);

        store.set("key1".to_string(), "value1".to_string(), Some(Duration::from_millis(50)));
        assert!(store.get("key1").is_some());

        sleep(Duration::from_millis(80));

        assert!(store.get("key1").is_none());
        assert!(store.is_empty());
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = store(ReplacementStrategy::Lru, 100, 10);

        store.set("short".to_string(), "v".to_string(), Some(Duration::from_millis(50)));
        store.set("long".to_string(), "v".to_string(), Some(Duration::from_secs(60)));
        store.set("forever".to_string(), "v".to_string(), None);

        sleep(Duration::from_millis(80));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.keys(), vec!["long", "forever"]);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_cleanup_expired_at_boundary() {
        let mut store = store(ReplacementStrategy::None, 0, 0);
        store.set("k".to_string(), "v".to_string(), Some(Duration::from_secs(5)));

        let now = Instant::now();
        assert_eq!(store.cleanup_expired_at(now), 0);
        assert_eq!(store.cleanup_expired_at(now + Duration::from_secs(5)), 1);
    }

    #[test]
    fn test_plain_set_clears_ttl() {
        let mut store = store(ReplacementStrategy::None, 0, 0);
        store.set("k".to_string(), "v".to_string(), Some(Duration::from_secs(5)));
        assert!(store.ttl("k").is_some());

        store.set("k".to_string(), "v".to_string(), None);
        assert!(store.ttl("k").is_none());
        assert_eq!(store.cleanup_expired_at(Instant::now() + Duration::from_secs(10)), 0);
    }

    #[test]
    fn test_store_stats() {
        let mut store = store(ReplacementStrategy::Lru, 100, 10);

        store.set("key1".to_string(), "value1".to_string(), None);
        store.get("key1");
        store.get("nonexistent");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_set_on_expired_fifo_key_inserts_at_back() {
        let mut store = store(ReplacementStrategy::Fifo, 10, 2);
        store.set("a".to_string(), "old".to_string(), Some(Duration::from_millis(10)));
        store.set("b".to_string(), "value".to_string(), None);
        store.set("c".to_string(), "value".to_string(), None);

        sleep(Duration::from_millis(30));
        store.set("a".to_string(), "new".to_string(), None);

        assert_eq!(store.keys(), vec!["b", "c", "a"]);
        assert_eq!(store.get("a"), Some(&"new".to_string()));
        assert_eq!(store.stats().expirations, 1);
        assert!(store.is_consistent());
    }

    #[test]
    fn test_set_on_expired_lfu_key_resets_access_count() {
        let mut store = store(ReplacementStrategy::Lfu, 10, 2);
        store.set("a".to_string(), "old".to_string(), Some(Duration::from_millis(10)));
        store.set("b".to_string(), "value".to_string(), None);
        for _ in 0..5 {
            store.get("a");
        }

        sleep(Duration::from_millis(30));
        store.set("a".to_string(), "new".to_string(), None);

        let handle = store.index.lookup("a").expect("a should be present");
        let entry = store.index.entry(handle).expect("handle should be live");
        assert_eq!(entry.access_count, 0);
        assert_eq!(entry.expires_at, None);
        assert_eq!(store.keys(), vec!["b", "a"]);
    }
}
