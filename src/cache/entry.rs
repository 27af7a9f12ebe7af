//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with access metadata
//! and TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    /// The key, immutable once stored
    pub key: K,
    /// The stored value
    pub value: V,
    /// When the entry was first inserted
    pub inserted_at: Instant,
    /// When the entry was last read
    pub last_accessed_at: Instant,
    /// Number of reads since insertion
    pub access_count: u64,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates a new cache entry with optional TTL.
    ///
    /// A zero TTL means the entry never expires.
    pub fn new(key: K, value: V, ttl: Option<Duration>) -> Self {
        let now = Instant::now();
        Self {
            key,
            value,
            inserted_at: now,
            last_accessed_at: now,
            access_count: 0,
            expires_at: expiry_from(now, ttl),
        }
    }

    // == Replace ==
    /// Swaps in a new value and expiry, keeping insertion time and access count.
    pub fn replace(&mut self, value: V, ttl: Option<Duration>) {
        self.value = value;
        self.expires_at = expiry_from(Instant::now(), ttl);
    }

    // == Touch ==
    /// Records a read of this entry.
    pub fn touch(&mut self) {
        self.last_accessed_at = Instant::now();
        self.access_count = self.access_count.saturating_add(1);
    }

    // == Is Expired ==
    /// Checks if the entry has expired relative to `now`.
    ///
    /// An entry is expired once `now >= expires_at`; entries without a TTL
    /// never expire.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Time To Live ==
    /// Returns remaining TTL, or None if no expiration is set.
    ///
    /// Returns `Some(Duration::ZERO)` once the entry has expired.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }
}

fn expiry_from(now: Instant, ttl: Option<Duration>) -> Option<Instant> {
    ttl.filter(|ttl| !ttl.is_zero())
        .and_then(|ttl| now.checked_add(ttl))
}
