//! Replacement Policy Module
//!
//! Decides where entries sit in the ordering index. Every strategy harvests
//! victims from the front of the sequence, so each rule below only has to
//! keep the next victim at the front.

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::index::{Handle, OrderingIndex};
use crate::cache::CacheEntry;
use crate::error::CacheError;

// == Replacement Strategy ==
/// Policy deciding which entries are removed first when capacity is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplacementStrategy {
    /// No capacity eviction; only TTL expiry removes entries
    #[default]
    None,
    /// First in, first out
    Fifo,
    /// Last in, first out
    Lifo,
    /// Least recently used
    Lru,
    /// Most recently used
    Mru,
    /// Least frequently used
    Lfu,
    /// Most frequently used
    Mfu,
}

impl ReplacementStrategy {
    pub const ALL: [ReplacementStrategy; 7] = [
        Self::None,
        Self::Fifo,
        Self::Lifo,
        Self::Lru,
        Self::Mru,
        Self::Lfu,
        Self::Mfu,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fifo => "fifo",
            Self::Lifo => "lifo",
            Self::Lru => "lru",
            Self::Mru => "mru",
            Self::Lfu => "lfu",
            Self::Mfu => "mfu",
        }
    }

    /// Returns false for the strategy that never evicts by capacity.
    pub fn evicts(self) -> bool {
        self != Self::None
    }

    // == On Insert ==
    /// Places a freshly inserted entry in the sequence.
    pub fn insert<K, V>(self, index: &mut OrderingIndex<K, V>, entry: CacheEntry<K, V>) -> Handle
    where
        K: Hash + Eq + Clone,
    {
        match self {
            Self::Lifo => index.push_front(entry),
            Self::None | Self::Fifo | Self::Lru | Self::Mru | Self::Lfu | Self::Mfu => {
                index.push_back(entry)
            }
        }
    }

    // == On Access ==
    /// Repositions an entry after a read hit.
    ///
    /// The entry's access count must already include this read.
    pub fn on_access<K, V>(self, index: &mut OrderingIndex<K, V>, handle: Handle)
    where
        K: Hash + Eq + Clone,
    {
        match self {
            Self::Lru => index.move_to_back(handle),
            Self::Mru => index.move_to_front(handle),
            Self::Lfu | Self::Mfu => self.bubble(index, handle),
            Self::None | Self::Fifo | Self::Lifo => {}
        }
    }

    // == On Update ==
    /// Repositions an existing entry after its value was replaced.
    pub fn on_update<K, V>(self, index: &mut OrderingIndex<K, V>, handle: Handle)
    where
        K: Hash + Eq + Clone,
    {
        match self {
            Self::Lru => index.move_to_back(handle),
            Self::Mru => index.move_to_front(handle),
            Self::None | Self::Fifo | Self::Lifo | Self::Lfu | Self::Mfu => {}
        }
    }

    // == Bubble ==
    /// Swaps the entry past neighbours until its access count is ordered
    /// relative to both of them. Equal counts never swap.
    fn bubble<K, V>(self, index: &mut OrderingIndex<K, V>, handle: Handle)
    where
        K: Hash + Eq + Clone,
    {
        let hits = |index: &OrderingIndex<K, V>, h: Handle| {
            index.entry(h).map(|entry| entry.access_count)
        };
        let Some(own) = hits(index, handle) else {
            return;
        };

        loop {
            if let Some(prev) = index.prev(handle) {
                if hits(index, prev).is_some_and(|front| self.misordered(front, own)) {
                    index.move_before(handle, prev);
                    continue;
                }
            }
            if let Some(next) = index.next(handle) {
                if hits(index, next).is_some_and(|back| self.misordered(own, back)) {
                    index.move_after(handle, next);
                    continue;
                }
            }
            break;
        }
    }

    /// True when an entry with `front` hits may not precede one with `back` hits.
    fn misordered(self, front: u64, back: u64) -> bool {
        match self {
            Self::Lfu => front > back,
            Self::Mfu => front < back,
            _ => false,
        }
    }
}

impl fmt::Display for ReplacementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReplacementStrategy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| CacheError::UnknownStrategy(name.to_string()))
    }
}
