//! Cache Module
//!
//! Provides the eviction/expiry engine: an ordering index over cache
//! entries, replacement strategies that position entries in it, and the
//! store that ties them together with TTL expiration.

mod entry;
mod index;
mod policy;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use index::{Handle, OrderingIndex};
pub use policy::ReplacementStrategy;
pub use stats::CacheStats;
pub use store::CacheStore;
