//! Kache - An embeddable in-memory key-value cache
//!
//! Provides bounded caching with pluggable replacement strategies
//! (FIFO, LIFO, LRU, MRU, LFU, MFU) and per-entry TTL expiration.

pub mod cache;
pub mod config;
pub mod error;
pub mod kache;
pub mod tasks;

pub use cache::{CacheStats, ReplacementStrategy};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use crate::kache::Kache;
