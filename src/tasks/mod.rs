//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside a cache.
//!
//! # Tasks
//! - Expiry Sweeper: Removes TTL-expired cache entries at the configured poll interval

mod sweeper;

pub use sweeper::{spawn_sweeper, Sweeper};
