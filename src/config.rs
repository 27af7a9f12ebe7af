//! Configuration Module
//!
//! Handles cache construction options, with defaults, named setters and
//! loading from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::ReplacementStrategy;
use crate::error::{CacheError, Result};

/// Poll interval used when none (or zero) is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Cache configuration parameters.
///
/// A zero `max_record_threshold` or `clean_batch_size` disables
/// capacity-triggered eviction; TTL expiry still applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Policy deciding which entries are evicted first
    pub replacement_strategy: ReplacementStrategy,
    /// Record count at which a `set` triggers eviction
    pub max_record_threshold: usize,
    /// Number of entries removed per eviction event
    pub clean_batch_size: usize,
    /// Interval between expiry sweeps
    pub poll_interval: Duration,
}

impl CacheConfig {
    /// Creates a configuration with every option at its default.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replacement_strategy(mut self, strategy: ReplacementStrategy) -> Self {
        self.replacement_strategy = strategy;
        self
    }

    pub fn with_max_record_threshold(mut self, max_records: usize) -> Self {
        self.max_record_threshold = max_records;
        self
    }

    pub fn with_clean_batch_size(mut self, batch: usize) -> Self {
        self.clean_batch_size = batch;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the strategy together with its eviction threshold and batch size.
    pub fn with_clean_strategy(
        self,
        strategy: ReplacementStrategy,
        max_records: usize,
        batch: usize,
    ) -> Self {
        self.with_replacement_strategy(strategy)
            .with_max_record_threshold(max_records)
            .with_clean_batch_size(batch)
    }

    /// Poll interval with a zero value replaced by [`DEFAULT_POLL_INTERVAL`].
    pub fn effective_poll_interval(&self) -> Duration {
        if self.poll_interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            self.poll_interval
        }
    }

    /// Returns true when capacity-triggered eviction can ever fire.
    pub fn eviction_enabled(&self) -> bool {
        self.max_record_threshold > 0
            && self.clean_batch_size > 0
            && self.replacement_strategy.evicts()
    }

    /// Loads configuration from environment variables, rejecting malformed values.
    ///
    /// # Environment Variables
    /// - `KACHE_STRATEGY` - Replacement strategy name (default: none)
    /// - `KACHE_MAX_RECORDS` - Eviction threshold (default: 0, disabled)
    /// - `KACHE_CLEAN_BATCH` - Entries removed per eviction (default: 0, disabled)
    /// - `KACHE_POLL_INTERVAL_MS` - Sweep interval in milliseconds (default: 1000)
    pub fn try_from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = read_var("KACHE_STRATEGY") {
            config.replacement_strategy = raw.parse()?;
        }
        if let Some(max) = parse_var::<usize>("KACHE_MAX_RECORDS")? {
            config.max_record_threshold = max;
        }
        if let Some(batch) = parse_var::<usize>("KACHE_CLEAN_BATCH")? {
            config.clean_batch_size = batch;
        }
        if let Some(ms) = parse_var::<u64>("KACHE_POLL_INTERVAL_MS")? {
            config.poll_interval = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Loads configuration from environment variables, falling back to
    /// defaults when anything is malformed.
    pub fn from_env() -> Self {
        Self::try_from_env().unwrap_or_else(|err| {
            warn!("Ignoring cache environment configuration: {}", err);
            Self::default()
        })
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            replacement_strategy: ReplacementStrategy::None,
            max_record_threshold: 0,
            clean_batch_size: 0,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

fn read_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>> {
    match read_var(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CacheError::InvalidConfig {
                key: key.to_string(),
                value: raw,
            }),
    }
}
