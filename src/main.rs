//! Kache demo
//!
//! Drives a cache the way an embedding application would and prints the
//! resulting statistics as JSON.

use std::thread::sleep;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kache::{CacheConfig, Kache, ReplacementStrategy};

/// Entry point for the demo.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Store, read and delete a few entries
/// 4. Let a TTL entry expire through the background sweeper
/// 5. Print statistics and close the cache
fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = CacheConfig::try_from_env()?;
    if !config.eviction_enabled() {
        config = config.with_clean_strategy(ReplacementStrategy::Lru, 10_000, 1_000);
    }
    info!(
        "Configuration loaded: strategy={}, max_records={}, clean_batch={}, poll_interval={:?}",
        config.replacement_strategy,
        config.max_record_threshold,
        config.clean_batch_size,
        config.effective_poll_interval()
    );

    let cache: Kache<String, String> = Kache::new(config);

    cache.set("get_user_response/user_id:1".to_string(), "user1".to_string());
    cache.set_with_ttl(
        "user_token:1".to_string(),
        "token1".to_string(),
        Duration::from_millis(500),
    );
    info!("count: {}", cache.count());
    info!("keys: {:?}", cache.keys());

    if let Some(user) = cache.get("get_user_response/user_id:1") {
        info!("cached user: {}", user);
    }

    sleep(config.effective_poll_interval() + Duration::from_millis(500));
    info!("after expiry, keys: {:?}", cache.keys());

    cache.delete("get_user_response/user_id:1");
    cache.flush();
    info!("count after flush: {}", cache.count());

    println!("{}", serde_json::to_string_pretty(&cache.stats())?);

    cache.close();
    Ok(())
}
