//! Expiry Sweeper Task
//!
//! Background thread that periodically removes expired cache entries.

use std::hash::Hash;
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{select, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::cache::CacheStore;

struct Running {
    stop_tx: Sender<()>,
    thread: JoinHandle<()>,
}

// == Sweeper ==
/// Owner's handle on a running sweeper thread.
///
/// Stopping is idempotent and also happens on drop.
pub struct Sweeper {
    running: Mutex<Option<Running>>,
}

impl Sweeper {
    fn stopped() -> Self {
        Self {
            running: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    // == Stop ==
    /// Signals the sweeper thread and waits for it to exit.
    ///
    /// Returns false if it was already stopped.
    pub fn stop(&self) -> bool {
        let Some(running) = self.running.lock().take() else {
            return false;
        };

        // Disconnecting the channel wakes the thread's select.
        drop(running.stop_tx);
        if running.thread.join().is_err() {
            error!("Expiry sweeper thread panicked");
        }
        true
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawns a thread that removes expired entries every `interval`.
///
/// The thread only holds a weak reference to the store and exits on its
/// own once the store is dropped. If the thread cannot be spawned the
/// error is logged and the returned sweeper is already stopped.
pub fn spawn_sweeper<K, V>(store: &Arc<Mutex<CacheStore<K, V>>>, interval: Duration) -> Sweeper
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Send + 'static,
{
    let (stop_tx, stop_rx) = crossbeam_channel::bounded(0);
    let store = Arc::downgrade(store);

    let spawned = thread::Builder::new()
        .name("kache-sweeper".to_string())
        .spawn(move || run(store, interval, stop_rx));

    match spawned {
        Ok(thread) => Sweeper {
            running: Mutex::new(Some(Running { stop_tx, thread })),
        },
        Err(err) => {
            error!("Failed to start expiry sweeper: {}", err);
            Sweeper::stopped()
        }
    }
}

fn run<K, V>(store: Weak<Mutex<CacheStore<K, V>>>, interval: Duration, stop_rx: Receiver<()>)
where
    K: Hash + Eq + Clone,
{
    info!("Starting expiry sweeper with interval of {:?}", interval);
    let ticker = crossbeam_channel::tick(interval);

    loop {
        let keep_running = select! {
            recv(stop_rx) -> _ => false,
            recv(ticker) -> _ => sweep(&store),
        };
        if !keep_running {
            break;
        }
    }

    info!("Expiry sweeper stopped");
}

/// Runs one sweep. Returns false once the store is gone.
fn sweep<K, V>(store: &Weak<Mutex<CacheStore<K, V>>>) -> bool
where
    K: Hash + Eq + Clone,
{
    let Some(store) = store.upgrade() else {
        return false;
    };
    let (removed, remaining) = {
        let mut guard = store.lock();
        (guard.cleanup_expired(), guard.len())
    };

    if removed > 0 {
        info!(
            "Expiry sweep: removed {} expired entries, {} remain",
            removed, remaining
        );
    } else {
        debug!("Expiry sweep: no expired entries found");
    }
    true
}
