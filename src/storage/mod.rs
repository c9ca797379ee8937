//! Session store backends
//!
//! `MemorySessionStore` keeps sessions in process memory and is the default.
//! `RocksSessionStore` persists them to RocksDB so games survive a restart.

pub mod memory;
pub mod rocks;

pub use memory::MemorySessionStore;
pub use rocks::RocksSessionStore;

use crate::common::traits::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Periodically purge expired sessions so abandoned games do not pile up.
pub fn spawn_expiry_sweeper(store: Arc<dyn SessionStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => debug!(backend = store.backend_name(), purged, "Purged expired sessions"),
                Err(e) => warn!(backend = store.backend_name(), error = %e, "Session sweep failed"),
            }
        }
    })
}
