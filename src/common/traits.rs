//! Shared traits and interfaces
//!
//! The game service only sees these abstractions, so storage backends and the
//! time source can be swapped in tests.

use crate::errors::StoreError;
use crate::games::types::{GameSession, SessionId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Key-value persistence for game sessions with per-entry expiry
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a session. Expired entries are reported as absent.
    async fn get(&self, id: &SessionId) -> Result<Option<GameSession>, StoreError>;

    /// Insert or overwrite a session, expiring `ttl` from now
    async fn set(&self, session: &GameSession, ttl: Duration) -> Result<(), StoreError>;

    /// Drop every expired entry, returning how many were removed
    async fn purge_expired(&self) -> Result<usize, StoreError>;

    /// Backend name for logs and health output
    fn backend_name(&self) -> &'static str;
}

/// Time source for session timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
