//! In-process session store backed by `DashMap`

use crate::common::traits::SessionStore;
use crate::errors::StoreError;
use crate::games::types::{GameSession, SessionId};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

struct StoredSession {
    session: GameSession,
    deadline: Instant,
}

/// Lock-free session map with per-entry deadlines.
///
/// Expired entries are dropped lazily on read and in bulk by `purge_expired`.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<SessionId, StoredSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries currently held, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, id: &SessionId) -> Result<Option<GameSession>, StoreError> {
        let now = Instant::now();
        match self.sessions.get(id) {
            None => return Ok(None),
            Some(entry) if entry.deadline > now => return Ok(Some(entry.session.clone())),
            Some(_) => {}
        }

        // the read guard is gone; re-check so a concurrent refresh survives
        self.sessions.remove_if(id, |_, entry| entry.deadline <= now);
        Ok(None)
    }

    async fn set(&self, session: &GameSession, ttl: Duration) -> Result<(), StoreError> {
        self.sessions.insert(
            session.id,
            StoredSession {
                session: session.clone(),
                deadline: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.deadline > now);
        Ok(before.saturating_sub(self.sessions.len()))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
