//! Game service
//!
//! Runs every session-affecting request as a load, transition, save cycle
//! against the injected `SessionStore`. Cycles for the same session id are
//! serialized by a per-session mutex; different sessions never contend.

use crate::common::traits::{Clock, SessionStore, SystemClock};
use crate::errors::{GameError, StoreError};
use crate::games::fairness::ServerSeed;
use crate::games::payout::PayoutScheduler;
use crate::games::session::{validate_position, GameRules};
use crate::games::types::{
    GameSession, GameSummary, PayoutEntry, SessionId, StartedGame, TileResult,
};
use crate::metrics::GameMetrics;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

/// One async mutex per session id with an active cycle.
///
/// Entries are removed as soon as the last holder or waiter lets go, so the
/// map only ever contains sessions that are currently being mutated.
#[derive(Default)]
pub struct SessionLocks {
    locks: DashMap<SessionId, Arc<Mutex<()>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, id: SessionId) -> SessionLockGuard<'_> {
        let handle = self.locks.entry(id).or_default().clone();
        // armed before the wait so a cancelled waiter still cleans up
        let release = LockRelease { locks: self, id };
        let guard = handle.lock_owned().await;
        SessionLockGuard {
            _guard: guard,
            _release: release,
        }
    }

    /// Sessions with a cycle in flight
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Held for the duration of one cycle. Fields drop in order: the mutex is
/// released before the map entry is considered for removal.
pub struct SessionLockGuard<'a> {
    _guard: OwnedMutexGuard<()>,
    _release: LockRelease<'a>,
}

struct LockRelease<'a> {
    locks: &'a SessionLocks,
    id: SessionId,
}

impl Drop for LockRelease<'_> {
    fn drop(&mut self) {
        self.locks
            .locks
            .remove_if(&self.id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

pub struct GameService {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    rules: GameRules,
    metrics: Arc<GameMetrics>,
    locks: SessionLocks,
    store_timeout: Duration,
}

impl GameService {
    pub fn new(store: Arc<dyn SessionStore>, rules: GameRules, metrics: Arc<GameMetrics>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            rules,
            metrics,
            locks: SessionLocks::new(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn metrics(&self) -> &Arc<GameMetrics> {
        &self.metrics
    }

    pub fn store_backend(&self) -> &'static str {
        self.store.backend_name()
    }

    pub fn active_locks(&self) -> usize {
        self.locks.len()
    }

    /// Create and persist a new session. Nothing is stored when validation fails.
    pub async fn start_game(&self, bet_amount: f64, mine_count: usize) -> Result<StartedGame, GameError> {
        self.observe(self.try_start(bet_amount, mine_count).await)
    }

    pub async fn reveal_tile(&self, id: SessionId, position: usize) -> Result<TileResult, GameError> {
        self.observe(self.try_reveal(id, position).await)
    }

    pub async fn cash_out(&self, id: SessionId) -> Result<GameSummary, GameError> {
        self.observe(self.try_cash_out(id).await)
    }

    /// Read-only projection; the field stays hidden while the game is open.
    pub async fn get_result(&self, id: SessionId) -> Result<GameSummary, GameError> {
        let result = self.load(id).await.map(|session| session.summary());
        self.observe(result)
    }

    /// Schedule a new game with `mine_count` mines would use
    pub fn payout_schedule(&self, mine_count: usize) -> Result<Vec<PayoutEntry>, GameError> {
        PayoutScheduler::for_board(mine_count, self.rules.house_edge)
    }

    async fn try_start(&self, bet_amount: f64, mine_count: usize) -> Result<StartedGame, GameError> {
        self.rules.validate_start(bet_amount, mine_count)?;

        let now = self.clock.now();
        let seed = ServerSeed::generate();
        let session = GameSession::start(SessionId::new(), bet_amount, mine_count, &seed, &self.rules, now)?;
        self.save(&session, session.remaining_ttl(now)).await?;

        info!(session_id = %session.id, mine_count, bet_amount, "Started mines game");
        self.metrics.record_start(bet_amount);
        Ok(session.started())
    }

    async fn try_reveal(&self, id: SessionId, position: usize) -> Result<TileResult, GameError> {
        validate_position(position)?;

        let _lock = self.locks.lock(id).await;
        let session = self.load(id).await?;
        let now = self.clock.now();
        let outcome = session.reveal(position, now)?;

        if !outcome.repeated {
            self.save(&outcome.session, outcome.session.remaining_ttl(now)).await?;
        }

        debug!(
            session_id = %id,
            position,
            is_mine = outcome.tile.is_mine,
            repeated = outcome.repeated,
            round = outcome.session.round,
            "Revealed tile"
        );
        self.metrics.record_reveal(outcome.tile.is_mine, outcome.repeated);
        Ok(outcome.tile)
    }

    async fn try_cash_out(&self, id: SessionId) -> Result<GameSummary, GameError> {
        let _lock = self.locks.lock(id).await;
        let session = self.load(id).await?;
        let now = self.clock.now();
        let finished = session.cash_out(now)?;
        self.save(&finished, finished.remaining_ttl(now)).await?;

        let winning_amount = finished.winning_amount.unwrap_or(0.0);
        info!(session_id = %id, round = finished.round, winning_amount, "Cashed out");
        self.metrics.record_cashout(winning_amount);
        Ok(finished.summary())
    }

    fn observe<T>(&self, result: Result<T, GameError>) -> Result<T, GameError> {
        result.inspect_err(|e| {
            if e.is_retryable() {
                warn!(code = e.code(), error = %e, "Session store failure");
            }
            self.metrics.record_failure(e.code());
        })
    }

    async fn load(&self, id: SessionId) -> Result<GameSession, GameError> {
        self.bounded(self.store.get(&id))
            .await?
            .ok_or(GameError::SessionNotFound(id))
    }

    async fn save(&self, session: &GameSession, ttl: Duration) -> Result<(), GameError> {
        self.bounded(self.store.set(session, ttl)).await
    }

    /// Apply the store timeout; an elapsed timer is a transient store failure
    async fn bounded<T, F>(&self, op: F) -> Result<T, GameError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.store_timeout, op).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::Timeout {
                timeout_ms: self.store_timeout.as_millis() as u64,
            }
            .into()),
        }
    }
}
