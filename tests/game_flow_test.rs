//! End-to-end game flows through `GameService` over the in-memory store

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use mines::common::traits::{Clock, SessionStore};
use mines::errors::GameError;
use mines::games::fairness::verify_field;
use mines::games::{Cell, GameRules, GameService, GameSession, SessionId, SessionStatus};
use mines::metrics::GameMetrics;
use mines::storage::MemorySessionStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Clock that only moves when told to
struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    fn new(start: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(start) }
    }

    fn advance(&self, secs: i64) {
        let mut now = self.now.lock().unwrap();
        *now += ChronoDuration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

struct Harness {
    service: Arc<GameService>,
    store: Arc<MemorySessionStore>,
    clock: Arc<ManualClock>,
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn harness_with(rules: GameRules) -> Harness {
    let store = Arc::new(MemorySessionStore::new());
    let clock = Arc::new(ManualClock::new(t0()));
    let service = GameService::new(store.clone(), rules, Arc::new(GameMetrics::new().unwrap()))
        .with_clock(clock.clone());

    Harness {
        service: Arc::new(service),
        store,
        clock,
    }
}

fn harness() -> Harness {
    harness_with(GameRules::default())
}

impl Harness {
    async fn session(&self, id: SessionId) -> GameSession {
        self.store.get(&id).await.unwrap().expect("session stored")
    }

    async fn start(&self, bet_amount: f64, mine_count: usize) -> GameSession {
        let started = self.service.start_game(bet_amount, mine_count).await.unwrap();
        self.session(started.session_id).await
    }
}

#[tokio::test]
async fn scenario_a_start_game_builds_board_and_schedule() {
    let h = harness();
    let started = h.service.start_game(100.0, 3).await.unwrap();
    let session = h.session(started.session_id).await;

    assert_eq!(started.mine_count, 3);
    assert_eq!(started.bet_amount, 100.0);
    assert_eq!(started.created_at, t0());
    assert_eq!(started.expires_at, t0() + ChronoDuration::hours(24));

    assert_eq!(session.field.cells().len(), 25);
    assert_eq!(session.field.mine_count(), 3);
    assert_eq!(session.round, -1);
    assert_eq!(session.status, SessionStatus::Open);
    assert!(session.revealed_positions.is_empty());

    let schedule = &session.payout_schedule;
    assert_eq!(schedule.len(), 25);
    assert!(schedule[..22].windows(2).all(|w| w[1].multiplier > w[0].multiplier));
    assert!(schedule[..22].iter().all(|e| e.multiplier > 0.0));
    assert!(schedule[22..].iter().all(|e| e.multiplier == 0.0));
}

#[tokio::test]
async fn scenario_b_first_gem_pays_first_multiplier() {
    let h = harness();
    let session = h.start(100.0, 3).await;
    let gem = session.field.positions_of(Cell::Gem)[0];

    h.clock.advance(5);
    let tile = h.service.reveal_tile(session.id, gem).await.unwrap();

    assert!(!tile.is_mine);
    assert_eq!(tile.multiplier, 1.1136);
    assert_eq!(tile.multiplier, session.payout_schedule[0].multiplier);
    assert_eq!(tile.winning_amount, 100.0 * 1.1136);
    assert_eq!(tile.status, SessionStatus::Open);
    assert_eq!(tile.updated_at, t0() + ChronoDuration::seconds(5));
}

#[tokio::test]
async fn scenario_c_mine_ends_the_game() {
    let h = harness();
    let session = h.start(100.0, 3).await;
    let mine = session.field.positions_of(Cell::Mine)[0];

    let tile = h.service.reveal_tile(session.id, mine).await.unwrap();
    assert!(tile.is_mine);
    assert_eq!(tile.multiplier, 0.0);
    assert_eq!(tile.winning_amount, 0.0);
    assert_eq!(tile.status, SessionStatus::LostToMine);

    let gem = session.field.positions_of(Cell::Gem)[0];
    assert_eq!(
        h.service.reveal_tile(session.id, gem).await,
        Err(GameError::SessionAlreadyOver(session.id))
    );
    assert_eq!(
        h.service.cash_out(session.id).await,
        Err(GameError::SessionAlreadyOver(session.id))
    );

    let summary = h.service.get_result(session.id).await.unwrap();
    assert_eq!(summary.status, SessionStatus::LostToMine);
    assert_eq!(summary.field, Some(session.field));
}

#[tokio::test]
async fn scenario_d_cash_out_after_two_gems() {
    let h = harness();
    let session = h.start(100.0, 3).await;
    let gems = session.field.positions_of(Cell::Gem);

    h.service.reveal_tile(session.id, gems[0]).await.unwrap();
    h.service.reveal_tile(session.id, gems[1]).await.unwrap();
    h.clock.advance(30);
    let summary = h.service.cash_out(session.id).await.unwrap();

    assert_eq!(summary.status, SessionStatus::WonByCashout);
    assert_eq!(summary.multiplier, Some(session.payout_schedule[1].multiplier));
    assert_eq!(summary.winning_amount, 100.0 * session.payout_schedule[1].multiplier);
    assert_eq!(summary.field, Some(session.field));
    assert_eq!(summary.revealed_positions, vec![gems[0], gems[1]]);
    assert_eq!(summary.updated_at, t0() + ChronoDuration::seconds(30));

    // the disclosed seed proves the field was fixed at start
    let seed = summary.server_seed.clone().expect("seed disclosed after the game");
    assert_eq!(summary.server_seed_hash, session.fairness.server_seed_hash);
    let report = verify_field(&seed, &summary.server_seed_hash, 3, &session.field).unwrap();
    assert!(report.is_valid());

    let stored = h.session(session.id).await;
    assert_eq!(stored.status, SessionStatus::WonByCashout);
}

#[tokio::test]
async fn scenario_e_unknown_and_finished_sessions() {
    let h = harness();
    let unknown = SessionId::new();
    assert_eq!(
        h.service.reveal_tile(unknown, 0).await,
        Err(GameError::SessionNotFound(unknown))
    );
    assert_eq!(h.service.cash_out(unknown).await, Err(GameError::SessionNotFound(unknown)));
    assert_eq!(h.service.get_result(unknown).await, Err(GameError::SessionNotFound(unknown)));

    let session = h.start(1.0, 5).await;
    let gem = session.field.positions_of(Cell::Gem)[0];
    h.service.reveal_tile(session.id, gem).await.unwrap();
    h.service.cash_out(session.id).await.unwrap();

    assert_eq!(
        h.service.reveal_tile(session.id, gem).await,
        Err(GameError::SessionAlreadyOver(session.id))
    );
    assert_eq!(
        h.service.cash_out(session.id).await,
        Err(GameError::SessionAlreadyOver(session.id))
    );
}

#[tokio::test]
async fn repeated_reveal_is_idempotent() {
    let h = harness();
    let session = h.start(10.0, 3).await;
    let gem = session.field.positions_of(Cell::Gem)[0];

    let first = h.service.reveal_tile(session.id, gem).await.unwrap();
    h.clock.advance(10);
    let second = h.service.reveal_tile(session.id, gem).await.unwrap();

    assert_eq!(first, second);
    let stored = h.session(session.id).await;
    assert_eq!(stored.round, 0);
    assert_eq!(stored.revealed_positions, vec![gem]);
}

#[tokio::test]
async fn cash_out_requires_a_safe_reveal() {
    let h = harness();
    let session = h.start(10.0, 3).await;

    assert_eq!(
        h.service.cash_out(session.id).await,
        Err(GameError::NothingToCashOut(session.id))
    );
    // still playable
    assert_eq!(h.session(session.id).await.status, SessionStatus::Open);
}

#[tokio::test]
async fn result_hides_field_while_open() {
    let h = harness();
    let session = h.start(10.0, 3).await;

    let summary = h.service.get_result(session.id).await.unwrap();
    assert_eq!(summary.status, SessionStatus::Open);
    assert_eq!(summary.multiplier, None);
    assert_eq!(summary.winning_amount, 0.0);
    assert!(summary.field.is_none());
    assert!(summary.server_seed.is_none());
}

#[tokio::test]
async fn clearing_the_board_keeps_the_session_open() {
    let h = harness();
    let session = h.start(2.0, 24).await;
    let gem = session.field.positions_of(Cell::Gem)[0];

    let tile = h.service.reveal_tile(session.id, gem).await.unwrap();
    assert_eq!(tile.multiplier, 24.5);
    assert_eq!(tile.status, SessionStatus::Open);

    let summary = h.service.cash_out(session.id).await.unwrap();
    assert_eq!(summary.winning_amount, 49.0);
}

#[tokio::test]
async fn invalid_input_is_rejected() {
    let h = harness();
    for mine_count in [0, 25] {
        assert_eq!(
            h.service.start_game(1.0, mine_count).await,
            Err(GameError::InvalidMineCount { mine_count })
        );
    }
    assert!(matches!(
        h.service.start_game(0.05, 3).await,
        Err(GameError::InvalidBetAmount { .. })
    ));
    assert!(matches!(
        h.service.start_game(f64::NAN, 3).await,
        Err(GameError::InvalidBetAmount { .. })
    ));

    let session = h.start(1.0, 3).await;
    assert_eq!(
        h.service.reveal_tile(session.id, 25).await,
        Err(GameError::PositionOutOfRange { position: 25 })
    );
    assert!(h.store.len() == 1);
}

#[tokio::test(start_paused = true)]
async fn sessions_expire_after_ttl() {
    let rules = GameRules {
        session_ttl: ChronoDuration::seconds(60),
        ..GameRules::default()
    };
    let h = harness_with(rules);
    let session = h.start(1.0, 3).await;

    tokio::time::advance(Duration::from_secs(59)).await;
    assert!(h.service.get_result(session.id).await.is_ok());

    tokio::time::advance(Duration::from_secs(2)).await;
    assert_eq!(
        h.service.get_result(session.id).await,
        Err(GameError::SessionNotFound(session.id))
    );
}

#[tokio::test(start_paused = true)]
async fn saving_does_not_extend_session_life() {
    let rules = GameRules {
        session_ttl: ChronoDuration::seconds(60),
        ..GameRules::default()
    };
    let h = harness_with(rules);
    let session = h.start(1.0, 3).await;
    let gem = session.field.positions_of(Cell::Gem)[0];

    h.clock.advance(50);
    tokio::time::advance(Duration::from_secs(50)).await;
    h.service.reveal_tile(session.id, gem).await.unwrap();

    tokio::time::advance(Duration::from_secs(11)).await;
    assert_eq!(
        h.service.get_result(session.id).await,
        Err(GameError::SessionNotFound(session.id))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reveals_advance_round_once_per_position() {
    let h = harness();
    let session = h.start(1.0, 3).await;
    let gems: Vec<usize> = session.field.positions_of(Cell::Gem).into_iter().take(10).collect();

    // every position requested twice, interleaved
    let tasks = gems.iter().chain(gems.iter()).map(|&position| {
        let service = h.service.clone();
        let id = session.id;
        tokio::spawn(async move { service.reveal_tile(id, position).await })
    });

    for result in futures::future::join_all(tasks).await {
        let tile = result.unwrap().unwrap();
        assert!(!tile.is_mine);
    }

    let stored = h.session(session.id).await;
    assert_eq!(stored.round, 9);
    assert_eq!(stored.revealed_positions.len(), 10);
    let mut distinct = stored.revealed_positions.clone();
    distinct.sort_unstable();
    distinct.dedup();
    assert_eq!(distinct.len(), 10);
    assert_eq!(stored.current_multiplier, Some(session.payout_schedule[9].multiplier));
    assert_eq!(h.service.active_locks(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn independent_sessions_run_in_parallel() {
    let h = harness();
    let mut handles = Vec::new();
    for _ in 0..16 {
        let service = h.service.clone();
        let store = h.store.clone();
        handles.push(tokio::spawn(async move {
            let started = service.start_game(1.0, 5).await.unwrap();
            let session = store.get(&started.session_id).await.unwrap().unwrap();
            for gem in session.field.positions_of(Cell::Gem).into_iter().take(3) {
                service.reveal_tile(session.id, gem).await.unwrap();
            }
            service.cash_out(session.id).await.unwrap()
        }));
    }

    for summary in futures::future::join_all(handles).await {
        let summary = summary.unwrap();
        assert_eq!(summary.status, SessionStatus::WonByCashout);
        assert_eq!(summary.revealed_positions.len(), 3);
    }
    assert_eq!(h.service.metrics().cashouts(), 16);
}
