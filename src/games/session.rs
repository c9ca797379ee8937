//! Session state machine
//!
//! Transitions are pure: they borrow the current session and return a new
//! value (or a `GameError`), leaving persistence to the caller.
//!
//! ```text
//! Open --reveal(mine)--> LostToMine
//! Open --cash_out------> WonByCashout
//! Open --reveal(gem)---> Open (round + 1)
//! ```

use crate::errors::GameError;
use crate::games::fairness::ServerSeed;
use crate::games::field::FieldGenerator;
use crate::games::payout::{PayoutScheduler, DEFAULT_HOUSE_EDGE};
use crate::games::types::{
    Cell, GameSession, GameSummary, SessionId, SessionStatus, StartedGame, TileResult, GRID_SIZE,
};
use chrono::{DateTime, Duration, Utc};

/// Economic and lifetime parameters applied to new sessions
#[derive(Debug, Clone, PartialEq)]
pub struct GameRules {
    pub minimum_bet: f64,
    pub house_edge: f64,
    pub session_ttl: Duration,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            minimum_bet: 0.1,
            house_edge: DEFAULT_HOUSE_EDGE,
            session_ttl: Duration::hours(24),
        }
    }
}

impl GameRules {
    pub fn validate_bet(&self, bet_amount: f64) -> Result<(), GameError> {
        if !bet_amount.is_finite() || bet_amount < self.minimum_bet {
            return Err(GameError::InvalidBetAmount {
                bet_amount,
                minimum: self.minimum_bet,
            });
        }
        Ok(())
    }

    /// Input checks for StartGame; no randomness is consumed on failure
    pub fn validate_start(&self, bet_amount: f64, mine_count: usize) -> Result<(), GameError> {
        self.validate_bet(bet_amount)?;
        FieldGenerator::validate_mine_count(mine_count)
    }
}

pub fn validate_position(position: usize) -> Result<(), GameError> {
    if position >= GRID_SIZE {
        return Err(GameError::PositionOutOfRange { position });
    }
    Ok(())
}

/// Result of a reveal transition
#[derive(Debug, Clone, PartialEq)]
pub struct RevealOutcome {
    pub session: GameSession,
    pub tile: TileResult,
    /// The position had already been revealed; `session` is unchanged
    pub repeated: bool,
}

impl GameSession {
    /// Build a new open session whose field is derived from `seed`
    pub fn start(
        id: SessionId,
        bet_amount: f64,
        mine_count: usize,
        seed: &ServerSeed,
        rules: &GameRules,
        now: DateTime<Utc>,
    ) -> Result<Self, GameError> {
        rules.validate_start(bet_amount, mine_count)?;

        let field = FieldGenerator::generate(mine_count, &mut seed.rng())?;
        let payout_schedule = PayoutScheduler::for_board(mine_count, rules.house_edge)?;

        Ok(Self {
            id,
            field,
            mine_count,
            bet_amount,
            payout_schedule,
            revealed_positions: Vec::new(),
            round: -1,
            status: SessionStatus::Open,
            current_multiplier: None,
            winning_amount: None,
            fairness: seed.record(),
            created_at: now,
            updated_at: now,
            expires_at: now + rules.session_ttl,
        })
    }

    pub fn reveal(&self, position: usize, now: DateTime<Utc>) -> Result<RevealOutcome, GameError> {
        validate_position(position)?;
        if !self.status.is_open() {
            return Err(GameError::SessionAlreadyOver(self.id));
        }

        if self.is_revealed(position) {
            return Ok(RevealOutcome {
                tile: self.tile_result(position),
                session: self.clone(),
                repeated: true,
            });
        }

        let mut next = self.clone();
        next.revealed_positions.push(position);
        next.round += 1;
        next.updated_at = now;

        match self.field.cell(position) {
            Some(Cell::Mine) => {
                next.status = SessionStatus::LostToMine;
                next.current_multiplier = Some(0.0);
                next.winning_amount = Some(0.0);
            }
            _ => {
                let safe_rounds = self.safe_rounds();
                let multiplier = usize::try_from(next.round)
                    .ok()
                    .filter(|round| *round < safe_rounds)
                    .map(|round| self.payout_schedule[round].multiplier)
                    .ok_or(GameError::RoundIndexExhausted {
                        round: next.round,
                        safe_rounds,
                    })?;

                next.current_multiplier = Some(multiplier);
                next.winning_amount = Some(self.bet_amount * multiplier);
            }
        }

        Ok(RevealOutcome {
            tile: next.tile_result(position),
            session: next,
            repeated: false,
        })
    }

    /// Lock in the current multiplier
    pub fn cash_out(&self, now: DateTime<Utc>) -> Result<GameSession, GameError> {
        if !self.status.is_open() {
            return Err(GameError::SessionAlreadyOver(self.id));
        }
        if self.round < 0 || self.current_multiplier.is_none() {
            return Err(GameError::NothingToCashOut(self.id));
        }

        let mut next = self.clone();
        next.status = SessionStatus::WonByCashout;
        next.updated_at = now;
        Ok(next)
    }

    pub fn tile_result(&self, position: usize) -> TileResult {
        TileResult {
            position,
            is_mine: self.field.cell(position) == Some(Cell::Mine),
            multiplier: self.current_multiplier.unwrap_or(0.0),
            winning_amount: self.winning_amount.unwrap_or(0.0),
            status: self.status,
            updated_at: self.updated_at,
        }
    }

    /// Public projection; the field and seed stay hidden while the game is live
    pub fn summary(&self) -> GameSummary {
        let finished = !self.status.is_open();
        GameSummary {
            session_id: self.id,
            mine_count: self.mine_count,
            bet_amount: self.bet_amount,
            status: self.status,
            multiplier: self.current_multiplier,
            winning_amount: self.winning_amount.unwrap_or(0.0),
            revealed_positions: self.revealed_positions.clone(),
            field: finished.then_some(self.field),
            server_seed_hash: self.fairness.server_seed_hash.clone(),
            server_seed: finished.then(|| self.fairness.server_seed.clone()),
            updated_at: self.updated_at,
        }
    }

    pub fn started(&self) -> StartedGame {
        StartedGame {
            session_id: self.id,
            mine_count: self.mine_count,
            bet_amount: self.bet_amount,
            server_seed_hash: self.fairness.server_seed_hash.clone(),
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }

    /// Time left before the store may discard this session
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.expires_at - now).to_std().unwrap_or_default()
    }
}
