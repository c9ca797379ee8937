//! House-edge analysis for the payout schedule
//!
//! Plays the "reveal n tiles, then cash out" strategy both analytically and by
//! Monte Carlo through the real session transitions.

use crate::errors::GameError;
use crate::games::fairness::ServerSeed;
use crate::games::field::FieldGenerator;
use crate::games::payout::PayoutScheduler;
use crate::games::session::GameRules;
use crate::games::types::{GameSession, PayoutEntry, SessionId, SessionStatus, GRID_SIZE};
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Probability of surviving `reveals` picks on a board with `mine_count` mines
pub fn survival_probability(mine_count: usize, reveals: usize) -> f64 {
    let safe = GRID_SIZE.saturating_sub(mine_count);
    if reveals > safe {
        return 0.0;
    }
    (0..reveals)
        .map(|i| (safe - i) as f64 / (GRID_SIZE - i) as f64)
        .product()
}

/// Return to player of cashing out after exactly `reveals` safe picks
pub fn expected_return(schedule: &[PayoutEntry], mine_count: usize, reveals: usize) -> f64 {
    if reveals == 0 {
        return 1.0;
    }
    schedule
        .get(reveals - 1)
        .map(|entry| survival_probability(mine_count, reveals) * entry.multiplier)
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationReport {
    pub mine_count: usize,
    pub target_reveals: usize,
    pub games: u64,
    pub wins: u64,
    pub losses: u64,
    pub total_wagered: f64,
    pub total_paid_out: f64,
    pub rtp: f64,
    pub house_profit_per_game: f64,
}

/// Play `games` sessions with a unit bet, revealing random unrevealed cells
/// until `target_reveals` gems are found or a mine ends the game.
pub fn simulate<R: Rng + ?Sized>(
    mine_count: usize,
    house_edge: f64,
    target_reveals: usize,
    games: u64,
    rng: &mut R,
) -> Result<SimulationReport, GameError> {
    FieldGenerator::validate_mine_count(mine_count)?;
    let safe = GRID_SIZE - mine_count;
    let target_reveals = target_reveals.clamp(1, safe);

    let rules = GameRules {
        minimum_bet: 0.0,
        house_edge,
        ..GameRules::default()
    };
    let bet = 1.0;
    let now = Utc::now();

    let mut wins = 0u64;
    let mut total_paid_out = 0.0;
    let mut order: Vec<usize> = (0..GRID_SIZE).collect();

    for _ in 0..games {
        let mut seed = [0u8; 32];
        rng.fill(&mut seed);
        let mut session = GameSession::start(
            SessionId::new(),
            bet,
            mine_count,
            &ServerSeed::from_bytes(seed),
            &rules,
            now,
        )?;

        order.shuffle(rng);
        let mut found = 0;
        for &position in order.iter() {
            session = session.reveal(position, now)?.session;
            if session.status == SessionStatus::LostToMine {
                break;
            }
            found += 1;
            if found == target_reveals {
                break;
            }
        }

        if session.status.is_open() {
            session = session.cash_out(now)?;
            wins += 1;
            total_paid_out += session.winning_amount.unwrap_or(0.0);
        }
    }

    let total_wagered = games as f64 * bet;
    let rtp = if games == 0 { 0.0 } else { total_paid_out / total_wagered };

    Ok(SimulationReport {
        mine_count,
        target_reveals,
        games,
        wins,
        losses: games - wins,
        total_wagered,
        total_paid_out,
        rtp,
        house_profit_per_game: if games == 0 {
            0.0
        } else {
            (total_wagered - total_paid_out) / games as f64
        },
    })
}

/// Analytic RTP for every cash-out point of one mine count
pub fn rtp_table(mine_count: usize, house_edge: f64) -> Result<Vec<(usize, f64)>, GameError> {
    let schedule = PayoutScheduler::for_board(mine_count, house_edge)?;
    Ok((1..=GRID_SIZE - mine_count)
        .map(|reveals| (reveals, expected_return(&schedule, mine_count, reveals)))
        .collect())
}
