//! Payout multiplier schedule
//!
//! The schedule is a heuristic: each round divides a slowly growing base by the
//! probability of the next pick being safe, then scales by the house edge. It is
//! not the inverse of cumulative survival probability, so the realised house
//! edge depends on how many tiles a player reveals before cashing out. See
//! `games::simulation` for the numbers.

use crate::errors::GameError;
use crate::games::field::FieldGenerator;
use crate::games::types::{PayoutEntry, GRID_SIZE};

pub const DEFAULT_HOUSE_EDGE: f64 = 0.98;

/// Added to the base multiplier after every round
pub const BASE_STEP: f64 = 0.051;

pub struct PayoutScheduler;

impl PayoutScheduler {
    /// Schedule for the standard 25-cell board
    pub fn for_board(mine_count: usize, house_edge: f64) -> Result<Vec<PayoutEntry>, GameError> {
        Self::compute_schedule(GRID_SIZE, mine_count, house_edge)
    }

    /// One entry per round. Rounds `0..total_fields - mine_count` carry a
    /// positive multiplier, the remaining rounds carry zero.
    pub fn compute_schedule(
        total_fields: usize,
        mine_count: usize,
        house_edge: f64,
    ) -> Result<Vec<PayoutEntry>, GameError> {
        if total_fields == GRID_SIZE {
            FieldGenerator::validate_mine_count(mine_count)?;
        } else if mine_count == 0 || mine_count >= total_fields {
            return Err(GameError::InvalidMineCount { mine_count });
        }

        let mut schedule = Vec::with_capacity(total_fields);
        let mut safe_remaining = total_fields - mine_count;
        let mut base = 1.0_f64;

        for round in 0..total_fields {
            if safe_remaining == 0 {
                schedule.push(PayoutEntry { round, multiplier: 0.0 });
                continue;
            }

            let probability = safe_remaining as f64 / (total_fields - round) as f64;
            schedule.push(PayoutEntry {
                round,
                multiplier: round4(base / probability * house_edge),
            });

            safe_remaining -= 1;
            base += BASE_STEP;
        }

        Ok(schedule)
    }

    /// True when every board pays a positive, strictly increasing multiplier on
    /// each safe round. Very small edges round whole schedules down to zero.
    pub fn supports_house_edge(house_edge: f64) -> bool {
        (1..GRID_SIZE).all(|mine_count| {
            Self::for_board(mine_count, house_edge).is_ok_and(|schedule| {
                let safe = &schedule[..GRID_SIZE - mine_count];
                safe[0].multiplier > 0.0
                    && safe.windows(2).all(|pair| pair[1].multiplier > pair[0].multiplier)
            })
        })
    }
}

/// Round half away from zero to 4 decimal places
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_shape_for_every_mine_count() {
        for mine_count in 1..GRID_SIZE {
            let schedule = PayoutScheduler::for_board(mine_count, DEFAULT_HOUSE_EDGE).unwrap();
            let safe = GRID_SIZE - mine_count;

            assert_eq!(schedule.len(), GRID_SIZE);
            assert!(schedule[0].multiplier > 0.0);
            for pair in schedule[..safe].windows(2) {
                assert!(
                    pair[1].multiplier > pair[0].multiplier,
                    "mine_count={} not increasing at round {}",
                    mine_count,
                    pair[1].round
                );
            }
            assert!(schedule[safe..].iter().all(|e| e.multiplier == 0.0));
            assert!(schedule.iter().enumerate().all(|(i, e)| e.round == i));
        }
    }

    #[test]
    fn test_supported_house_edges() {
        assert!(PayoutScheduler::supports_house_edge(DEFAULT_HOUSE_EDGE));
        assert!(PayoutScheduler::supports_house_edge(1.0));
        // every multiplier rounds to 0.0
        assert!(!PayoutScheduler::supports_house_edge(1e-6));
        // increments vanish before the multipliers do
        assert!(!PayoutScheduler::supports_house_edge(0.001));
    }

    #[test]
    fn test_first_round_three_mines() {
        let schedule = PayoutScheduler::for_board(3, DEFAULT_HOUSE_EDGE).unwrap();
        // 1.0 / (22/25) * 0.98
        assert_eq!(schedule[0].multiplier, 1.1136);
        // (1.051) / (21/24) * 0.98
        assert_eq!(schedule[1].multiplier, 1.1771);
    }

    #[test]
    fn test_single_safe_cell() {
        let schedule = PayoutScheduler::for_board(24, DEFAULT_HOUSE_EDGE).unwrap();
        assert_eq!(schedule[0].multiplier, 24.5);
        assert!(schedule[1..].iter().all(|e| e.multiplier == 0.0));
    }

    #[test]
    fn test_degenerate_mine_counts_rejected() {
        for mine_count in [0, 25, 30] {
            assert_eq!(
                PayoutScheduler::for_board(mine_count, DEFAULT_HOUSE_EDGE),
                Err(GameError::InvalidMineCount { mine_count })
            );
        }
    }

    #[test]
    fn test_smaller_board() {
        let schedule = PayoutScheduler::compute_schedule(9, 2, 1.0).unwrap();
        assert_eq!(schedule.len(), 9);
        assert_eq!(schedule[0].multiplier, round4(9.0 / 7.0));
        assert_eq!(schedule[7].multiplier, 0.0);
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(1.113_636_36), 1.1136);
        assert_eq!(round4(1.234_56), 1.2346);
        assert_eq!(round4(0.0), 0.0);
    }
}
