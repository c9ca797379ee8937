use crate::errors::GameError;
use crate::games::types::{Cell, MineField, GRID_SIZE};
use rand::seq::index;
use rand::Rng;

/// Places mines on a fresh board
pub struct FieldGenerator;

impl FieldGenerator {
    /// Reject mine counts that leave no safe cell or no mine
    pub fn validate_mine_count(mine_count: usize) -> Result<(), GameError> {
        if mine_count == 0 || mine_count >= GRID_SIZE {
            return Err(GameError::InvalidMineCount { mine_count });
        }
        Ok(())
    }

    /// Generate a board with exactly `mine_count` mines at distinct positions
    /// sampled uniformly without replacement.
    pub fn generate<R: Rng + ?Sized>(mine_count: usize, rng: &mut R) -> Result<MineField, GameError> {
        Self::validate_mine_count(mine_count)?;

        let mut cells = [Cell::Gem; GRID_SIZE];
        for position in index::sample(rng, GRID_SIZE, mine_count) {
            cells[position] = Cell::Mine;
        }

        Ok(MineField::from_cells(cells))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_exact_mine_count_for_every_valid_count() {
        let mut rng = StdRng::seed_from_u64(7);
        for mine_count in 1..GRID_SIZE {
            let field = FieldGenerator::generate(mine_count, &mut rng).unwrap();
            assert_eq!(field.mine_count(), mine_count);
            assert_eq!(field.positions_of(Cell::Gem).len(), GRID_SIZE - mine_count);
        }
    }

    #[test]
    fn test_boundary_mine_counts_rejected() {
        let mut rng = StdRng::seed_from_u64(7);
        for mine_count in [0, 25, 26] {
            assert_eq!(
                FieldGenerator::generate(mine_count, &mut rng),
                Err(GameError::InvalidMineCount { mine_count })
            );
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = FieldGenerator::generate(5, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = FieldGenerator::generate(5, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_cell_can_hold_a_mine() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut hits = [0usize; GRID_SIZE];
        for _ in 0..2_000 {
            let field = FieldGenerator::generate(3, &mut rng).unwrap();
            for position in field.positions_of(Cell::Mine) {
                hits[position] += 1;
            }
        }

        // 6000 mines over 25 cells, 240 expected per cell
        assert!(hits.iter().all(|&h| h > 150 && h < 330), "skewed placement: {:?}", hits);
    }
}
