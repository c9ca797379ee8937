//! Commit-reveal seeds for provably fair fields
//!
//! The field of a session is derived from a 32-byte server seed. The SHA-256 of
//! the seed is handed to the player when the game starts; the seed itself is
//! only disclosed after the game ends, so the player can regenerate the field
//! and check that it was fixed before the first reveal.

use crate::games::field::FieldGenerator;
use crate::games::types::{FairnessRecord, MineField};
use rand::{rngs::StdRng, SeedableRng};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const SEED_LEN: usize = 32;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FairnessError {
    #[error("Invalid server seed hex: {0}")]
    InvalidSeedHex(String),

    #[error("Server seed must be 32 bytes, got {0}")]
    InvalidSeedLength(usize),
}

#[derive(Clone, PartialEq, Eq)]
pub struct ServerSeed([u8; SEED_LEN]);

impl ServerSeed {
    /// Fresh seed from the operating system CSPRNG
    pub fn generate() -> Self {
        let mut bytes = [0u8; SEED_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(seed_hex: &str) -> Result<Self, FairnessError> {
        let bytes = hex::decode(seed_hex).map_err(|e| FairnessError::InvalidSeedHex(e.to_string()))?;
        let len = bytes.len();
        let array: [u8; SEED_LEN] = bytes
            .try_into()
            .map_err(|_| FairnessError::InvalidSeedLength(len))?;
        Ok(Self(array))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Hex SHA-256 of the raw seed bytes
    pub fn commitment(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0);
        hex::encode(hasher.finalize())
    }

    /// Deterministic generator used to place the mines
    pub fn rng(&self) -> StdRng {
        StdRng::from_seed(self.0)
    }

    pub fn record(&self) -> FairnessRecord {
        FairnessRecord {
            server_seed: self.to_hex(),
            server_seed_hash: self.commitment(),
        }
    }
}

impl std::fmt::Debug for ServerSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never log the seed of a live game
        write!(f, "ServerSeed({})", self.commitment())
    }
}

/// Outcome of checking a disclosed seed against a finished game
#[derive(Debug, Clone, PartialEq)]
pub struct FieldVerification {
    pub commitment_matches: bool,
    pub field_matches: bool,
    pub recomputed_field: Option<MineField>,
}

impl FieldVerification {
    pub fn is_valid(&self) -> bool {
        self.commitment_matches && self.field_matches
    }
}

/// Recompute commitment and field from a disclosed seed
pub fn verify_field(
    server_seed_hex: &str,
    server_seed_hash: &str,
    mine_count: usize,
    field: &MineField,
) -> Result<FieldVerification, FairnessError> {
    let seed = ServerSeed::from_hex(server_seed_hex)?;
    let commitment_matches = seed.commitment().eq_ignore_ascii_case(server_seed_hash);

    let recomputed_field = FieldGenerator::generate(mine_count, &mut seed.rng()).ok();
    let field_matches = recomputed_field.as_ref() == Some(field);

    Ok(FieldVerification {
        commitment_matches,
        field_matches,
        recomputed_field,
    })
}
