use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Number of cells on a Mines board (5x5)
pub const GRID_SIZE: usize = 25;

/// Opaque session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A single hidden cell
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Cell {
    #[serde(rename = "G")]
    Gem,
    #[serde(rename = "M")]
    Mine,
}

/// The 25-cell layout of one session. Immutable once generated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct MineField([Cell; GRID_SIZE]);

impl MineField {
    pub fn from_cells(cells: [Cell; GRID_SIZE]) -> Self {
        Self(cells)
    }

    pub fn cell(&self, position: usize) -> Option<Cell> {
        self.0.get(position).copied()
    }

    pub fn cells(&self) -> &[Cell; GRID_SIZE] {
        &self.0
    }

    pub fn mine_count(&self) -> usize {
        self.0.iter().filter(|c| **c == Cell::Mine).count()
    }

    /// Indices holding `kind`, ascending
    pub fn positions_of(&self, kind: Cell) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == kind)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Lifecycle of a session. Both terminal states are absorbing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Open,
    WonByCashout,
    LostToMine,
}

impl SessionStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, SessionStatus::Open)
    }
}

/// Payout multiplier for one round
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PayoutEntry {
    pub round: usize,
    pub multiplier: f64,
}

/// Commit-reveal material for the field of one session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FairnessRecord {
    /// Hex-encoded 32-byte seed the field was generated from
    pub server_seed: String,
    /// Hex-encoded SHA-256 of the seed bytes, published at start
    pub server_seed_hash: String,
}

/// The persisted game session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSession {
    pub id: SessionId,
    pub field: MineField,
    pub mine_count: usize,
    pub bet_amount: f64,
    pub payout_schedule: Vec<PayoutEntry>,
    /// Distinct revealed positions in reveal order
    pub revealed_positions: Vec<usize>,
    /// Index of the last safe reveal; -1 before the first one
    pub round: i32,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub current_multiplier: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub winning_amount: Option<f64>,
    pub fairness: FairnessRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl GameSession {
    /// Number of leading non-zero schedule entries
    pub fn safe_rounds(&self) -> usize {
        self.payout_schedule
            .iter()
            .take_while(|entry| entry.multiplier > 0.0)
            .count()
    }

    pub fn is_revealed(&self, position: usize) -> bool {
        self.revealed_positions.contains(&position)
    }
}

/// Returned by StartGame
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StartedGame {
    pub session_id: SessionId,
    pub mine_count: usize,
    pub bet_amount: f64,
    pub server_seed_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Returned by RevealTile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TileResult {
    pub position: usize,
    pub is_mine: bool,
    pub multiplier: f64,
    pub winning_amount: f64,
    pub status: SessionStatus,
    pub updated_at: DateTime<Utc>,
}

/// Public projection returned by CashOut and GetResult.
/// `field` and `server_seed` are only present once the game has ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSummary {
    pub session_id: SessionId,
    pub mine_count: usize,
    pub bet_amount: f64,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
    pub winning_amount: f64,
    pub revealed_positions: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<MineField>,
    pub server_seed_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_seed: Option<String>,
    pub updated_at: DateTime<Utc>,
}
