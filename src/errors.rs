//! Error types for the Mines game engine
//!
//! `GameError` is the taxonomy every game operation reports to its caller.
//! Store and configuration failures have their own enums and are folded into
//! `MinesError` at the edges of the system (factory, loader, binaries).

use crate::games::types::SessionId;
use thiserror::Error;

/// Failures reported by game operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GameError {
    #[error("Invalid mine count {mine_count}: must be between 1 and 24")]
    InvalidMineCount { mine_count: usize },

    #[error("Invalid bet amount {bet_amount}: minimum bet is {minimum}")]
    InvalidBetAmount { bet_amount: f64, minimum: f64 },

    #[error("Game session {0} not found")]
    SessionNotFound(SessionId),

    #[error("Game session {0} is already over")]
    SessionAlreadyOver(SessionId),

    #[error("Position {position} is outside the board (0..25)")]
    PositionOutOfRange { position: usize },

    #[error("Round {round} has no payout entry ({safe_rounds} safe rounds available)")]
    RoundIndexExhausted { round: i32, safe_rounds: usize },

    #[error("Nothing to cash out for session {0}: reveal at least one gem first")]
    NothingToCashOut(SessionId),

    #[error("Session store unavailable: {0}")]
    StoreUnavailable(String),
}

impl GameError {
    /// Stable machine-readable code for transport layers.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::InvalidMineCount { .. } => "INVALID_MINE_COUNT",
            GameError::InvalidBetAmount { .. } => "INVALID_BET_AMOUNT",
            GameError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            GameError::SessionAlreadyOver(_) => "SESSION_ALREADY_OVER",
            GameError::PositionOutOfRange { .. } => "POSITION_OUT_OF_RANGE",
            GameError::RoundIndexExhausted { .. } => "ROUND_INDEX_EXHAUSTED",
            GameError::NothingToCashOut(_) => "NOTHING_TO_CASH_OUT",
            GameError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    /// Only transient store failures may be retried by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GameError::StoreUnavailable(_))
    }

    /// Input was rejected before any session state was consulted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GameError::InvalidMineCount { .. }
                | GameError::InvalidBetAmount { .. }
                | GameError::PositionOutOfRange { .. }
        )
    }
}

/// Failures of the session store collaborator
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupted session record: {0}")]
    Corrupted(String),

    #[error("Store operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl From<StoreError> for GameError {
    fn from(e: StoreError) -> Self {
        GameError::StoreUnavailable(e.to_string())
    }
}

impl From<rocksdb::Error> for StoreError {
    fn from(e: rocksdb::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Configuration and validation errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

/// Root error type for service assembly and binaries
#[derive(Debug, Error)]
pub enum MinesError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

// Convenience type alias for Results
pub type MinesResult<T> = Result<T, MinesError>;
