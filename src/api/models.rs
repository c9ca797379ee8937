//! API Request and Response Models
//!
//! Game results are served as the engine's own projections (`StartedGame`,
//! `TileResult`, `GameSummary`); this module holds the request bodies and the
//! responses specific to the HTTP surface.

use crate::games::types::{MineField, PayoutEntry};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
    pub version: String,
}

/// POST /api/mines/start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartGameRequest {
    pub bet_amount: f64,
    pub mine_count: usize,
}

/// POST /api/mines/:id/reveal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealTileRequest {
    pub position: usize,
}

/// GET /api/mines/schedule/:mine_count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub mine_count: usize,
    pub house_edge: f64,
    pub schedule: Vec<PayoutEntry>,
}

/// POST /api/mines/verify
///
/// Checks a finished game: the disclosed seed must hash to the commitment
/// handed out at start and must regenerate the same field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyFieldRequest {
    pub server_seed: String,
    pub server_seed_hash: String,
    pub mine_count: usize,
    pub field: MineField,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyFieldResponse {
    pub valid: bool,
    pub commitment_matches: bool,
    pub field_matches: bool,
}
