//! Route Definitions
//!
//! Maps URLs to handlers with type-safe routing.

use super::handlers::*;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        // Game lifecycle
        .route("/api/mines/start", post(start_game_handler))
        .route("/api/mines/:id", get(game_result_handler))
        .route("/api/mines/:id/reveal", post(reveal_tile_handler))
        .route("/api/mines/:id/cashout", post(cash_out_handler))
        // Public fairness tooling
        .route("/api/mines/schedule/:mine_count", get(payout_schedule_handler))
        .route("/api/mines/verify", post(verify_field_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
