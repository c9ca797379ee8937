//! Request Handlers
//!
//! Thin adapters between HTTP and `GameService`. Every failure is returned as
//! an `ApiError` carrying the request id.

use super::{errors::ApiError, middleware::RequestId, models::*};
use crate::games::{
    fairness::verify_field,
    service::GameService,
    types::{GameSummary, SessionId, StartedGame, TileResult},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    pub service: Arc<GameService>,
    pub version: String,
    pub enable_metrics: bool,
}

fn parse_session_id(request_id: &RequestId, raw: &str) -> Result<SessionId, ApiError> {
    // an id that cannot exist is reported like an expired one
    raw.parse().map_err(|_| {
        ApiError::not_found(request_id.0.clone(), format!("Game session {} not found", raw))
            .with_code("SESSION_NOT_FOUND")
    })
}

fn json_body<T>(request_id: &RequestId, payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::bad_request(request_id.0.clone(), e.body_text()).with_code("INVALID_REQUEST"))
}

/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        store: state.service.store_backend().to_string(),
        version: state.version.clone(),
    })
}

/// POST /api/mines/start
pub async fn start_game_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StartGameRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StartedGame>), ApiError> {
    let body = json_body(&request_id, payload)?;
    let started = state
        .service
        .start_game(body.bet_amount, body.mine_count)
        .await
        .map_err(|e| ApiError::from_game(request_id.0.clone(), e))?;

    Ok((StatusCode::CREATED, Json(started)))
}

/// POST /api/mines/:id/reveal
pub async fn reveal_tile_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<RevealTileRequest>, JsonRejection>,
) -> Result<Json<TileResult>, ApiError> {
    let session_id = parse_session_id(&request_id, &raw_id)?;
    let body = json_body(&request_id, payload)?;

    state
        .service
        .reveal_tile(session_id, body.position)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_game(request_id.0.clone(), e))
}

/// POST /api/mines/:id/cashout
pub async fn cash_out_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<GameSummary>, ApiError> {
    let session_id = parse_session_id(&request_id, &raw_id)?;

    state
        .service
        .cash_out(session_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_game(request_id.0.clone(), e))
}

/// GET /api/mines/:id
pub async fn game_result_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<GameSummary>, ApiError> {
    let session_id = parse_session_id(&request_id, &raw_id)?;

    state
        .service
        .get_result(session_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_game(request_id.0.clone(), e))
}

/// GET /api/mines/schedule/:mine_count
pub async fn payout_schedule_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    mine_count: Result<Path<usize>, PathRejection>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let Path(mine_count) = mine_count.map_err(|e| {
        ApiError::bad_request(request_id.0.clone(), e.body_text()).with_code("INVALID_REQUEST")
    })?;
    let schedule = state
        .service
        .payout_schedule(mine_count)
        .map_err(|e| ApiError::from_game(request_id.0.clone(), e))?;

    Ok(Json(ScheduleResponse {
        mine_count,
        house_edge: state.service.rules().house_edge,
        schedule,
    }))
}

/// POST /api/mines/verify
pub async fn verify_field_handler(
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<VerifyFieldRequest>, JsonRejection>,
) -> Result<Json<VerifyFieldResponse>, ApiError> {
    let body = json_body(&request_id, payload)?;

    let report = verify_field(&body.server_seed, &body.server_seed_hash, body.mine_count, &body.field)
        .map_err(|e| ApiError::bad_request(request_id.0.clone(), e.to_string()).with_code("INVALID_SEED"))?;

    Ok(Json(VerifyFieldResponse {
        valid: report.is_valid(),
        commitment_matches: report.commitment_matches,
        field_matches: report.field_matches,
    }))
}

/// GET /metrics
pub async fn metrics_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    if !state.enable_metrics {
        return Err(ApiError::not_found(request_id.0, "Metrics are disabled".to_string()));
    }

    let body = state
        .service
        .metrics()
        .render()
        .map_err(|e| ApiError::internal_error(request_id.0.clone(), format!("Failed to encode metrics: {}", e)))?;

    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response())
}
