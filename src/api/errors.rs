//! API Error Handling
//!
//! Structured error responses with proper HTTP status codes and request tracking.

use crate::errors::GameError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level API error response with request tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request_id: String,
    pub error: ErrorBody,
}

/// Error body with structured information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable code, e.g. SESSION_ALREADY_OVER or BAD_REQUEST
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error types with request tracking
#[derive(Debug)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub code: &'static str,
    pub request_id: String,
    pub details: Option<serde_json::Value>,
}

#[derive(Debug)]
pub enum ApiErrorKind {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    InternalError(String),
    ServiceUnavailable(String),
    Timeout(String),
}

impl ApiError {
    fn new(kind: ApiErrorKind, code: &'static str, request_id: String) -> Self {
        Self {
            kind,
            code,
            request_id,
            details: None,
        }
    }

    pub fn not_found(request_id: String, message: String) -> Self {
        Self::new(ApiErrorKind::NotFound(message), "NOT_FOUND", request_id)
    }

    pub fn bad_request(request_id: String, message: String) -> Self {
        Self::new(ApiErrorKind::BadRequest(message), "BAD_REQUEST", request_id)
    }

    pub fn internal_error(request_id: String, message: String) -> Self {
        Self::new(ApiErrorKind::InternalError(message), "INTERNAL_ERROR", request_id)
    }

    pub fn request_timeout(request_id: String, message: String) -> Self {
        Self::new(ApiErrorKind::Timeout(message), "REQUEST_TIMEOUT", request_id)
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = code;
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Map a game failure onto a status code, keeping its code and message
    pub fn from_game(request_id: String, err: GameError) -> Self {
        let message = err.to_string();
        let kind = match &err {
            GameError::InvalidMineCount { .. }
            | GameError::InvalidBetAmount { .. }
            | GameError::PositionOutOfRange { .. } => ApiErrorKind::BadRequest(message),
            GameError::SessionNotFound(_) => ApiErrorKind::NotFound(message),
            GameError::SessionAlreadyOver(_) | GameError::NothingToCashOut(_) => {
                ApiErrorKind::Conflict(message)
            }
            GameError::RoundIndexExhausted { .. } => ApiErrorKind::InternalError(message),
            GameError::StoreUnavailable(_) => ApiErrorKind::ServiceUnavailable(message),
        };

        let error = Self::new(kind, err.code(), request_id);
        if err.is_retryable() {
            error.with_details(serde_json::json!({ "retryable": true }))
        } else {
            error
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind {
            ApiErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
            ApiErrorKind::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiErrorKind::Conflict(_) => StatusCode::CONFLICT,
            ApiErrorKind::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorKind::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorKind::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
        }
    }

    fn message(&self) -> &str {
        match &self.kind {
            ApiErrorKind::NotFound(msg)
            | ApiErrorKind::BadRequest(msg)
            | ApiErrorKind::Conflict(msg)
            | ApiErrorKind::InternalError(msg)
            | ApiErrorKind::ServiceUnavailable(msg)
            | ApiErrorKind::Timeout(msg) => msg,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.request_id, self.code, self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            request_id: self.request_id.clone(),
            error: ErrorBody {
                code: self.code.to_string(),
                message: self.message().to_string(),
                details: self.details,
            },
        });

        (status, body).into_response()
    }
}
