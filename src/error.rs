use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TripError {
    #[error("invalid state: {0}")]
    InvalidState(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable: {0}")]
    PositionUnavailable(String),

    #[error("duplicate marker id: {0}")]
    DuplicateMarker(String),

    #[error("invalid viewport: {0}")]
    InvalidViewport(String),

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TripError> for AppError {
    fn from(err: TripError) -> Self {
        match err {
            TripError::InvalidState(msg) => AppError::Conflict(msg),
        }
    }
}

impl From<MapError> for AppError {
    fn from(err: MapError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
