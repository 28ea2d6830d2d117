use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::status::StatusView;
use crate::error::AppError;
use crate::map::{MapBackendKind, MapView};
use crate::models::coordinate::Coordinate;
use crate::models::driver::DriverContact;
use crate::models::ride::RideTier;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", post(open_session))
        .route("/sessions/:id", delete(close_session))
        .route("/sessions/:id/locate", post(locate))
        .route("/sessions/:id/trip", post(start_trip).get(get_trip))
        .route("/sessions/:id/cancel", post(cancel_trip))
        .route("/sessions/:id/driver", get(driver_contact))
        .route("/sessions/:id/map", get(map_view))
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub backend: MapBackendKind,
}

#[derive(Deserialize)]
pub struct StartTripRequest {
    pub destination: String,
    #[serde(default)]
    pub tier: RideTier,
}

#[derive(Serialize)]
pub struct LocateResponse {
    pub position: Option<Coordinate>,
    pub view: MapView,
}

async fn open_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionResponse>, AppError> {
    let id = state.open_session()?;
    Ok(Json(SessionResponse {
        id,
        backend: state.config.map_backend,
    }))
}

async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.close_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn locate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<LocateResponse>, AppError> {
    let session = state.session(id)?;
    let (position, view) = session.lock().await.locate().await;

    Ok(Json(LocateResponse { position, view }))
}

async fn start_trip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StartTripRequest>,
) -> Result<Json<StatusView>, AppError> {
    if payload.destination.trim().is_empty() {
        return Err(AppError::BadRequest("destination cannot be empty".to_string()));
    }

    let session = state.session(id)?;
    let trip = session
        .lock()
        .await
        .trip()
        .start(&payload.destination, payload.tier)
        .await?;

    Ok(Json(StatusView::of(trip)))
}

async fn get_trip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusView>, AppError> {
    let session = state.session(id)?;
    let trip = session
        .lock()
        .await
        .trip()
        .snapshot()
        .ok_or_else(|| AppError::NotFound(format!("session {id} has no trip")))?;

    Ok(Json(StatusView::of(trip)))
}

async fn cancel_trip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusView>, AppError> {
    let session = state.session(id)?;
    let trip = session
        .lock()
        .await
        .cancel()
        .await?
        .ok_or_else(|| AppError::NotFound(format!("session {id} has no trip")))?;

    Ok(Json(StatusView::of(trip)))
}

async fn driver_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DriverContact>, AppError> {
    let session = state.session(id)?;
    let contact = session.lock().await.trip().driver_contact().await?;

    Ok(Json(contact))
}

async fn map_view(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MapView>, AppError> {
    let session = state.session(id)?;
    let view = session.lock().await.refresh()?;

    Ok(Json(view))
}
