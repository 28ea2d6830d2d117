use std::sync::Arc;

use axum::routing::get;
use axum::Json;
use axum::Router;

use crate::models::ride::{popular_destinations, Destination, RideTier, TierInfo};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tiers", get(list_tiers))
        .route("/destinations", get(list_destinations))
}

async fn list_tiers() -> Json<Vec<TierInfo>> {
    Json(RideTier::ALL.iter().map(RideTier::info).collect())
}

async fn list_destinations() -> Json<Vec<Destination>> {
    Json(popular_destinations())
}
