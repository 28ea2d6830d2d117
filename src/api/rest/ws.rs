use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::SinkExt;
use futures::StreamExt;
use serde::Serialize;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::status::StatusView;
use crate::error::AppError;
use crate::map::MapView;
use crate::models::trip::Trip;
use crate::state::{AppState, SharedSession};

/// One push to the trip screen: status panel plus map.
#[derive(Serialize)]
struct TripFrame {
    status: StatusView,
    map: MapView,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.session(id)?;
    let snapshots = session.lock().await.trip().subscribe();

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, id, session, snapshots)))
}

async fn handle_socket(
    socket: WebSocket,
    id: Uuid,
    session: SharedSession,
    snapshots: watch::Receiver<Option<Trip>>,
) {
    let (mut sender, mut receiver) = socket.split();
    let mut updates = WatchStream::new(snapshots);

    info!(session_id = %id, "websocket client connected");

    let send_task = tokio::spawn(async move {
        while let Some(trip) = updates.next().await {
            let Some(trip) = trip else {
                continue;
            };

            let map = session.lock().await.refresh().unwrap_or_else(|err| {
                warn!(session_id = %id, error = %err, "map refresh failed");
                MapView::Placeholder
            });

            let frame = TripFrame {
                status: StatusView::of(trip),
                map,
            };

            let json = match serde_json::to_string(&frame) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to serialize trip frame for ws");
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(_msg)) = receiver.next().await {}
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    info!(session_id = %id, "websocket client disconnected");
}
