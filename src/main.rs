mod api;
mod booking;
mod config;
mod engine;
mod error;
mod geo;
mod map;
mod models;
mod observability;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    let config = config::Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    tracing::info!(
        tick_interval_ms = config.tick_interval.as_millis() as u64,
        backend = ?config.map_backend,
        location = ?config.simulated_fix,
        "trip tracker configured"
    );

    let http_port = config.http_port;
    let shared_state = Arc::new(state::AppState::new(config));
    let app = api::rest::router(shared_state.clone());

    let bind_addr = format!("0.0.0.0:{http_port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| error::AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| error::AppError::Internal(format!("server error: {err}")))?;

    let open_sessions: Vec<_> = shared_state
        .sessions
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    for session in open_sessions {
        session.lock().await.close();
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
