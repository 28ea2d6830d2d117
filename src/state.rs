use std::sync::Arc;

use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::booking::BookingSession;
use crate::config::Config;
use crate::engine::dispatch::DriverRoster;
use crate::engine::lifecycle::{LifecycleSettings, TripLifecycle};
use crate::engine::motion::PositionSampler;
use crate::engine::session::TripSession;
use crate::engine::ticker::IntervalTicks;
use crate::error::AppError;
use crate::map::sim::{HeadlessCanvas, HeadlessSurface, SimulatedLocation};
use crate::map::{LocationService, MapBackend, MapBackendKind, NativeMap, PositionFeed, WebMap};
use crate::observability::metrics::Metrics;

pub type SharedSession = Arc<Mutex<BookingSession>>;

pub struct AppState {
    pub sessions: DashMap<Uuid, SharedSession>,
    pub config: Config,
    pub metrics: Metrics,
    location: Arc<dyn LocationService>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let location: Arc<dyn LocationService> =
            Arc::new(SimulatedLocation::new(config.simulated_fix));

        Self {
            sessions: DashMap::new(),
            config,
            metrics: Metrics::new(),
            location,
        }
    }

    /// Opens the trip view: a fresh lifecycle on its own timer plus a map.
    pub fn open_session(&self) -> Result<Uuid, AppError> {
        let booking = BookingSession::new(self.spawn_trip()?, self.build_map(), self.metrics.clone());
        let id = booking.id();

        self.sessions.insert(id, Arc::new(Mutex::new(booking)));
        info!(session_id = %id, backend = ?self.config.map_backend, "booking session opened");
        Ok(id)
    }

    pub fn session(&self, id: Uuid) -> Result<SharedSession, AppError> {
        self.sessions
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("session {id} not found")))
    }

    pub async fn close_session(&self, id: Uuid) -> Result<(), AppError> {
        let (_, session) = self
            .sessions
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("session {id} not found")))?;

        session.lock().await.close();
        Ok(())
    }

    fn spawn_trip(&self) -> Result<TripSession, AppError> {
        let sampler = PositionSampler::new(self.config.position_jitter_deg)
            .map_err(|err| AppError::Internal(format!("invalid position jitter: {err}")))?;
        let settings = LifecycleSettings {
            default_pickup: self.config.default_pickup,
            sampler,
            roster: DriverRoster::default(),
        };

        let rng = match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(TripSession::spawn(
            TripLifecycle::new(settings, rng),
            IntervalTicks::new(self.config.tick_interval),
            self.metrics.clone(),
            self.config.command_queue_size,
        ))
    }

    fn build_map(&self) -> MapBackend {
        let feed = PositionFeed::new(self.location.clone(), self.config.event_buffer_size);

        match self.config.map_backend {
            MapBackendKind::Native => MapBackend::Native(
                NativeMap::new(feed, Box::new(HeadlessSurface::default())).with_follow_user(true),
            ),
            MapBackendKind::Web => MapBackend::Web(WebMap::new(
                feed,
                Box::new(HeadlessCanvas::default()),
                &self.config.tile_url_template,
            )),
        }
    }
}
