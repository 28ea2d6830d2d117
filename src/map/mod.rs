//! Location and map rendering behind one contract, with a device-native and
//! a browser/tile backend.

pub mod diff;
pub mod native;
pub mod sim;
pub mod web;

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::error::MapError;
use crate::models::coordinate::{Coordinate, Viewport};
use crate::models::marker::Marker;

pub use diff::MarkerDiff;
pub use native::{NativeMap, NativeSurface};
pub use web::{OverlayHandle, TileCanvas, WebMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Host platform location services.
pub trait LocationService: Send + Sync {
    fn request_permission(&self) -> BoxFuture<'_, PermissionStatus>;

    fn current_position(&self) -> BoxFuture<'_, Result<Coordinate, MapError>>;
}

/// Result of a render call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapView {
    /// Blank view shown until a fix or an explicit viewport exists.
    Placeholder,
    Map {
        viewport: Viewport,
        zoom: Option<u8>,
        /// Tile under the view center, for tile-based backends.
        tile_url: Option<String>,
        markers: Vec<Marker>,
        diff: MarkerDiff,
    },
}

impl MapView {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, MapView::Placeholder)
    }
}

pub trait MapProvider {
    /// One-shot fix. Emits exactly one notification to subscribers on success.
    fn request_position(&mut self) -> impl Future<Output = Result<Coordinate, MapError>> + Send;

    /// Renders the full marker set, touching only markers whose id changed.
    fn render(&mut self, viewport: Option<Viewport>, markers: &[Marker]) -> Result<MapView, MapError>;

    fn set_viewport(&mut self, viewport: Viewport);

    fn viewport(&self) -> Option<Viewport>;

    fn subscribe(&self) -> broadcast::Receiver<Coordinate>;

    /// Tears down every host-side marker or overlay.
    fn unmount(&mut self);
}

/// Permission prompt, fix and notification shared by both backends.
pub struct PositionFeed {
    location: Arc<dyn LocationService>,
    notify: broadcast::Sender<Coordinate>,
}

impl PositionFeed {
    pub fn new(location: Arc<dyn LocationService>, buffer: usize) -> Self {
        let (notify, _unused_rx) = broadcast::channel(buffer.max(1));
        Self { location, notify }
    }

    pub async fn acquire(&self) -> Result<Coordinate, MapError> {
        if self.location.request_permission().await == PermissionStatus::Denied {
            warn!("location permission denied");
            return Err(MapError::PermissionDenied);
        }

        let fix = self.location.current_position().await.inspect_err(|err| {
            warn!(error = %err, "failed to get current position");
        })?;

        info!(
            latitude = fix.latitude,
            longitude = fix.longitude,
            "position acquired"
        );
        let _ = self.notify.send(fix);
        Ok(fix)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Coordinate> {
        self.notify.subscribe()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapBackendKind {
    Native,
    Web,
}

/// The backend picked once for the host platform.
pub enum MapBackend {
    Native(NativeMap),
    Web(WebMap),
}

impl MapBackend {
    pub fn kind(&self) -> MapBackendKind {
        match self {
            MapBackend::Native(_) => MapBackendKind::Native,
            MapBackend::Web(_) => MapBackendKind::Web,
        }
    }
}

impl MapProvider for MapBackend {
    async fn request_position(&mut self) -> Result<Coordinate, MapError> {
        match self {
            MapBackend::Native(map) => map.request_position().await,
            MapBackend::Web(map) => map.request_position().await,
        }
    }

    fn render(&mut self, viewport: Option<Viewport>, markers: &[Marker]) -> Result<MapView, MapError> {
        match self {
            MapBackend::Native(map) => map.render(viewport, markers),
            MapBackend::Web(map) => map.render(viewport, markers),
        }
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        match self {
            MapBackend::Native(map) => map.set_viewport(viewport),
            MapBackend::Web(map) => map.set_viewport(viewport),
        }
    }

    fn viewport(&self) -> Option<Viewport> {
        match self {
            MapBackend::Native(map) => map.viewport(),
            MapBackend::Web(map) => map.viewport(),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<Coordinate> {
        match self {
            MapBackend::Native(map) => map.subscribe(),
            MapBackend::Web(map) => map.subscribe(),
        }
    }

    fn unmount(&mut self) {
        match self {
            MapBackend::Native(map) => map.unmount(),
            MapBackend::Web(map) => map.unmount(),
        }
    }
}
