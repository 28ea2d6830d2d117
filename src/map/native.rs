use std::collections::BTreeMap;

use tokio::sync::broadcast;
use tracing::debug;

use crate::error::MapError;
use crate::map::{MapProvider, MapView, MarkerDiff, PositionFeed};
use crate::models::coordinate::{Coordinate, Viewport};
use crate::models::marker::Marker;

/// Span of the region opened around the first fix.
pub const INITIAL_FIX_SPAN: f64 = 0.01;

/// Platform map view: regions are center + span, markers are native primitives.
pub trait NativeSurface: Send {
    fn show_placeholder(&mut self);
    fn set_region(&mut self, viewport: &Viewport);
    fn add_marker(&mut self, marker: &Marker);
    /// Updates position and title of an existing marker in place.
    fn update_marker(&mut self, marker: &Marker);
    fn remove_marker(&mut self, id: &str);
}

pub struct NativeMap {
    feed: PositionFeed,
    surface: Box<dyn NativeSurface>,
    viewport: Option<Viewport>,
    markers: BTreeMap<String, Marker>,
    follow_user: bool,
}

impl NativeMap {
    pub fn new(feed: PositionFeed, surface: Box<dyn NativeSurface>) -> Self {
        Self {
            feed,
            surface,
            viewport: None,
            markers: BTreeMap::new(),
            follow_user: false,
        }
    }

    /// Re-center on every fix, keeping the current span.
    pub fn with_follow_user(mut self, follow: bool) -> Self {
        self.follow_user = follow;
        self
    }

    fn center_on(&mut self, fix: Coordinate) -> Result<(), MapError> {
        let viewport = match self.viewport {
            None => Viewport::around(fix, INITIAL_FIX_SPAN)?,
            Some(current) if self.follow_user => {
                Viewport::new(fix, current.latitude_span, current.longitude_span)?
            }
            Some(_) => return Ok(()),
        };

        self.set_viewport(viewport);
        Ok(())
    }
}

impl MapProvider for NativeMap {
    async fn request_position(&mut self) -> Result<Coordinate, MapError> {
        let fix = self.feed.acquire().await?;
        self.center_on(fix)?;
        Ok(fix)
    }

    fn render(&mut self, viewport: Option<Viewport>, markers: &[Marker]) -> Result<MapView, MapError> {
        let diff = MarkerDiff::between(self.markers.values(), markers)?;

        if let Some(viewport) = viewport {
            self.set_viewport(viewport);
        }

        let Some(viewport) = self.viewport else {
            self.surface.show_placeholder();
            return Ok(MapView::Placeholder);
        };

        for id in &diff.removed {
            self.surface.remove_marker(id);
            self.markers.remove(id);
        }

        for marker in markers {
            if diff.is_added(&marker.id) {
                self.surface.add_marker(marker);
            } else if diff.is_moved(&marker.id) {
                self.surface.update_marker(marker);
            } else {
                continue;
            }
            self.markers.insert(marker.id.clone(), marker.clone());
        }

        debug!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            moved = diff.moved.len(),
            "native map rendered"
        );

        Ok(MapView::Map {
            viewport,
            zoom: None,
            tile_url: None,
            markers: markers.to_vec(),
            diff,
        })
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.surface.set_region(&viewport);
        self.viewport = Some(viewport);
    }

    fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    fn subscribe(&self) -> broadcast::Receiver<Coordinate> {
        self.feed.subscribe()
    }

    fn unmount(&mut self) {
        for id in self.markers.keys() {
            self.surface.remove_marker(id);
        }
        self.markers.clear();
    }
}
