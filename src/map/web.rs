use std::collections::BTreeMap;

use tokio::sync::broadcast;
use tracing::debug;

use crate::error::MapError;
use crate::geo::{span_to_zoom, tile_for, zoom_to_span};
use crate::map::{MapProvider, MapView, MarkerDiff, PositionFeed};
use crate::models::coordinate::{Coordinate, Viewport};
use crate::models::marker::Marker;

pub const DEFAULT_TILE_URL_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Zoom used when the first fix opens the map.
pub const INITIAL_FIX_ZOOM: u8 = 15;

pub type OverlayHandle = u64;

/// Tile-based web map instance. Overlays are never collected implicitly:
/// every handle returned by `add_overlay` must be passed to `remove_overlay`.
pub trait TileCanvas: Send {
    fn show_placeholder(&mut self);
    fn set_view(&mut self, center: &Coordinate, zoom: u8);
    fn add_overlay(&mut self, marker: &Marker) -> OverlayHandle;
    fn remove_overlay(&mut self, handle: OverlayHandle);
    /// Destroys the map instance itself.
    fn remove(&mut self);
}

struct Overlay {
    marker: Marker,
    handle: OverlayHandle,
}

pub struct WebMap {
    feed: PositionFeed,
    canvas: Box<dyn TileCanvas>,
    tile_url_template: String,
    viewport: Option<Viewport>,
    zoom: Option<u8>,
    overlays: BTreeMap<String, Overlay>,
    mounted: bool,
}

impl WebMap {
    pub fn new(feed: PositionFeed, canvas: Box<dyn TileCanvas>, tile_url_template: &str) -> Self {
        Self {
            feed,
            canvas,
            tile_url_template: tile_url_template.to_string(),
            viewport: None,
            zoom: None,
            overlays: BTreeMap::new(),
            mounted: true,
        }
    }

    pub fn zoom(&self) -> Option<u8> {
        self.zoom
    }

    /// URL of the tile under the current view center.
    pub fn center_tile_url(&self) -> Option<String> {
        let viewport = self.viewport?;
        let zoom = self.zoom?;
        let (x, y) = tile_for(&viewport.center, zoom);
        Some(tile_url(&self.tile_url_template, zoom, x, y))
    }

    fn apply_view(&mut self, center: Coordinate, zoom: u8) -> Result<(), MapError> {
        let span = zoom_to_span(zoom);
        let viewport = Viewport::new(center, span, span)?;

        self.canvas.set_view(&center, zoom);
        self.viewport = Some(viewport);
        self.zoom = Some(zoom);
        Ok(())
    }

    fn clear_overlays(&mut self) {
        for overlay in self.overlays.values() {
            self.canvas.remove_overlay(overlay.handle);
        }
        self.overlays.clear();
    }
}

pub fn tile_url(template: &str, zoom: u8, x: u32, y: u32) -> String {
    template
        .replace("{z}", &zoom.to_string())
        .replace("{x}", &x.to_string())
        .replace("{y}", &y.to_string())
}

impl MapProvider for WebMap {
    async fn request_position(&mut self) -> Result<Coordinate, MapError> {
        let fix = self.feed.acquire().await?;

        if self.mounted && self.viewport.is_none() {
            self.apply_view(fix, INITIAL_FIX_ZOOM)?;
        }
        Ok(fix)
    }

    fn render(&mut self, viewport: Option<Viewport>, markers: &[Marker]) -> Result<MapView, MapError> {
        let diff = MarkerDiff::between(self.overlays.values().map(|o| &o.marker), markers)?;

        if !self.mounted {
            debug!("render after unmount ignored");
            return Ok(MapView::Placeholder);
        }

        if let Some(viewport) = viewport {
            self.set_viewport(viewport);
        }

        let (Some(viewport), Some(zoom)) = (self.viewport, self.zoom) else {
            self.canvas.show_placeholder();
            return Ok(MapView::Placeholder);
        };

        for id in diff.removed.iter().chain(diff.moved.iter()) {
            if let Some(overlay) = self.overlays.remove(id) {
                self.canvas.remove_overlay(overlay.handle);
            }
        }

        for marker in markers {
            if diff.is_added(&marker.id) || diff.is_moved(&marker.id) {
                let handle = self.canvas.add_overlay(marker);
                self.overlays.insert(
                    marker.id.clone(),
                    Overlay {
                        marker: marker.clone(),
                        handle,
                    },
                );
            }
        }

        debug!(
            zoom,
            added = diff.added.len(),
            removed = diff.removed.len(),
            moved = diff.moved.len(),
            "web map rendered"
        );

        Ok(MapView::Map {
            viewport,
            zoom: Some(zoom),
            tile_url: self.center_tile_url(),
            markers: markers.to_vec(),
            diff,
        })
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        if !self.mounted {
            return;
        }

        let zoom = span_to_zoom(viewport.longitude_span);
        if let Err(err) = self.apply_view(viewport.center, zoom) {
            debug!(error = %err, "viewport rejected");
        }
    }

    fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    fn subscribe(&self) -> broadcast::Receiver<Coordinate> {
        self.feed.subscribe()
    }

    fn unmount(&mut self) {
        if !self.mounted {
            return;
        }

        self.clear_overlays();
        self.canvas.remove();
        self.mounted = false;
        self.viewport = None;
        self.zoom = None;
    }
}

impl Drop for WebMap {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::map::sim::{HeadlessCanvas, OpLog, SimulatedLocation, SurfaceOp};

    fn sf() -> Coordinate {
        Coordinate::new(37.7749, -122.4194).unwrap()
    }

    fn web(location: SimulatedLocation) -> (WebMap, OpLog) {
        let canvas = HeadlessCanvas::default();
        let log = canvas.log();
        let map = WebMap::new(
            PositionFeed::new(Arc::new(location), 4),
            Box::new(canvas),
            DEFAULT_TILE_URL_TEMPLATE,
        );
        (map, log)
    }

    #[tokio::test]
    async fn first_fix_opens_at_street_zoom() {
        let (mut map, log) = web(SimulatedLocation::granted(sf()));
        map.request_position().await.unwrap();

        assert_eq!(map.zoom(), Some(INITIAL_FIX_ZOOM));
        assert_eq!(
            log.ops(),
            vec![SurfaceOp::View {
                center: sf(),
                zoom: INITIAL_FIX_ZOOM
            }]
        );
    }

    #[test]
    fn viewport_span_becomes_a_discrete_zoom() {
        let (mut map, _log) = web(SimulatedLocation::denied());
        map.set_viewport(Viewport::around(sf(), 0.01).unwrap());

        assert_eq!(map.zoom(), Some(15));
        let snapped = map.viewport().unwrap();
        assert_eq!(snapped.longitude_span, zoom_to_span(15));
    }

    #[test]
    fn changed_marker_is_removed_before_it_is_re_added() {
        let (mut map, log) = web(SimulatedLocation::denied());
        let viewport = Viewport::around(sf(), 0.01).unwrap();
        map.render(Some(viewport), &[Marker::new("driver", sf(), "John")])
            .unwrap();
        log.clear();

        let moved = Marker::new("driver", sf().offset(0.002, 0.0), "John");
        map.render(None, &[moved]).unwrap();
        assert_eq!(
            log.ops(),
            vec![
                SurfaceOp::Remove("driver".to_string()),
                SurfaceOp::Add("driver".to_string())
            ]
        );
    }

    #[test]
    fn drop_tears_down_every_overlay_and_the_map() {
        let (mut map, log) = web(SimulatedLocation::denied());
        let viewport = Viewport::around(sf(), 0.01).unwrap();
        map.render(
            Some(viewport),
            &[Marker::new("a", sf(), "A"), Marker::new("b", sf(), "B")],
        )
        .unwrap();
        log.clear();

        drop(map);
        let ops = log.ops();
        assert!(ops.contains(&SurfaceOp::Remove("a".to_string())));
        assert!(ops.contains(&SurfaceOp::Remove("b".to_string())));
        assert_eq!(ops.last(), Some(&SurfaceOp::Teardown));
    }

    #[test]
    fn unmount_is_idempotent_and_blocks_rendering() {
        let (mut map, log) = web(SimulatedLocation::denied());
        map.set_viewport(Viewport::around(sf(), 0.01).unwrap());
        map.unmount();
        map.unmount();

        let view = map
            .render(None, &[Marker::new("a", sf(), "A")])
            .unwrap();
        assert!(view.is_placeholder());

        let teardowns = log
            .ops()
            .into_iter()
            .filter(|op| *op == SurfaceOp::Teardown)
            .count();
        assert_eq!(teardowns, 1);
    }

    #[test]
    fn center_tile_url_uses_the_template() {
        let (mut map, _log) = web(SimulatedLocation::denied());
        assert!(map.center_tile_url().is_none());

        map.set_viewport(Viewport::around(sf(), zoom_to_span(13)).unwrap());
        assert_eq!(
            map.center_tile_url().as_deref(),
            Some("https://tile.openstreetmap.org/13/1310/3166.png")
        );

        let MapView::Map { tile_url, .. } = map.render(None, &[]).unwrap() else {
            panic!("expected a rendered map");
        };
        assert_eq!(
            tile_url.as_deref(),
            Some("https://tile.openstreetmap.org/13/1310/3166.png")
        );
    }
}
