//! In-process stand-ins for the host platform: a scripted location service
//! and headless map surfaces that record what they were asked to draw.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{self, BoxFuture, FutureExt};

use crate::error::MapError;
use crate::map::{LocationService, NativeSurface, OverlayHandle, PermissionStatus, TileCanvas};
use crate::models::coordinate::{Coordinate, Viewport};
use crate::models::marker::Marker;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimulatedFix {
    Granted(Coordinate),
    Denied,
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct SimulatedLocation {
    fix: SimulatedFix,
}

impl SimulatedLocation {
    pub fn new(fix: SimulatedFix) -> Self {
        Self { fix }
    }

    pub fn granted(position: Coordinate) -> Self {
        Self::new(SimulatedFix::Granted(position))
    }

    pub fn denied() -> Self {
        Self::new(SimulatedFix::Denied)
    }

    pub fn unavailable() -> Self {
        Self::new(SimulatedFix::Unavailable)
    }
}

impl LocationService for SimulatedLocation {
    fn request_permission(&self) -> BoxFuture<'_, PermissionStatus> {
        let status = match self.fix {
            SimulatedFix::Denied => PermissionStatus::Denied,
            _ => PermissionStatus::Granted,
        };
        future::ready(status).boxed()
    }

    fn current_position(&self) -> BoxFuture<'_, Result<Coordinate, MapError>> {
        let result = match self.fix {
            SimulatedFix::Granted(position) => Ok(position),
            SimulatedFix::Denied => Err(MapError::PermissionDenied),
            SimulatedFix::Unavailable => Err(MapError::PositionUnavailable(
                "no satellite fix".to_string(),
            )),
        };
        future::ready(result).boxed()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Placeholder,
    Region(Viewport),
    View { center: Coordinate, zoom: u8 },
    Add(String),
    Update(String),
    Remove(String),
    Teardown,
}

impl SurfaceOp {
    pub fn adds(&self, id: &str) -> bool {
        matches!(self, SurfaceOp::Add(op_id) if op_id == id)
    }

    pub fn removes(&self, id: &str) -> bool {
        matches!(self, SurfaceOp::Remove(op_id) if op_id == id)
    }

    pub fn touches(&self, id: &str) -> bool {
        match self {
            SurfaceOp::Add(op_id) | SurfaceOp::Update(op_id) | SurfaceOp::Remove(op_id) => {
                op_id == id
            }
            _ => false,
        }
    }
}

/// Shared record of surface operations.
#[derive(Debug, Clone, Default)]
pub struct OpLog(Arc<Mutex<Vec<SurfaceOp>>>);

impl OpLog {
    pub fn ops(&self) -> Vec<SurfaceOp> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, op: SurfaceOp) {
        self.lock().push(op);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SurfaceOp>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug, Default)]
pub struct HeadlessSurface {
    log: OpLog,
}

impl HeadlessSurface {
    pub fn log(&self) -> OpLog {
        self.log.clone()
    }
}

impl NativeSurface for HeadlessSurface {
    fn show_placeholder(&mut self) {
        self.log.push(SurfaceOp::Placeholder);
    }

    fn set_region(&mut self, viewport: &Viewport) {
        self.log.push(SurfaceOp::Region(*viewport));
    }

    fn add_marker(&mut self, marker: &Marker) {
        self.log.push(SurfaceOp::Add(marker.id.clone()));
    }

    fn update_marker(&mut self, marker: &Marker) {
        self.log.push(SurfaceOp::Update(marker.id.clone()));
    }

    fn remove_marker(&mut self, id: &str) {
        self.log.push(SurfaceOp::Remove(id.to_string()));
    }
}

#[derive(Debug, Default)]
pub struct HeadlessCanvas {
    log: OpLog,
    next_handle: OverlayHandle,
    overlays: BTreeMap<OverlayHandle, String>,
}

impl HeadlessCanvas {
    pub fn log(&self) -> OpLog {
        self.log.clone()
    }
}

impl TileCanvas for HeadlessCanvas {
    fn show_placeholder(&mut self) {
        self.log.push(SurfaceOp::Placeholder);
    }

    fn set_view(&mut self, center: &Coordinate, zoom: u8) {
        self.log.push(SurfaceOp::View {
            center: *center,
            zoom,
        });
    }

    fn add_overlay(&mut self, marker: &Marker) -> OverlayHandle {
        self.next_handle += 1;
        self.overlays.insert(self.next_handle, marker.id.clone());
        self.log.push(SurfaceOp::Add(marker.id.clone()));
        self.next_handle
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) {
        if let Some(id) = self.overlays.remove(&handle) {
            self.log.push(SurfaceOp::Remove(id));
        }
    }

    fn remove(&mut self) {
        self.overlays.clear();
        self.log.push(SurfaceOp::Teardown);
    }
}
