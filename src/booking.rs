use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::session::TripSession;
use crate::error::{MapError, TripError};
use crate::map::{MapBackend, MapProvider, MapView};
use crate::models::coordinate::Coordinate;
use crate::models::marker::Marker;
use crate::models::ride::find_destination;
use crate::models::trip::Trip;
use crate::observability::metrics::Metrics;

pub const DRIVER_MARKER_ID: &str = "driver";
pub const PICKUP_MARKER_ID: &str = "pickup";
pub const DESTINATION_MARKER_ID: &str = "destination";

/// One trip view: a trip lifecycle and the map showing it. Closing the
/// session stops the trip's timer and unmounts the map.
pub struct BookingSession {
    id: Uuid,
    trip: TripSession,
    map: MapBackend,
    positions: broadcast::Receiver<Coordinate>,
    metrics: Metrics,
}

impl BookingSession {
    pub fn new(trip: TripSession, map: MapBackend, metrics: Metrics) -> Self {
        let positions = map.subscribe();
        Self {
            id: Uuid::new_v4(),
            trip,
            map,
            positions,
            metrics,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn trip(&self) -> &TripSession {
        &self.trip
    }

    /// Asks the device for a fix. The map's position notification seeds the
    /// trip origin before the map is rendered.
    ///
    /// Position errors stay here: they are logged and the map falls back to
    /// whatever it can show, which is the placeholder before any viewport.
    pub async fn locate(&mut self) -> (Option<Coordinate>, MapView) {
        let fix = match self.map.request_position().await {
            Ok(fix) => {
                self.count_position("granted");
                Some(fix)
            }
            Err(err) => {
                let outcome = match err {
                    MapError::PermissionDenied => "denied",
                    _ => "unavailable",
                };
                self.count_position(outcome);
                warn!(session_id = %self.id, error = %err, "falling back to placeholder map");
                None
            }
        };

        self.seed_from_notifications().await;

        let view = self.refresh().unwrap_or_else(|err| {
            warn!(session_id = %self.id, error = %err, "map render failed");
            MapView::Placeholder
        });

        (fix, view)
    }

    async fn seed_from_notifications(&mut self) {
        let mut latest = None;
        loop {
            match self.positions.try_recv() {
                Ok(position) => latest = Some(position),
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(session_id = %self.id, skipped, "position notifications lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }

        let Some(origin) = latest else {
            return;
        };
        if let Err(err) = self.trip.seed_origin(origin).await {
            warn!(session_id = %self.id, error = %err, "could not seed trip origin");
        }
    }

    /// Re-renders the map from the current trip snapshot.
    pub fn refresh(&mut self) -> Result<MapView, MapError> {
        let markers = self
            .trip
            .snapshot()
            .map(|trip| trip_markers(&trip))
            .unwrap_or_default();

        self.map.render(None, &markers)
    }

    pub async fn cancel(&mut self) -> Result<Option<Trip>, TripError> {
        self.trip.cancel().await
    }

    pub fn close(&mut self) {
        self.trip.close();
        self.map.unmount();
        info!(session_id = %self.id, "booking session closed");
    }

    fn count_position(&self, outcome: &str) {
        self.metrics
            .position_requests_total
            .with_label_values(&[outcome])
            .inc();
    }
}

impl Drop for BookingSession {
    fn drop(&mut self) {
        self.trip.close();
        self.map.unmount();
    }
}

/// Markers describing a trip: pickup, destination (when known) and driver.
pub fn trip_markers(trip: &Trip) -> Vec<Marker> {
    let mut markers = Vec::with_capacity(3);

    if let Some(origin) = trip.origin {
        markers.push(Marker::new(PICKUP_MARKER_ID, origin, "Pickup"));
    }

    if let Some(destination) = find_destination(&trip.destination) {
        markers.push(Marker::new(
            DESTINATION_MARKER_ID,
            destination.position,
            destination.title,
        ));
    }

    if let (Some(driver), Some(position)) = (&trip.driver, trip.driver_position) {
        if !trip.status.is_terminal() {
            markers.push(Marker::new(DRIVER_MARKER_ID, position, driver.marker_label()));
        }
    }

    markers
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::engine::lifecycle::{LifecycleSettings, TripLifecycle};
    use crate::engine::ticker::ManualTicks;
    use crate::map::sim::{HeadlessSurface, SimulatedLocation};
    use crate::map::{NativeMap, PositionFeed};
    use crate::models::ride::RideTier;
    use crate::models::trip::TripStatus;

    fn session(location: SimulatedLocation) -> (BookingSession, crate::engine::ticker::ManualTrigger) {
        let metrics = Metrics::new();
        let (ticks, trigger) = ManualTicks::channel();
        let lifecycle =
            TripLifecycle::new(LifecycleSettings::default(), StdRng::seed_from_u64(4));
        let trip = TripSession::spawn(lifecycle, ticks, metrics.clone(), 8);
        let map = MapBackend::Native(NativeMap::new(
            PositionFeed::new(Arc::new(location), 4),
            Box::new(HeadlessSurface::default()),
        ));
        (BookingSession::new(trip, map, metrics), trigger)
    }

    #[tokio::test]
    async fn denied_location_yields_placeholder_without_error() {
        let (mut booking, _trigger) = session(SimulatedLocation::denied());
        booking.trip().start("SFO", RideTier::UberX).await.unwrap();

        let (fix, view) = booking.locate().await;
        assert!(fix.is_none());
        assert!(view.is_placeholder());
        assert_eq!(
            booking
                .metrics
                .position_requests_total
                .with_label_values(&["denied"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn fix_seeds_origin_and_shows_markers() {
        let origin = Coordinate::new(37.78, -122.41).unwrap();
        let (mut booking, trigger) = session(SimulatedLocation::granted(origin));
        booking.trip().start("SFO", RideTier::UberX).await.unwrap();

        let (fix, _) = booking.locate().await;
        assert_eq!(fix, Some(origin));

        trigger.fire();
        let mut rx = booking.trip().subscribe();
        rx.wait_for(|trip| {
            trip.as_ref()
                .is_some_and(|t| t.status == TripStatus::Accepted)
        })
        .await
        .unwrap();

        let MapView::Map { markers, .. } = booking.refresh().unwrap() else {
            panic!("expected map after a fix");
        };
        let ids: Vec<&str> = markers.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["pickup", "destination", "driver"]);
        assert_eq!(booking.trip().snapshot().unwrap().origin, Some(origin));
    }

    #[tokio::test]
    async fn close_stops_the_trip() {
        let (mut booking, _trigger) = session(SimulatedLocation::denied());
        booking.trip().start("SFO", RideTier::UberX).await.unwrap();

        booking.close();
        for _ in 0..50 {
            if booking.trip().is_closed() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(booking.trip().is_closed());
    }

    #[tokio::test]
    async fn locate_renders_pickup_from_the_same_fix() {
        let origin = Coordinate::new(37.78, -122.41).unwrap();
        let (mut booking, _trigger) = session(SimulatedLocation::granted(origin));
        booking.trip().start("Pier 39", RideTier::UberX).await.unwrap();

        let (_, view) = booking.locate().await;
        let MapView::Map { markers, .. } = view else {
            panic!("expected map after a fix");
        };
        let ids: Vec<&str> = markers.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["pickup", "destination"]);
        assert_eq!(booking.trip().snapshot().unwrap().origin, Some(origin));
    }

    #[tokio::test]
    async fn cancel_goes_through_the_session() {
        let (mut booking, trigger) = session(SimulatedLocation::denied());
        booking.trip().start("SFO", RideTier::UberX).await.unwrap();
        trigger.fire();

        let trip = booking.cancel().await.unwrap().unwrap();
        assert!(trip.status.is_terminal());
    }

    #[tokio::test]
    async fn dropping_the_session_stops_the_trip_timer() {
        let (booking, trigger) = session(SimulatedLocation::denied());
        let metrics = booking.metrics.clone();
        booking.trip().start("SFO", RideTier::UberX).await.unwrap();
        assert_eq!(metrics.active_trips.get(), 1);

        drop(booking);
        let mut stopped = false;
        for _ in 0..50 {
            if !trigger.fire() {
                stopped = true;
                break;
            }
            tokio::task::yield_now().await;
        }

        assert!(stopped, "tick source outlived the dropped session");
        assert_eq!(metrics.active_trips.get(), 0);
    }

    #[test]
    fn terminal_trips_drop_the_driver_marker() {
        let mut trip = Trip::new("Pier 39".to_string(), RideTier::UberX, None);
        trip.status = TripStatus::Completed;
        trip.driver_position = Some(Coordinate::new(37.8, -122.4).unwrap());

        let ids: Vec<String> = trip_markers(&trip).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["destination".to_string()]);
    }
}
