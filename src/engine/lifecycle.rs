use chrono::Utc;
use rand::Rng;
use tracing::{debug, info};

use crate::engine::dispatch::DriverRoster;
use crate::engine::motion::PositionSampler;
use crate::engine::pricing::final_fare_cents;
use crate::engine::transition::{eta_on_entry, samples_driver_position, transition, TripEvent};
use crate::error::TripError;
use crate::models::coordinate::Coordinate;
use crate::models::driver::DriverContact;
use crate::models::ride::{find_destination, RideTier};
use crate::models::trip::{Trip, TripStatus};

#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    /// Base for driver positions when no device fix has been seeded.
    pub default_pickup: Coordinate,
    pub sampler: PositionSampler,
    pub roster: DriverRoster,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            default_pickup: Coordinate {
                latitude: 37.7749,
                longitude: -122.4194,
            },
            sampler: PositionSampler::default(),
            roster: DriverRoster::default(),
        }
    }
}

/// Owns the single authoritative [`Trip`] of one booking session.
///
/// Time does not exist here: something else calls [`TripLifecycle::tick`].
pub struct TripLifecycle<R> {
    trip: Option<Trip>,
    origin: Option<Coordinate>,
    settings: LifecycleSettings,
    rng: R,
}

impl<R: Rng> TripLifecycle<R> {
    pub fn new(settings: LifecycleSettings, rng: R) -> Self {
        Self {
            trip: None,
            origin: None,
            settings,
            rng,
        }
    }

    pub fn start(&mut self, destination: &str, tier: RideTier) -> Result<Trip, TripError> {
        if let Some(trip) = self.trip.as_ref().filter(|trip| trip.is_active()) {
            return Err(TripError::InvalidState(format!(
                "trip {} is still {}",
                trip.id,
                trip.status.as_str()
            )));
        }

        let trip = Trip::new(destination.trim().to_string(), tier, self.origin);
        info!(
            trip_id = %trip.id,
            destination = %trip.destination,
            tier = ?tier,
            "trip requested"
        );

        self.trip = Some(trip.clone());
        Ok(trip)
    }

    /// Advances one step. Returns the new status, or `None` if the tick was ignored.
    pub fn tick(&mut self) -> Option<TripStatus> {
        self.apply(TripEvent::Tick)
    }

    /// Cancels a non-terminal trip. Cancelling a finished trip, or when no trip
    /// exists, leaves everything unchanged.
    pub fn cancel(&mut self) -> Option<Trip> {
        self.apply(TripEvent::Cancel);
        self.snapshot()
    }

    pub fn snapshot(&self) -> Option<Trip> {
        self.trip.clone()
    }

    pub fn is_active(&self) -> bool {
        self.trip.as_ref().is_some_and(Trip::is_active)
    }

    /// Seeds the pickup origin from a device fix.
    pub fn set_origin(&mut self, origin: Coordinate) {
        self.origin = Some(origin);

        if let Some(trip) = self.trip.as_mut().filter(|trip| trip.is_active()) {
            trip.origin = Some(origin);
            trip.updated_at = Utc::now();
        }
    }

    pub fn driver_contact(&self) -> Result<DriverContact, TripError> {
        let trip = self
            .trip
            .as_ref()
            .filter(|trip| trip.is_active())
            .ok_or_else(|| TripError::InvalidState("no active trip".to_string()))?;

        trip.driver
            .as_ref()
            .map(|driver| driver.contact())
            .ok_or_else(|| TripError::InvalidState("no driver assigned yet".to_string()))
    }

    fn apply(&mut self, event: TripEvent) -> Option<TripStatus> {
        let trip = self.trip.as_mut()?;

        let Some(next) = transition(trip.status, event) else {
            debug!(trip_id = %trip.id, status = ?trip.status, event = ?event, "event ignored");
            return None;
        };

        if next == TripStatus::Accepted {
            trip.driver = Some(self.settings.roster.assign(&mut self.rng));
        }

        if let Some(eta) = eta_on_entry(next) {
            trip.eta_minutes = eta;
        }

        if samples_driver_position(next) {
            let base = trip.origin.unwrap_or(self.settings.default_pickup);
            trip.driver_position = Some(self.settings.sampler.sample(&base, &mut self.rng));
        }

        if next == TripStatus::Completed {
            let destination = find_destination(&trip.destination).map(|dest| dest.position);
            trip.fare_cents = Some(final_fare_cents(
                trip.tier,
                trip.origin.as_ref(),
                destination.as_ref(),
            ));
        }

        info!(
            trip_id = %trip.id,
            from = ?trip.status,
            to = ?next,
            eta_minutes = trip.eta_minutes,
            "trip status changed"
        );

        trip.status = next;
        trip.updated_at = Utc::now();
        Some(next)
    }
}
