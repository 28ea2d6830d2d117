use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::coordinate::Coordinate;
use crate::models::driver::Driver;
use crate::models::ride::RideTier;

/// Progression order is the declaration order; `Cancelled` sits outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TripStatus {
    Finding,
    Accepted,
    Arriving,
    Arrived,
    InProgress,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub const ALL: [TripStatus; 7] = [
        TripStatus::Finding,
        TripStatus::Accepted,
        TripStatus::Arriving,
        TripStatus::Arrived,
        TripStatus::InProgress,
        TripStatus::Completed,
        TripStatus::Cancelled,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, TripStatus::Completed | TripStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Finding => "finding",
            TripStatus::Accepted => "accepted",
            TripStatus::Arriving => "arriving",
            TripStatus::Arrived => "arrived",
            TripStatus::InProgress => "in_progress",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusSeverity {
    Info,
    Primary,
    Success,
    Danger,
}

/// User intents the presentation layer may offer for a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripAction {
    Cancel,
    CallDriver,
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub status: TripStatus,
    pub tier: RideTier,
    pub destination: String,
    pub origin: Option<Coordinate>,
    pub driver: Option<Driver>,
    pub eta_minutes: u32,
    pub driver_position: Option<Coordinate>,
    pub fare_cents: Option<u32>,
    pub requested_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    pub fn new(destination: String, tier: RideTier, origin: Option<Coordinate>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: TripStatus::Finding,
            tier,
            destination,
            origin,
            driver: None,
            eta_minutes: tier.info().pickup_wait_minutes,
            driver_position: None,
            fare_cents: None,
            requested_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }
}
