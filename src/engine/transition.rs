use crate::models::trip::TripStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripEvent {
    Tick,
    Cancel,
}

/// The trip transition table. `None` means the event is ignored in `status`.
pub fn transition(status: TripStatus, event: TripEvent) -> Option<TripStatus> {
    use TripStatus::*;

    match (status, event) {
        (Finding, TripEvent::Tick) => Some(Accepted),
        (Accepted, TripEvent::Tick) => Some(Arriving),
        (Arriving, TripEvent::Tick) => Some(Arrived),
        (Arrived, TripEvent::Tick) => Some(InProgress),
        (InProgress, TripEvent::Tick) => Some(Completed),
        (Completed | Cancelled, _) => None,
        (_, TripEvent::Cancel) => Some(Cancelled),
    }
}

/// ETA in minutes on entering `status`, or `None` to keep the previous value.
pub fn eta_on_entry(status: TripStatus) -> Option<u32> {
    match status {
        TripStatus::Accepted => Some(4),
        TripStatus::Arriving => Some(2),
        TripStatus::Arrived => Some(0),
        TripStatus::InProgress => Some(15),
        TripStatus::Completed => Some(0),
        TripStatus::Finding | TripStatus::Cancelled => None,
    }
}

/// Whether the driver's position is resampled on entering `status`.
pub fn samples_driver_position(status: TripStatus) -> bool {
    matches!(status, TripStatus::Accepted | TripStatus::Arriving)
}
