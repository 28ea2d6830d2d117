use serde::Serialize;

use crate::models::trip::{StatusSeverity, Trip, TripAction, TripStatus};

const FALLBACK_DRIVER_NAME: &str = "Your driver";

pub fn status_message(trip: &Trip) -> String {
    let driver = trip
        .driver
        .as_ref()
        .map(|d| d.name.as_str())
        .unwrap_or(FALLBACK_DRIVER_NAME);

    match trip.status {
        TripStatus::Finding => "Looking for a nearby driver...".to_string(),
        TripStatus::Accepted => format!("{driver} is heading your way"),
        TripStatus::Arriving => format!("{driver} will arrive in {} min", trip.eta_minutes),
        TripStatus::Arrived => format!("{driver} has arrived"),
        TripStatus::InProgress => {
            format!("On your way to destination • {} min", trip.eta_minutes)
        }
        TripStatus::Completed => "You have arrived at your destination".to_string(),
        TripStatus::Cancelled => "Your ride was cancelled".to_string(),
    }
}

pub fn status_severity(status: TripStatus) -> StatusSeverity {
    match status {
        TripStatus::Finding => StatusSeverity::Info,
        TripStatus::Accepted | TripStatus::Arriving | TripStatus::InProgress => {
            StatusSeverity::Primary
        }
        TripStatus::Arrived | TripStatus::Completed => StatusSeverity::Success,
        TripStatus::Cancelled => StatusSeverity::Danger,
    }
}

pub fn available_actions(status: TripStatus) -> Vec<TripAction> {
    match status {
        TripStatus::Finding => vec![TripAction::Cancel],
        TripStatus::Accepted | TripStatus::Arriving | TripStatus::Arrived => {
            vec![TripAction::Cancel, TripAction::CallDriver]
        }
        TripStatus::InProgress => vec![TripAction::CallDriver],
        TripStatus::Completed | TripStatus::Cancelled => vec![TripAction::Done],
    }
}

/// Everything the status panel renders for one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub trip: Trip,
    pub message: String,
    pub severity: StatusSeverity,
    pub actions: Vec<TripAction>,
}

impl StatusView {
    pub fn of(trip: Trip) -> Self {
        Self {
            message: status_message(&trip),
            severity: status_severity(trip.status),
            actions: available_actions(trip.status),
            trip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::driver::Driver;
    use crate::models::ride::RideTier;

    fn trip_in(status: TripStatus) -> Trip {
        let mut trip = Trip::new("SFO".to_string(), RideTier::UberX, None);
        trip.status = status;
        trip.eta_minutes = 2;
        if status != TripStatus::Finding {
            trip.driver = Some(Driver {
                name: "John Smith".to_string(),
                rating: 4.95,
                vehicle: "Toyota Camry - White".to_string(),
                license_plate: "ABC 123".to_string(),
                phone: "+1 (555) 123-4567".to_string(),
                avatar: "sf:person.circle.fill".to_string(),
            });
        }
        trip
    }

    #[test]
    fn messages_cover_every_status() {
        for status in TripStatus::ALL {
            assert!(!status_message(&trip_in(status)).is_empty(), "{status:?}");
        }
    }

    #[test]
    fn arriving_message_includes_driver_and_eta() {
        let message = status_message(&trip_in(TripStatus::Arriving));
        assert_eq!(message, "John Smith will arrive in 2 min");
    }

    #[test]
    fn message_falls_back_without_a_driver() {
        let mut trip = trip_in(TripStatus::Cancelled);
        trip.driver = None;
        trip.status = TripStatus::Accepted;
        assert_eq!(status_message(&trip), "Your driver is heading your way");
    }

    #[test]
    fn severity_is_stable_across_calls() {
        let first: Vec<_> = TripStatus::ALL.iter().map(|s| status_severity(*s)).collect();
        let second: Vec<_> = TripStatus::ALL
            .iter()
            .rev()
            .map(|s| status_severity(*s))
            .rev()
            .collect();
        assert_eq!(first, second);
        assert_eq!(status_severity(TripStatus::Cancelled), StatusSeverity::Danger);
        assert_eq!(status_severity(TripStatus::Finding), StatusSeverity::Info);
    }

    #[test]
    fn terminal_statuses_only_offer_done() {
        assert_eq!(available_actions(TripStatus::Completed), vec![TripAction::Done]);
        assert_eq!(available_actions(TripStatus::Cancelled), vec![TripAction::Done]);
        assert!(!available_actions(TripStatus::InProgress).contains(&TripAction::Cancel));
    }
}
