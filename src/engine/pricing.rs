use crate::geo::haversine_km;
use crate::models::coordinate::Coordinate;
use crate::models::ride::RideTier;

/// Per-kilometre rate on top of the tier's minimum fare.
pub const PER_KM_CENTS: f64 = 150.0;

/// Final fare for a finished trip, always inside the tier's advertised range.
pub fn final_fare_cents(
    tier: RideTier,
    origin: Option<&Coordinate>,
    destination: Option<&Coordinate>,
) -> u32 {
    let info = tier.info();

    let (Some(origin), Some(destination)) = (origin, destination) else {
        return (info.min_fare_cents + info.max_fare_cents) / 2;
    };

    let distance_km = haversine_km(origin, destination);
    let fare = info.min_fare_cents as f64 + distance_km * PER_KM_CENTS;
    fare.round()
        .clamp(info.min_fare_cents as f64, info.max_fare_cents as f64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).unwrap()
    }

    #[test]
    fn unknown_endpoints_use_the_midpoint() {
        assert_eq!(final_fare_cents(RideTier::UberX, None, None), 1400);
        let origin = point(37.7749, -122.4194);
        assert_eq!(final_fare_cents(RideTier::Black, Some(&origin), None), 4000);
    }

    #[test]
    fn zero_distance_costs_the_minimum() {
        let p = point(37.7749, -122.4194);
        assert_eq!(final_fare_cents(RideTier::Comfort, Some(&p), Some(&p)), 1800);
    }

    #[test]
    fn long_trips_cap_at_the_maximum() {
        let downtown = point(37.7749, -122.4194);
        let sfo = point(37.6213, -122.3790);
        assert_eq!(
            final_fare_cents(RideTier::UberX, Some(&downtown), Some(&sfo)),
            1600
        );
    }

    #[test]
    fn short_trips_scale_with_distance() {
        let a = point(37.7749, -122.4194);
        let b = point(37.7800, -122.4194);
        let fare = final_fare_cents(RideTier::UberXL, Some(&a), Some(&b));
        assert!(fare > 2400 && fare < 3200, "got {fare}");
    }
}
