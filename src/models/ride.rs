use serde::{Deserialize, Serialize};

use crate::models::coordinate::Coordinate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RideTier {
    #[default]
    UberX,
    Comfort,
    UberXL,
    Black,
}

/// Catalog entry describing a tier the way the booking screen lists it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierInfo {
    pub tier: RideTier,
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub capacity: u8,
    pub min_fare_cents: u32,
    pub max_fare_cents: u32,
    pub pickup_wait_minutes: u32,
}

impl RideTier {
    pub const ALL: [RideTier; 4] = [
        RideTier::UberX,
        RideTier::Comfort,
        RideTier::UberXL,
        RideTier::Black,
    ];

    pub fn info(&self) -> TierInfo {
        match self {
            RideTier::UberX => TierInfo {
                tier: *self,
                id: "uberx",
                name: "UberX",
                description: "Affordable rides for everyday travel",
                capacity: 4,
                min_fare_cents: 1200,
                max_fare_cents: 1600,
                pickup_wait_minutes: 5,
            },
            RideTier::Comfort => TierInfo {
                tier: *self,
                id: "comfort",
                name: "Comfort",
                description: "More space, newer cars",
                capacity: 4,
                min_fare_cents: 1800,
                max_fare_cents: 2400,
                pickup_wait_minutes: 8,
            },
            RideTier::UberXL => TierInfo {
                tier: *self,
                id: "xl",
                name: "UberXL",
                description: "Spacious rides for up to 6 people",
                capacity: 6,
                min_fare_cents: 2400,
                max_fare_cents: 3200,
                pickup_wait_minutes: 12,
            },
            RideTier::Black => TierInfo {
                tier: *self,
                id: "black",
                name: "Black",
                description: "Premium rides in luxury cars",
                capacity: 4,
                min_fare_cents: 3500,
                max_fare_cents: 4500,
                pickup_wait_minutes: 15,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Destination {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub position: Coordinate,
}

const POPULAR_DESTINATIONS: [(&str, &str, f64, f64); 4] = [
    ("San Francisco Airport", "SFO", 37.6213, -122.3790),
    ("Union Square", "Downtown SF", 37.7880, -122.4075),
    ("Golden Gate Bridge", "Tourist Attraction", 37.8199, -122.4783),
    ("Pier 39", "Fisherman's Wharf", 37.8087, -122.4098),
];

pub fn popular_destinations() -> Vec<Destination> {
    POPULAR_DESTINATIONS
        .iter()
        .map(|&(title, subtitle, latitude, longitude)| Destination {
            title,
            subtitle,
            position: Coordinate {
                latitude,
                longitude,
            },
        })
        .collect()
}

/// Resolves free text against the popular destinations by title or subtitle.
pub fn find_destination(query: &str) -> Option<Destination> {
    let query = query.trim();
    popular_destinations().into_iter().find(|dest| {
        dest.title.eq_ignore_ascii_case(query) || dest.subtitle.eq_ignore_ascii_case(query)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fare_ranges_are_ordered() {
        for tier in RideTier::ALL {
            let info = tier.info();
            assert!(info.min_fare_cents < info.max_fare_cents, "{tier:?}");
        }
    }

    #[test]
    fn finds_destination_by_code_or_title() {
        let sfo = find_destination("sfo").unwrap();
        assert_eq!(sfo.title, "San Francisco Airport");

        let pier = find_destination("  Pier 39 ").unwrap();
        assert_eq!(pier.subtitle, "Fisherman's Wharf");

        assert!(find_destination("Somewhere else").is_none());
    }
}
