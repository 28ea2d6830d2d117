use serde::{Deserialize, Serialize};

use crate::error::MapError;

/// A WGS84 position. Construction through [`Coordinate::new`] or serde keeps
/// latitude within [-90, 90] and longitude within [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = MapError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, MapError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(MapError::InvalidCoordinate(format!(
                "latitude {latitude} outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(MapError::InvalidCoordinate(format!(
                "longitude {longitude} outside [-180, 180]"
            )));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Shifts by the given deltas, clamping the result back into range.
    pub fn offset(&self, d_lat: f64, d_lng: f64) -> Self {
        Self {
            latitude: (self.latitude + d_lat).clamp(-90.0, 90.0),
            longitude: (self.longitude + d_lng).clamp(-180.0, 180.0),
        }
    }
}

/// Visible map extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawViewport")]
pub struct Viewport {
    pub center: Coordinate,
    pub latitude_span: f64,
    pub longitude_span: f64,
}

#[derive(Deserialize)]
struct RawViewport {
    center: Coordinate,
    latitude_span: f64,
    longitude_span: f64,
}

impl TryFrom<RawViewport> for Viewport {
    type Error = MapError;

    fn try_from(raw: RawViewport) -> Result<Self, Self::Error> {
        Viewport::new(raw.center, raw.latitude_span, raw.longitude_span)
    }
}

impl Viewport {
    pub fn new(center: Coordinate, latitude_span: f64, longitude_span: f64) -> Result<Self, MapError> {
        let valid = |span: f64| span.is_finite() && span > 0.0;
        if !valid(latitude_span) || !valid(longitude_span) {
            return Err(MapError::InvalidViewport(format!(
                "spans must be positive, got {latitude_span} x {longitude_span}"
            )));
        }

        Ok(Self {
            center,
            latitude_span,
            longitude_span,
        })
    }

    pub fn around(center: Coordinate, span: f64) -> Result<Self, MapError> {
        Self::new(center, span, span)
    }
}
