use std::f64::consts::PI;

use crate::models::coordinate::Coordinate;

const EARTH_RADIUS_KM: f64 = 6_371.0;

pub const MAX_ZOOM: u8 = 19;

pub fn haversine_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

/// `round(log2(360 / span))`, clamped to the tile pyramid.
pub fn span_to_zoom(longitude_span: f64) -> u8 {
    if !longitude_span.is_finite() || longitude_span <= 0.0 {
        return MAX_ZOOM;
    }

    let zoom = (360.0 / longitude_span).log2().round();
    zoom.clamp(0.0, MAX_ZOOM as f64) as u8
}

/// Inverse of [`span_to_zoom`]: `360 / 2^zoom`.
pub fn zoom_to_span(zoom: u8) -> f64 {
    360.0 / 2f64.powi(zoom.min(MAX_ZOOM) as i32)
}

/// Slippy-map tile containing `point` at `zoom`.
pub fn tile_for(point: &Coordinate, zoom: u8) -> (u32, u32) {
    let zoom = zoom.min(MAX_ZOOM);
    let n = 2f64.powi(zoom as i32);
    let max_index = n - 1.0;

    let x = ((point.longitude + 180.0) / 360.0 * n).floor();

    // Web Mercator is undefined at the poles.
    let lat = point.latitude.clamp(-85.051_128_78, 85.051_128_78).to_radians();
    let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n).floor();

    (x.clamp(0.0, max_index) as u32, y.clamp(0.0, max_index) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).unwrap()
    }

    #[test]
    fn zero_distance_for_same_point() {
        let p = point(37.7749, -122.4194);
        let distance = haversine_km(&p, &p);
        assert!(distance < 1e-9);
    }

    #[test]
    fn downtown_to_sfo_is_around_17_km() {
        let downtown = point(37.7749, -122.4194);
        let sfo = point(37.6213, -122.3790);
        let distance = haversine_km(&downtown, &sfo);
        assert!((distance - 17.4).abs() < 2.0, "got {distance}");
    }

    #[test]
    fn span_and_zoom_round_trip_on_powers_of_two() {
        for zoom in 0..=MAX_ZOOM {
            assert_eq!(span_to_zoom(zoom_to_span(zoom)), zoom);
        }
    }

    #[test]
    fn smaller_span_never_yields_lower_zoom() {
        let spans = [360.0, 200.0, 90.0, 10.0, 1.0, 0.3, 0.01, 0.004, 0.0001, 1e-9];
        let zooms: Vec<u8> = spans.iter().map(|span| span_to_zoom(*span)).collect();
        assert!(zooms.windows(2).all(|w| w[0] <= w[1]), "{zooms:?}");
    }

    #[test]
    fn huge_spans_clamp_to_zoom_zero() {
        assert_eq!(span_to_zoom(10_000.0), 0);
    }

    #[test]
    fn tile_for_world_origin() {
        assert_eq!(tile_for(&point(0.0, 0.0), 1), (1, 1));
        assert_eq!(tile_for(&point(0.0, -180.0), 0), (0, 0));
    }

    #[test]
    fn tile_for_san_francisco_at_zoom_13() {
        assert_eq!(tile_for(&point(37.7749, -122.4194), 13), (1310, 3166));
    }
}
