//! Farm polygon geometry on a spherical Earth

use serde::{Deserialize, Serialize};

/// Earth radius in metres (WGS84 semi-major axis)
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Square metres per acre
pub const SQUARE_METERS_PER_ACRE: f64 = 4_046.856_422_4;

/// A geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Area, perimeter, and centre of a polygon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonMetrics {
    pub area_m2: f64,
    pub area_acres: f64,
    pub perimeter_m: f64,
    pub center: LatLng,
}

impl PolygonMetrics {
    /// Compute all metrics for a polygon
    #[must_use]
    pub fn of(path: &[LatLng]) -> Self {
        let area_m2 = polygon_area(path);
        Self {
            area_m2,
            area_acres: area_m2 / SQUARE_METERS_PER_ACRE,
            perimeter_m: polygon_perimeter(path),
            center: centroid(path),
        }
    }
}

fn polar_triangle_area(tan1: f64, lng1: f64, tan2: f64, lng2: f64) -> f64 {
    let delta_lng = lng1 - lng2;
    let t = tan1 * tan2;
    2.0 * (t * delta_lng.sin()).atan2(t.mul_add(delta_lng.cos(), 1.0))
}

/// Spherical polygon area in m²; fewer than three vertices have no area
#[must_use]
pub fn polygon_area(path: &[LatLng]) -> f64 {
    let Some(last) = path.last() else {
        return 0.0;
    };
    if path.len() < 3 {
        return 0.0;
    }

    let tan_lat = |p: &LatLng| ((std::f64::consts::FRAC_PI_2 - p.lat.to_radians()) / 2.0).tan();

    let mut prev_tan = tan_lat(last);
    let mut prev_lng = last.lng.to_radians();
    let mut total = 0.0;

    for point in path {
        let tan = tan_lat(point);
        let lng = point.lng.to_radians();
        total += polar_triangle_area(tan, lng, prev_tan, prev_lng);
        prev_tan = tan;
        prev_lng = lng;
    }

    (total * EARTH_RADIUS_M * EARTH_RADIUS_M).abs()
}

/// Great-circle distance in metres
#[must_use]
pub fn haversine_distance(a: LatLng, b: LatLng) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Closed-ring perimeter in metres
#[must_use]
pub fn polygon_perimeter(path: &[LatLng]) -> f64 {
    if path.len() < 2 {
        return 0.0;
    }
    path.iter()
        .zip(path.iter().cycle().skip(1))
        .map(|(a, b)| haversine_distance(*a, *b))
        .sum()
}

/// Vertex mean; the origin for an empty path
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn centroid(path: &[LatLng]) -> LatLng {
    if path.is_empty() {
        return LatLng::new(0.0, 0.0);
    }
    let n = path.len() as f64;
    let (lat, lng) = path
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
    LatLng::new(lat / n, lng / n)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn square(origin: LatLng, side_deg: f64) -> Vec<LatLng> {
        vec![
            origin,
            LatLng::new(origin.lat, origin.lng + side_deg),
            LatLng::new(origin.lat + side_deg, origin.lng + side_deg),
            LatLng::new(origin.lat + side_deg, origin.lng),
        ]
    }

    #[test]
    fn test_equatorial_square_area() {
        let side_m = EARTH_RADIUS_M * 0.01_f64.to_radians();
        let area = polygon_area(&square(LatLng::new(0.0, 0.0), 0.01));
        let expected = side_m * side_m;
        assert!((area - expected).abs() / expected < 0.005, "{area} vs {expected}");
    }

    #[test]
    fn test_degenerate_paths_have_no_area() {
        assert!(polygon_area(&[]).abs() < f64::EPSILON);
        assert!(polygon_area(&[LatLng::new(1.0, 1.0), LatLng::new(2.0, 2.0)]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_acres_conversion() {
        let metrics = PolygonMetrics::of(&square(LatLng::new(28.6, 77.2), 0.001));
        assert!((metrics.area_acres * SQUARE_METERS_PER_ACRE - metrics.area_m2).abs() < 1e-6);
    }

    #[test]
    fn test_perimeter_closes_ring() {
        let path = square(LatLng::new(0.0, 0.0), 0.01);
        let side = haversine_distance(path[0], path[1]);
        let perimeter = polygon_perimeter(&path);
        assert!((perimeter - 4.0 * side).abs() / perimeter < 0.001);
    }

    #[test]
    fn test_centroid_is_vertex_mean() {
        let c = centroid(&square(LatLng::new(10.0, 20.0), 2.0));
        assert!((c.lat - 11.0).abs() < 1e-9);
        assert!((c.lng - 21.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_area_ignores_winding(
            lat in -60.0f64..60.0,
            lng in -170.0f64..170.0,
            side in 0.0001f64..0.5,
        ) {
            let path = square(LatLng::new(lat, lng), side);
            let mut reversed = path.clone();
            reversed.reverse();

            let a = polygon_area(&path);
            let b = polygon_area(&reversed);
            prop_assert!(a > 0.0);
            prop_assert!((a - b).abs() <= a * 1e-9);
        }
    }
}
