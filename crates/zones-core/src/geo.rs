//! Pure geospatial math: great-circle distance, ray casting, and the
//! planar bounding-box approximation used for candidate narrowing.

use crate::models::{GeoBounds, Point};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Approximate meters per degree of latitude. Longitude shrinks with
/// cos(latitude); latitude is treated as constant. Good enough for
/// candidate narrowing, never used as a final accept/reject test.
pub const METERS_PER_DEG_LAT: f64 = 111_320.0;

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Great-circle distance between two points in meters using the
/// Haversine formula.
///
/// Exactly symmetric and zero for identical points.
pub fn haversine_distance(p1: &Point, p2: &Point) -> f64 {
    let phi1 = degrees_to_radians(p1.lat);
    let phi2 = degrees_to_radians(p2.lat);
    let dphi = degrees_to_radians(p2.lat - p1.lat);
    let dlambda = degrees_to_radians(p2.lon - p1.lon);

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Check if a point is inside a polygon using ray casting.
///
/// Counts crossings of a ray from the point against each polygon edge,
/// with the last vertex wrapping back to the first. Polygons with fewer
/// than 3 vertices contain nothing. The result does not depend on which
/// vertex the list starts from.
pub fn point_in_polygon(point: &Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = &polygon[i];
        let pj = &polygon[j];

        if ((pi.lat > point.lat) != (pj.lat > point.lat))
            && (point.lon < (pj.lon - pi.lon) * (point.lat - pi.lat) / (pj.lat - pi.lat) + pi.lon)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Axis-aligned box approximating a radius around a center point.
///
/// Uses a constant meters-per-degree latitude and cos-scaled longitude,
/// clamped to valid coordinate ranges. Deliberately approximate: callers
/// must follow up with exact distance or containment tests.
pub fn bounding_box(center: &Point, radius_m: f64) -> GeoBounds {
    let radius_m = radius_m.max(0.0);
    let lat_delta = radius_m / METERS_PER_DEG_LAT;

    // cos approaches zero at the poles; floor it so the box widens to the
    // full longitude range instead of dividing by zero.
    let cos_lat = degrees_to_radians(center.lat).cos().abs().max(1e-9);
    let lon_delta = radius_m / (METERS_PER_DEG_LAT * cos_lat);

    GeoBounds {
        min_lat: (center.lat - lat_delta).max(-90.0),
        min_lon: (center.lon - lon_delta).max(-180.0),
        max_lat: (center.lat + lat_delta).min(90.0),
        max_lon: (center.lon + lon_delta).min(180.0),
    }
}

/// Arithmetic mean of the polygon vertices.
///
/// Not an area-weighted centroid, but stable and cheap; used to derive a
/// zone center when the caller does not supply one. None for an empty
/// polygon.
pub fn polygon_centroid(polygon: &[Point]) -> Option<Point> {
    if polygon.is_empty() {
        return None;
    }
    let n = polygon.len() as f64;
    let lat = polygon.iter().map(|p| p.lat).sum::<f64>() / n;
    let lon = polygon.iter().map(|p| p.lon).sum::<f64>() / n;
    Some(Point::new(lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]
    }

    #[test]
    fn haversine_known_distance() {
        // ~111km between these points (1 degree latitude)
        let dist = haversine_distance(&Point::new(0.0, 0.0), &Point::new(1.0, 0.0));
        assert!((dist - 111_194.0).abs() < 100.0);
    }

    #[test]
    fn haversine_same_point_is_zero() {
        let p = Point::new(40.7128, -74.0060);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn haversine_is_symmetric() {
        let a = Point::new(51.5074, -0.1278);
        let b = Point::new(48.8566, 2.3522);
        assert_eq!(haversine_distance(&a, &b), haversine_distance(&b, &a));
    }

    #[test]
    fn point_in_polygon_basic() {
        let poly = square();
        assert!(point_in_polygon(&Point::new(0.5, 0.5), &poly));
        assert!(!point_in_polygon(&Point::new(2.0, 2.0), &poly));
        assert!(!point_in_polygon(&Point::new(-0.5, 0.5), &poly));
    }

    #[test]
    fn point_in_polygon_rotation_invariant() {
        let poly = square();
        let inside = Point::new(0.25, 0.75);
        let outside = Point::new(1.25, 0.75);

        for start in 0..poly.len() {
            let mut rotated = poly.clone();
            rotated.rotate_left(start);
            assert!(
                point_in_polygon(&inside, &rotated),
                "inside point lost at rotation {start}"
            );
            assert!(
                !point_in_polygon(&outside, &rotated),
                "outside point gained at rotation {start}"
            );
        }
    }

    #[test]
    fn degenerate_polygons_contain_nothing() {
        let p = Point::new(0.0, 0.0);
        assert!(!point_in_polygon(&p, &[]));
        assert!(!point_in_polygon(&p, &[p]));
        assert!(!point_in_polygon(&p, &[p, Point::new(1.0, 1.0)]));
    }

    #[test]
    fn bounding_box_contains_center() {
        let center = Point::new(37.7749, -122.4194);
        let bounds = bounding_box(&center, 5_000.0);
        assert!(bounds.min_lat < center.lat && center.lat < bounds.max_lat);
        assert!(bounds.min_lon < center.lon && center.lon < bounds.max_lon);
    }

    #[test]
    fn bounding_box_clamps_at_poles() {
        let bounds = bounding_box(&Point::new(89.9999, 0.0), 50_000.0);
        assert!(bounds.max_lat <= 90.0);
        assert!(bounds.min_lon >= -180.0);
        assert!(bounds.max_lon <= 180.0);
    }

    #[test]
    fn bounding_box_zero_radius_degenerates_to_center() {
        let center = Point::new(10.0, 20.0);
        let bounds = bounding_box(&center, 0.0);
        assert_eq!(bounds.min_lat, center.lat);
        assert_eq!(bounds.max_lat, center.lat);
        assert_eq!(bounds.min_lon, center.lon);
        assert_eq!(bounds.max_lon, center.lon);
    }

    #[test]
    fn centroid_of_square() {
        let c = polygon_centroid(&square()).unwrap();
        assert!((c.lat - 0.5).abs() < 1e-12);
        assert!((c.lon - 0.5).abs() < 1e-12);
        assert!(polygon_centroid(&[]).is_none());
    }
}
