//! Geodesic helpers on the WGS84 ellipsoid.
//!
//! Thin wrappers over `geo`'s geodesic algorithms taking `(lat, lon)` in
//! degrees, the order route files use.

use geo::{GeodesicBearing, GeodesicDestination, GeodesicDistance, Point};

fn point(lat_deg: f64, lon_deg: f64) -> Point {
    Point::new(lon_deg, lat_deg)
}

/// Geodesic distance in meters.
pub fn geodesic_distance(from: (f64, f64), to: (f64, f64)) -> f64 {
    point(from.0, from.1).geodesic_distance(&point(to.0, to.1))
}

/// Initial bearing from `from` toward `to`, degrees clockwise from north.
pub fn geodesic_bearing(from: (f64, f64), to: (f64, f64)) -> f64 {
    point(from.0, from.1).geodesic_bearing(point(to.0, to.1))
}

/// Point reached by travelling `distance_m` from `from` on `bearing_deg`.
/// Returns `(lat, lon)`.
pub fn geodesic_destination(from: (f64, f64), bearing_deg: f64, distance_m: f64) -> (f64, f64) {
    let dest = point(from.0, from.1).geodesic_destination(bearing_deg, distance_m);
    (dest.y(), dest.x())
}

/// Opposite direction, normalized to `[0, 360)`.
pub fn reverse_bearing(bearing_deg: f64) -> f64 {
    (bearing_deg + 180.0).rem_euclid(360.0)
}

/// Absolute change of heading between two bearings, in `[0, 180]`.
pub fn heading_change(before_deg: f64, after_deg: f64) -> f64 {
    let delta = (after_deg - before_deg).rem_euclid(360.0);
    if delta > 180.0 {
        360.0 - delta
    } else {
        delta
    }
}

/// Shortest degree of latitude on WGS84, at the equator.
const MIN_METERS_PER_DEGREE_LAT: f64 = 110_574.0;

/// Degrees of latitude spanning at least `meters` anywhere on the ellipsoid.
/// Divide by `cos(lat)` for longitude.
pub fn latitude_span_deg(meters: f64) -> f64 {
    meters / MIN_METERS_PER_DEGREE_LAT * 1.001
}
