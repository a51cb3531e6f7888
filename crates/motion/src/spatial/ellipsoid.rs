//! WGS84 geodetic <-> geocentric (ECEF) conversion.

use glam::DVec3;

pub const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

const ECCENTRICITY_SQ: f64 = WGS84_FLATTENING * (2.0 - WGS84_FLATTENING);

/// Latitude/longitude in degrees, height above the ellipsoid in meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeodeticPosition {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

fn prime_vertical_radius(sin_lat: f64) -> f64 {
    WGS84_SEMI_MAJOR_AXIS / (1.0 - ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt()
}

pub fn geodetic_to_geocentric(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> DVec3 {
    let (sin_lat, cos_lat) = latitude_deg.to_radians().sin_cos();
    let (sin_lon, cos_lon) = longitude_deg.to_radians().sin_cos();
    let n = prime_vertical_radius(sin_lat);

    DVec3::new(
        (n + altitude_m) * cos_lat * cos_lon,
        (n + altitude_m) * cos_lat * sin_lon,
        (n * (1.0 - ECCENTRICITY_SQ) + altitude_m) * sin_lat,
    )
}

/// Iterative inverse of [`geodetic_to_geocentric`].
pub fn geocentric_to_geodetic(position: DVec3) -> GeodeticPosition {
    let p = position.x.hypot(position.y);
    let longitude = position.y.atan2(position.x);

    let mut latitude = position.z.atan2(p * (1.0 - ECCENTRICITY_SQ));
    for _ in 0..10 {
        let n = prime_vertical_radius(latitude.sin());
        let next = (position.z + ECCENTRICITY_SQ * n * latitude.sin()).atan2(p);
        let converged = (next - latitude).abs() < 1e-14;
        latitude = next;
        if converged {
            break;
        }
    }

    // Height formula that stays well conditioned near the poles.
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let n = prime_vertical_radius(sin_lat);
    let altitude = p * cos_lat + position.z * sin_lat - n * (1.0 - ECCENTRICITY_SQ * sin_lat * sin_lat);

    GeodeticPosition {
        latitude_deg: latitude.to_degrees(),
        longitude_deg: longitude.to_degrees(),
        altitude_m: altitude,
    }
}
