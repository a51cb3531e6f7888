//! Coach attitude along the route.
//!
//! Models face their local -Y axis, so the pan about -Z adds half a turn to
//! the compass bearing. Pitch is applied about the model's X axis after the
//! pan (body frame).

use std::f64::consts::PI;

use glam::{DQuat, DVec3};

use crate::geometry::RoutePoint;
use crate::spatial::queries::{geodesic_bearing, geodesic_distance};

/// Samples closer than this carry no usable direction.
const MIN_SEPARATION_M: f64 = 1e-3;

/// Rotation of a coach at `from` heading toward `to`.
pub fn heading_pitch(from: &RoutePoint, to: &RoutePoint, max_pitch_rad: f64) -> DQuat {
    let bearing = geodesic_bearing(from.coordinates(), to.coordinates()).to_radians();
    let horizontal = geodesic_distance(from.coordinates(), to.coordinates());
    let pitch = (to.altitude_m - from.altitude_m)
        .atan2(horizontal)
        .clamp(-max_pitch_rad, max_pitch_rad);

    let pan = DQuat::from_axis_angle(DVec3::NEG_Z, bearing + PI);
    let tilt = DQuat::from_axis_angle(DVec3::X, pitch);
    (pan * tilt).normalize()
}

/// Rotation at `points[index]`, looking ahead to the next distinct sample.
/// The last sample (or a run of coincident samples at the end) looks back.
pub fn orientation_at(points: &[RoutePoint], index: usize, max_pitch_rad: f64) -> DQuat {
    let Some(here) = points.get(index) else {
        return DQuat::IDENTITY;
    };
    let separated =
        |other: &&RoutePoint| geodesic_distance(here.coordinates(), other.coordinates()) > MIN_SEPARATION_M;

    if let Some(next) = points[index + 1..].iter().find(separated) {
        return heading_pitch(here, next, max_pitch_rad);
    }
    if let Some(previous) = points[..index].iter().rev().find(separated) {
        return heading_pitch(previous, here, max_pitch_rad);
    }
    DQuat::IDENTITY
}
