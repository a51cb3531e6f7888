//! Keyframe construction for each coach of a unit.

use glam::{DQuat, DVec3};
use tracing::{debug, warn};

use crate::config::MotionConfig;
use crate::geometry::ExpandedGeometry;
use crate::kinematics::{Leg, LegProfile};
use crate::models::timetable::Timetable;
use crate::models::types::{EventKind, MotionError, Result};
use crate::orientation::orientation_at;
use crate::spatial::ellipsoid::geodetic_to_geocentric;
use crate::spatial::index::LayerIndex;
use crate::track::keyframe::{ControlPoint, KeyframeTrack};

/// The two parallel tracks of one coach.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoachTracks {
    /// Positions at the route's own altitudes.
    pub primary: KeyframeTrack,
    /// Positions at layer-annotated altitudes, ellipsoid height elsewhere.
    pub layer: KeyframeTrack,
}

/// Builds coach tracks over one expanded geometry.
///
/// Positions and orientations only depend on the sample, so they are
/// computed once and shared by every coach.
pub struct KeyframeTrackBuilder<'a> {
    config: &'a MotionConfig,
    geometry: &'a ExpandedGeometry,
    primary: Vec<ControlPoint>,
    layer: Vec<DVec3>,
}

impl<'a> KeyframeTrackBuilder<'a> {
    pub fn new(config: &'a MotionConfig, geometry: &'a ExpandedGeometry, layers: &LayerIndex) -> Self {
        let points = geometry.points();
        let rotations: Vec<DQuat> = (0..points.len())
            .map(|index| orientation_at(points, index, config.max_pitch_rad))
            .collect();

        let primary = points
            .iter()
            .zip(&rotations)
            .map(|(p, &rotation)| {
                ControlPoint::new(
                    geodetic_to_geocentric(p.latitude_deg, p.longitude_deg, p.altitude_m),
                    rotation,
                )
            })
            .collect();

        let layer = points
            .iter()
            .map(|p| {
                let altitude = layers
                    .altitude_near(p.latitude_deg, p.longitude_deg, config.layer_distance_threshold_m)
                    .unwrap_or(0.0);
                geodetic_to_geocentric(p.latitude_deg, p.longitude_deg, altitude)
            })
            .collect();

        Self {
            config,
            geometry,
            primary,
            layer,
        }
    }

    /// Tracks for the coach whose anchors carry `coach_rank`. `times` holds
    /// the simulation time of each timetable event.
    pub fn build(&self, coach_rank: usize, timetable: &Timetable, times: &[f64]) -> Result<CoachTracks> {
        let points = self.geometry.points();
        let mut tracks = CoachTracks::default();
        let mut previous: Option<(usize, EventKind, f64)> = None;

        for (event_index, (event, &time)) in timetable.events().iter().zip(times).enumerate() {
            let index = timetable
                .visit_of(event_index)
                .and_then(|visit| self.geometry.anchor_index(visit, coach_rank))
                .ok_or(MotionError::CoachOutOfRange {
                    coach: coach_rank,
                    count: self.geometry.anchor_ranks(),
                })?;

            if let Some((from, from_kind, from_time)) = previous {
                if index < from {
                    warn!(
                        station = %event.station,
                        coach_rank,
                        "Station lies behind the previous one, skipping leg"
                    );
                } else {
                    let leg = Leg {
                        from: from_kind,
                        to: event.kind,
                        distance_m: points[index].distance_m - points[from].distance_m,
                        duration_s: time - from_time,
                        stationary: index == from,
                    };
                    match LegProfile::select(&leg, self.config) {
                        Some(LegProfile::Hold { .. }) => self.emit(&mut tracks, index, time),
                        Some(profile) => {
                            let origin = points[from].distance_m;
                            for sample in from..=index {
                                let elapsed = profile.elapsed(points[sample].distance_m - origin);
                                self.emit(&mut tracks, sample, from_time + elapsed);
                            }
                        }
                        None => {}
                    }
                }
            }

            previous = Some((index, event.kind, time));
        }

        debug!(
            coach_rank,
            keyframes = tracks.primary.len(),
            first = ?tracks.primary.first_time(),
            last = ?tracks.primary.last_time(),
            "Built coach track"
        );
        Ok(tracks)
    }

    fn emit(&self, tracks: &mut CoachTracks, sample: usize, time: f64) {
        let point = self.primary[sample];
        tracks.primary.insert(time, point);
        tracks
            .layer
            .insert(time, ControlPoint::new(self.layer[sample], point.rotation));
    }
}
