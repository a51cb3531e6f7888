//! Time-ordered keyframes and interpolation between them.

use glam::{DQuat, DVec3};
use tracing::warn;

/// Geocentric position plus attitude of one coach.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlPoint {
    pub position: DVec3,
    pub rotation: DQuat,
}

impl ControlPoint {
    /// Reserved value for "do not render this coach". The origin is the
    /// Earth's centre, which no coach ever occupies.
    pub const NOT_RUNNING: Self = Self {
        position: DVec3::ZERO,
        rotation: DQuat::from_xyzw(0.0, 0.0, 0.0, 0.0),
    };

    pub fn new(position: DVec3, rotation: DQuat) -> Self {
        Self { position, rotation }
    }

    pub fn is_not_running(&self) -> bool {
        self.position.x == 0.0 && self.position.y == 0.0
    }
}

/// Result of querying a track at a simulation time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    Running(ControlPoint),
    NotRunning,
}

impl Motion {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }

    /// The control point, or [`ControlPoint::NOT_RUNNING`].
    pub fn control_point(self) -> ControlPoint {
        match self {
            Self::Running(point) => point,
            Self::NotRunning => ControlPoint::NOT_RUNNING,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub time_s: f64,
    pub point: ControlPoint,
}

/// Non-looping keyframe track. Times are unique; inserting at an existing
/// time replaces that keyframe.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyframeTrack {
    frames: Vec<Keyframe>,
}

impl KeyframeTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, time_s: f64, point: ControlPoint) {
        if !time_s.is_finite() {
            warn!(time_s, "Dropping keyframe with non-finite time");
            return;
        }

        let index = self.frames.partition_point(|frame| frame.time_s < time_s);
        match self.frames.get_mut(index) {
            Some(frame) if frame.time_s == time_s => frame.point = point,
            _ => self.frames.insert(index, Keyframe { time_s, point }),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.frames
    }

    pub fn first_time(&self) -> Option<f64> {
        self.frames.first().map(|frame| frame.time_s)
    }

    pub fn last_time(&self) -> Option<f64> {
        self.frames.last().map(|frame| frame.time_s)
    }

    /// Interpolated control point at `time_s`. Both ends of the track's span
    /// count as running; outside it the coach is not running.
    pub fn query(&self, time_s: f64) -> Motion {
        let (Some(first), Some(last)) = (self.frames.first(), self.frames.last()) else {
            return Motion::NotRunning;
        };
        if time_s.is_nan() || time_s < first.time_s || time_s > last.time_s {
            return Motion::NotRunning;
        }

        let index = self.frames.partition_point(|frame| frame.time_s <= time_s);
        if index >= self.frames.len() {
            return Motion::Running(last.point);
        }

        let (before, after) = (&self.frames[index - 1], &self.frames[index]);
        let ratio = (time_s - before.time_s) / (after.time_s - before.time_s);
        Motion::Running(ControlPoint {
            position: before.point.position.lerp(after.point.position, ratio),
            rotation: before.point.rotation.slerp(after.point.rotation, ratio),
        })
    }
}
