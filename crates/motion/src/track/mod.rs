//! Per-coach keyframe tracks and their construction.

pub mod builder;
pub mod keyframe;

pub use builder::{CoachTracks, KeyframeTrackBuilder};
pub use keyframe::{ControlPoint, Keyframe, KeyframeTrack, Motion};
