//! # rail-motion
//!
//! Turns a static route polyline and a timetable into continuous,
//! time-queryable motion for every coach of a train.
//!
//! ## Features
//!
//! - **Station anchors**: one stopping point per coach at every timetabled
//!   station, plus track extensions behind terminals and sharp curves
//! - **Leg profiles**: accelerate/cruise/decelerate shapes chosen per
//!   pair of timetable events, inverted in closed form
//! - **Keyframe tracks**: geocentric positions with heading and clamped
//!   pitch, plus a parallel track honouring altitude-layer annotations
//! - **Bounded queries**: interpolation inside a track's span, a
//!   "not running" result outside it
//!
//! ## Example
//!
//! ```
//! use rail_motion::prelude::*;
//! use chrono::NaiveDate;
//! use std::collections::HashMap;
//!
//! let route = "\
//! 0.0,0.0,0.0,x,
//! 0.0,0.005,0.0,Alpha,B
//! 0.0,0.010,0.0,x,
//! 0.0,0.015,0.0,Bravo,B
//! 0.0,0.020,0.0,x,
//! ";
//! let document = r#"{
//!     "trainid": "101",
//!     "marker": "default",
//!     "locomotive": "default",
//!     "timetable": ["0T08:00:00", "Alpha", 4, "0T08:02:00", "Bravo", 2]
//! }"#;
//!
//! let locomotive = Locomotive::new(vec![20, 20], vec!["car.glb".into(), "car.glb".into()]).unwrap();
//! let defaults = UnitDefaults { marker: "train.png", locomotive: &locomotive };
//! let catalog: HashMap<String, Locomotive> = HashMap::new();
//!
//! let mut unit = TrainUnit::setup(document, defaults, &catalog, route, MotionConfig::default()).unwrap();
//! let clock = ServiceClock::utc(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
//! unit.simulate_path(&clock).unwrap();
//!
//! assert!(unit.motion(8.0 * 3600.0 + 60.0, 0).unwrap().is_running());
//! assert_eq!(unit.control_point(9.0 * 3600.0, 0), ControlPoint::NOT_RUNNING);
//! ```

pub mod config;
pub mod geometry;
pub mod identifiers;
pub mod kinematics;
pub mod models;
pub mod orientation;
pub mod spatial;
pub mod track;
pub mod unit;

// Re-exports for convenience
pub mod prelude {
    pub use crate::config::MotionConfig;
    pub use crate::geometry::{AnchorTag, ExpandedGeometry, RouteGeometry, RoutePoint, StationAnchorExpander};
    pub use crate::identifiers::*;
    pub use crate::kinematics::{Leg, LegProfile};
    pub use crate::models::{clock::ServiceClock, locomotive::*, timetable::*, traits::*, types::*};
    pub use crate::spatial::{GeodeticPosition, LayerAnnotation, LayerIndex};
    pub use crate::track::{CoachTracks, ControlPoint, Keyframe, KeyframeTrack, KeyframeTrackBuilder, Motion};
    pub use crate::unit::{TrainUnit, UnitDefaults, UnitDocument};
}

pub use prelude::*;
