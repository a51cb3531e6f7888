//! # rail-fleet
//!
//! Hosts a set of [`rail_motion::TrainUnit`]s built from one field
//! document: resolves per-unit defaults, skips units that fail to set up,
//! guards against clock jitter and renders the plain-text summaries a
//! command channel answers with.

pub mod config;
pub mod error;
pub mod field;
pub mod fleet;

// Re-exports for convenience
pub mod prelude {
    pub use crate::config::FleetConfig;
    pub use crate::error::{FleetError, Result};
    pub use crate::field::FieldDocument;
    pub use crate::fleet::{CoachFrame, Fleet, Frame, SkippedUnit, UnitFrame, ALL_TRAINS, UNTRACKING};
}

pub use prelude::*;
pub use rail_motion as motion;
