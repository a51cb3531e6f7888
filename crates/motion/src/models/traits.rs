//! Seams between the engine and its collaborators.
//!
//! The engine never reads clocks or fetches documents itself. Hosts hand it
//! a time base and, when units name their own rolling stock, a catalog.

use std::collections::HashMap;

use crate::models::locomotive::Locomotive;
use crate::models::types::Result;

/// Converts timetable timestamps into simulation seconds.
pub trait TimeBase {
    /// Seconds from the simulation base instant to `timestamp`
    /// (`<day>T<HH>:<MM>:<SS>` in the service's local time).
    fn duration_seconds_from_base(&self, timestamp: &str) -> Result<f64>;
}

/// Source of locomotive definitions by name.
pub trait LocomotiveCatalog {
    fn locomotive(&self, name: &str) -> Option<&Locomotive>;
}

impl LocomotiveCatalog for HashMap<String, Locomotive> {
    fn locomotive(&self, name: &str) -> Option<&Locomotive> {
        self.get(name)
    }
}
