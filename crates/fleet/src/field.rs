//! The field document: every unit running in one simulated area.
//!
//! ```text
//! {
//!   "timezone": "+09:00",
//!   "description": "Yamanote weekday",
//!   "locomotive": "e235",
//!   "units": [ { "trainid": "...", "lineid": "...", "route": "...", "timetable": [...] } ]
//! }
//! ```

use chrono::NaiveDate;
use rail_motion::{ServiceClock, UnitDocument};
use serde::Deserialize;

use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FieldDocument {
    #[serde(default = "utc")]
    pub timezone: String,
    #[serde(default)]
    pub description: String,
    /// Locomotive for units that say `default`; falls back to the host setting.
    #[serde(default)]
    pub locomotive: Option<String>,
    #[serde(default)]
    pub units: Vec<UnitDocument>,
}

fn utc() -> String {
    "+00:00".to_string()
}

impl FieldDocument {
    pub fn from_json(document: &str) -> Result<Self> {
        Ok(serde_json::from_str(document)?)
    }

    /// Clock for the service day starting on `base_date` in this field's timezone.
    pub fn clock(&self, base_date: NaiveDate) -> Result<ServiceClock> {
        Ok(ServiceClock::new(base_date, &self.timezone)?)
    }
}
