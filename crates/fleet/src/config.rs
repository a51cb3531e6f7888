use rail_motion::MotionConfig;
use serde::Deserialize;

/// Host-side settings. Missing fields keep their default.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Backward time steps smaller than this are treated as jitter and ignored.
    pub reverse_tolerance_s: f64,
    /// Marker used by units whose document says `default`.
    pub default_marker: String,
    /// Catalog name of the locomotive used when the field document names none.
    pub default_locomotive: String,
    pub motion: MotionConfig,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            reverse_tolerance_s: 0.2,
            default_marker: "train.png".to_string(),
            default_locomotive: "default".to_string(),
            motion: MotionConfig::default(),
        }
    }
}
