//! Engine tuning constants.

use serde::Deserialize;

/// Tuning for geometry expansion, leg profiles and keyframe generation.
///
/// `Default` yields the reference values; hosts may override individual
/// fields from a JSON document (missing fields keep their default).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Share of a stop-to-stop leg spent accelerating (and again decelerating).
    pub departure_ratio: f64,
    /// Share of a leg spent accelerating or decelerating when one end is a pass.
    pub through_ratio: f64,
    /// Track guaranteed behind a terminal station and behind sharp curves.
    pub min_train_length_m: f64,
    /// How many samples to walk from a station when placing coach anchors.
    pub anchor_search_window: usize,
    /// Pitch clamp, radians.
    pub max_pitch_rad: f64,
    /// Radius within which a layer annotation overrides the altitude.
    pub layer_distance_threshold_m: f64,
    /// Look-behind/look-ahead span, in samples, for curve detection.
    pub curve_window: usize,
    /// Samples this close to either end of the route are never curve-extended.
    pub curve_margin: usize,
    /// Heading change at or above which a vertex counts as a sharp turn.
    pub sharp_turn_deg: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            departure_ratio: 0.11,
            through_ratio: 0.21,
            min_train_length_m: 210.0,
            anchor_search_window: 50,
            max_pitch_rad: 0.026179938779915,
            layer_distance_threshold_m: 1.8,
            curve_window: 2,
            curve_margin: 4,
            sharp_turn_deg: 90.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override() {
        let config: MotionConfig =
            serde_json::from_str(r#"{"departure_ratio":0.2,"anchor_search_window":80}"#).unwrap();
        assert_eq!(config.departure_ratio, 0.2);
        assert_eq!(config.anchor_search_window, 80);
        assert_eq!(config.through_ratio, 0.21);
        assert_eq!(config.min_train_length_m, 210.0);
    }
}
