//! Route polylines: raw samples from route files and the per-unit expanded
//! geometry that carries one anchor per coach at every timetabled station.

pub mod expand;
pub mod loader;

pub use expand::{ExpandedGeometry, StationAnchorExpander};
pub use loader::RouteGeometry;

use crate::identifiers::{StationLabel, THROUGH_MARKER};
use crate::models::types::StationKind;
use crate::spatial::queries::geodesic_distance;

/// Identifies the coach anchor a synthesized sample stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnchorTag {
    /// Station visit within the timetable.
    pub visit: usize,
    /// Coach offset rank, 0 = head.
    pub coach_rank: usize,
}

/// One sample of a route polyline.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutePoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
    /// Along-track distance from the first sample.
    pub distance_m: f64,
    /// `None` for samples between stations.
    pub station: Option<StationLabel>,
    pub kind: StationKind,
    pub anchor: Option<AnchorTag>,
}

impl RoutePoint {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
            distance_m: 0.0,
            station: None,
            kind: StationKind::Undefined,
            anchor: None,
        }
    }

    pub fn with_station(mut self, station: Option<StationLabel>, kind: StationKind) -> Self {
        self.station = station;
        self.kind = kind;
        self
    }

    /// `(lat, lon)` in degrees.
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude_deg, self.longitude_deg)
    }

    pub fn is_station(&self) -> bool {
        self.station.is_some()
    }

    /// Station name, or the through marker between stations.
    pub fn label(&self) -> &str {
        self.station
            .as_ref()
            .map(StationLabel::as_str)
            .unwrap_or(THROUGH_MARKER)
    }
}

/// Recompute `distance_m` as the running geodesic sum along the polyline.
pub fn accumulate_distances(points: &mut [RoutePoint]) {
    let mut total = 0.0;
    let mut previous: Option<(f64, f64)> = None;
    for point in points.iter_mut() {
        let here = point.coordinates();
        if let Some(prev) = previous {
            total += geodesic_distance(prev, here);
        }
        point.distance_m = total;
        previous = Some(here);
    }
}
