//! A train unit: one timetabled train with its coaches' motion tracks.

use glam::DVec3;
use serde::Deserialize;
use tracing::debug;

use crate::config::MotionConfig;
use crate::geometry::{ExpandedGeometry, RouteGeometry, StationAnchorExpander};
use crate::identifiers::{LineIdentifier, RouteIdentifier, TrainIdentifier};
use crate::models::locomotive::{CoachOffsets, Locomotive};
use crate::models::timetable::Timetable;
use crate::models::traits::{LocomotiveCatalog, TimeBase};
use crate::models::types::{MotionError, Result};
use crate::spatial::ellipsoid::geocentric_to_geodetic;
use crate::spatial::index::LayerIndex;
use crate::track::{CoachTracks, ControlPoint, KeyframeTrackBuilder, Motion};

/// Value of `marker`/`locomotive` meaning "use the host's default".
pub const DEFAULT_KEYWORD: &str = "default";

/// A unit as described in a field document.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UnitDocument {
    pub trainid: String,
    #[serde(default)]
    pub lineid: String,
    #[serde(default)]
    pub route: String,
    #[serde(default)]
    pub direction: String,
    #[serde(default = "default_keyword")]
    pub marker: String,
    #[serde(default = "default_keyword")]
    pub locomotive: String,
    pub timetable: serde_json::Value,
}

fn default_keyword() -> String {
    DEFAULT_KEYWORD.to_string()
}

impl UnitDocument {
    /// Key of the route geometry this unit runs on.
    pub fn route_key(&self) -> String {
        format!("{}_{}", self.lineid, self.route)
    }
}

/// What a unit falls back to when its document says `default`.
#[derive(Clone, Copy, Debug)]
pub struct UnitDefaults<'a> {
    pub marker: &'a str,
    pub locomotive: &'a Locomotive,
}

#[derive(Debug)]
pub struct TrainUnit {
    train_id: TrainIdentifier,
    line_id: LineIdentifier,
    route_id: RouteIdentifier,
    direction: String,
    marker: String,
    locomotive: Locomotive,
    offsets: CoachOffsets,
    timetable: Timetable,
    geometry: ExpandedGeometry,
    layers: LayerIndex,
    config: MotionConfig,
    tracks: Vec<CoachTracks>,
}

impl TrainUnit {
    /// Parse a unit document and prepare its geometry.
    pub fn setup(
        document: &str,
        defaults: UnitDefaults<'_>,
        catalog: &dyn LocomotiveCatalog,
        route_csv: &str,
        config: MotionConfig,
    ) -> Result<Self> {
        let document: UnitDocument = serde_json::from_str(document)?;
        Self::from_document(&document, defaults, catalog, route_csv, config)
    }

    pub fn from_document(
        document: &UnitDocument,
        defaults: UnitDefaults<'_>,
        catalog: &dyn LocomotiveCatalog,
        route_csv: &str,
        config: MotionConfig,
    ) -> Result<Self> {
        let marker = if document.marker == DEFAULT_KEYWORD {
            defaults.marker.to_string()
        } else {
            document.marker.clone()
        };

        let locomotive = if document.locomotive == DEFAULT_KEYWORD {
            defaults.locomotive.clone()
        } else {
            catalog
                .locomotive(&document.locomotive)
                .cloned()
                .ok_or_else(|| MotionError::LocomotiveNotFound(document.locomotive.clone()))?
        };
        locomotive.validate()?;

        let timetable = Timetable::from_json(&document.timetable)?;
        let route = RouteGeometry::parse(route_csv)?;
        let offsets = locomotive.coach_offsets();
        let geometry = StationAnchorExpander::new(&config).expand(&route, &timetable, &offsets)?;
        let layers = LayerIndex::new(&route.layers);

        debug!(
            train = %document.trainid,
            samples = route.len(),
            expanded = geometry.len(),
            coaches = locomotive.interval.len(),
            "Unit set up"
        );

        Ok(Self {
            train_id: TrainIdentifier::new(&document.trainid),
            line_id: LineIdentifier::new(&document.lineid),
            route_id: RouteIdentifier::new(&document.route),
            direction: document.direction.clone(),
            marker,
            locomotive,
            offsets,
            timetable,
            geometry,
            layers,
            config,
            tracks: Vec::new(),
        })
    }

    /// Build the keyframe tracks of every coach. Must run once after setup.
    pub fn simulate_path(&mut self, time_base: &dyn TimeBase) -> Result<()> {
        let times = self
            .timetable
            .events()
            .iter()
            .map(|event| time_base.duration_seconds_from_base(&event.timestamp))
            .collect::<Result<Vec<_>>>()?;

        let builder = KeyframeTrackBuilder::new(&self.config, &self.geometry, &self.layers);
        self.tracks = (0..self.offsets.len())
            .map(|rank| builder.build(rank, &self.timetable, &times))
            .collect::<Result<Vec<_>>>()?;
        Ok(())
    }

    pub fn is_simulated(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn motion(&self, time_s: f64, coach: usize) -> Result<Motion> {
        if coach >= self.coach_count() {
            return Err(MotionError::CoachOutOfRange {
                coach,
                count: self.coach_count(),
            });
        }
        Ok(self
            .tracks
            .get(coach)
            .map_or(Motion::NotRunning, |tracks| tracks.primary.query(time_s)))
    }

    /// Position and attitude of `coach`, or [`ControlPoint::NOT_RUNNING`].
    pub fn control_point(&self, time_s: f64, coach: usize) -> ControlPoint {
        self.motion(time_s, coach)
            .map_or(ControlPoint::NOT_RUNNING, Motion::control_point)
    }

    /// Layer-track position of `coach`, or the origin when not running.
    pub fn control_point_layer(&self, time_s: f64, coach: usize) -> DVec3 {
        self.tracks
            .get(coach)
            .map_or(DVec3::ZERO, |tracks| tracks.layer.query(time_s).control_point().position)
    }

    /// Coaches that have a model to render.
    pub fn locomotive_model_count(&self) -> usize {
        self.locomotive.model_count()
    }

    /// Coaches that have a track (one per coach offset).
    pub fn coach_count(&self) -> usize {
        self.offsets.len()
    }

    pub fn model_uri(&self, coach: usize) -> Option<&str> {
        self.locomotive.model.get(coach).map(String::as_str)
    }

    pub fn train_id(&self) -> &TrainIdentifier {
        &self.train_id
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn locomotive(&self) -> &Locomotive {
        &self.locomotive
    }

    pub fn timetable(&self) -> &Timetable {
        &self.timetable
    }

    pub fn geometry(&self) -> &ExpandedGeometry {
        &self.geometry
    }

    /// `<lineid> <direction> <route>`.
    pub fn line_info(&self) -> String {
        format!("{} {} {}", self.line_id, self.direction, self.route_id)
    }

    pub fn timetable_summary(&self) -> String {
        self.timetable.summary()
    }

    /// `<station>,<meters from the first station>,` per visit, measured at
    /// the head coach's anchors.
    pub fn distance_summary(&self) -> String {
        let mut first: Option<f64> = None;
        let mut summary = String::new();
        for (visit_index, visit) in self.timetable.visits().iter().enumerate() {
            let Some(anchor) = self.geometry.anchor(visit_index, 0) else {
                continue;
            };
            let origin = *first.get_or_insert(anchor.distance_m);
            summary.push_str(&format!("{},{:.6},", visit.station, anchor.distance_m - origin));
        }
        summary
    }

    /// `<lon> <lat> <alt>` of the head coach, or `Not running <time>`.
    pub fn position_summary(&self, time_s: f64) -> String {
        match self.motion(time_s, 0) {
            Ok(Motion::Running(point)) if !point.is_not_running() => {
                let position = geocentric_to_geodetic(point.position);
                format!(
                    "{:.6} {:.6} {:.6}",
                    position.longitude_deg, position.latitude_deg, position.altitude_m
                )
            }
            _ => format!("Not running {time_s:.6}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::clock::ServiceClock;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    const METERS_PER_DEGREE: f64 = 111_319.490_793_273_57;

    fn route_csv() -> String {
        let mut csv = String::from("# lat,lon,alt,label,type\n");
        for i in 0..31 {
            let label = match i {
                5 => "A,B",
                25 => "B,B",
                _ => "x,",
            };
            csv.push_str(&format!("0.0,{:.12},0.0,{label}\n", i as f64 * 100.0 / METERS_PER_DEGREE));
        }
        csv
    }

    fn document(locomotive: &str) -> String {
        format!(
            r#"{{"trainid":"T1","lineid":"L9","route":"r1","direction":"up","marker":"default","locomotive":"{locomotive}","timetable":["0T10:00:00","A",4,"0T10:03:20","B",2]}}"#
        )
    }

    fn clock() -> ServiceClock {
        ServiceClock::utc(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
    }

    fn unit(locomotive: &str, catalog: &HashMap<String, Locomotive>) -> Result<TrainUnit> {
        let default = Locomotive::new(vec![20, 20], vec!["head.glb".into(), "tail.glb".into()])?;
        TrainUnit::setup(
            &document(locomotive),
            UnitDefaults {
                marker: "pin.png",
                locomotive: &default,
            },
            catalog,
            &route_csv(),
            MotionConfig::default(),
        )
    }

    #[test]
    fn test_setup_resolves_defaults() {
        let unit = unit("default", &HashMap::new()).unwrap();
        assert_eq!(unit.train_id().as_str(), "T1");
        assert_eq!(unit.marker(), "pin.png");
        assert_eq!(unit.locomotive_model_count(), 2);
        assert_eq!(unit.coach_count(), 3);
        assert_eq!(unit.model_uri(1), Some("tail.glb"));
        assert_eq!(unit.model_uri(2), None);
        assert_eq!(unit.line_info(), "L9 up r1");
        assert!(!unit.is_simulated());
    }

    #[test]
    fn test_setup_uses_catalog() {
        let mut catalog = HashMap::new();
        catalog.insert("e7".to_string(), Locomotive::new(vec![25, 25, 25], vec![]).unwrap());
        let unit = unit("e7", &catalog).unwrap();
        assert_eq!(unit.coach_count(), 4);
        assert_eq!(unit.locomotive_model_count(), 0);

        let err = unit_err("n700");
        assert!(matches!(err, MotionError::LocomotiveNotFound(name) if name == "n700"));
    }

    fn unit_err(locomotive: &str) -> MotionError {
        unit(locomotive, &HashMap::new()).unwrap_err()
    }

    #[test]
    fn test_simulate_and_query() {
        let mut unit = unit("default", &HashMap::new()).unwrap();
        let start = 36_000.0;
        let end = start + 200.0;

        // Not simulated yet: nothing runs.
        assert_eq!(unit.control_point(start, 0), ControlPoint::NOT_RUNNING);

        unit.simulate_path(&clock()).unwrap();
        assert!(unit.is_simulated());

        for coach in 0..unit.coach_count() {
            assert!(unit.motion(start, coach).unwrap().is_running());
            assert!(unit.motion(end, coach).unwrap().is_running());
            assert_eq!(unit.motion(end + 1.0, coach).unwrap(), Motion::NotRunning);
            assert_eq!(unit.motion(start - 1.0, coach).unwrap(), Motion::NotRunning);
        }
        assert!(matches!(
            unit.motion(start, 3),
            Err(MotionError::CoachOutOfRange { coach: 3, count: 3 })
        ));
        assert_eq!(unit.control_point(start, 9), ControlPoint::NOT_RUNNING);
        assert_eq!(unit.control_point_layer(end + 1.0, 0), DVec3::ZERO);
        assert_ne!(unit.control_point_layer(end, 0), DVec3::ZERO);
    }

    #[test]
    fn test_summaries() {
        let mut unit = unit("default", &HashMap::new()).unwrap();
        unit.simulate_path(&clock()).unwrap();

        assert_eq!(unit.timetable_summary(), "10:00:00,A,10:03:20,B,");
        assert_eq!(unit.distance_summary(), "A,0.000000,B,2000.000000,");
        assert_eq!(unit.position_summary(0.0), "Not running 0.000000");

        // Head coach at A: 20 m ahead of the 500 m station sample.
        let head = unit.position_summary(36_000.0);
        let fields: Vec<f64> = head.split(' ').map(|f| f.parse().unwrap()).collect();
        assert!((fields[0] * METERS_PER_DEGREE - 520.0).abs() < 0.1, "{head}");
        assert!(fields[1].abs() < 1e-6);
        assert!(fields[2].abs() < 1e-3);
    }

    #[test]
    fn test_bad_documents() {
        let default = Locomotive::new(vec![20], vec![]).unwrap();
        let defaults = UnitDefaults {
            marker: "pin.png",
            locomotive: &default,
        };
        let catalog: HashMap<String, Locomotive> = HashMap::new();

        let err = TrainUnit::setup("{", defaults, &catalog, &route_csv(), MotionConfig::default()).unwrap_err();
        assert!(matches!(err, MotionError::Json(_)));

        let missing_station = r#"{"trainid":"T2","timetable":["0T10:00:00","Z",4]}"#;
        let err = TrainUnit::setup(missing_station, defaults, &catalog, &route_csv(), MotionConfig::default())
            .unwrap_err();
        assert!(matches!(err, MotionError::StationNotFound(_)));

        let bad_route = TrainUnit::setup(&document("default"), defaults, &catalog, "0,0", MotionConfig::default());
        assert!(matches!(bad_route, Err(MotionError::InvalidGeometry { .. })));
    }
}
