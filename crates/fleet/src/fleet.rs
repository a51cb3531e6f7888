//! The set of train units simulated together.

use std::collections::{BTreeMap, HashMap};

use glam::DVec3;
use rail_motion::{LocomotiveCatalog, Motion, TimeBase, TrainIdentifier, TrainUnit, UnitDefaults, UnitDocument};
use tracing::{debug, info, warn};

use crate::config::FleetConfig;
use crate::error::{FleetError, Result};
use crate::field::FieldDocument;

/// Tracking target that clears tracking.
pub const UNTRACKING: &str = "untracking";

/// Train id selecting every unit in position queries.
pub const ALL_TRAINS: &str = "all";

const NOT_FOUND: &str = "Not found";

/// A unit that could not be set up, and why.
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedUnit {
    pub train_id: String,
    pub reason: String,
}

/// One coach's state in a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoachFrame {
    pub coach: usize,
    pub motion: Motion,
    /// Layer-track position, or the origin when not running.
    pub layer_position: DVec3,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnitFrame {
    pub train_id: TrainIdentifier,
    pub coaches: Vec<CoachFrame>,
}

/// Everything a renderer needs for one simulation time.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub time_s: f64,
    pub units: Vec<UnitFrame>,
    /// Head-coach position of the tracked train, when it is running.
    pub tracked: Option<DVec3>,
}

#[derive(Debug)]
pub struct Fleet {
    config: FleetConfig,
    units: BTreeMap<String, TrainUnit>,
    skipped: Vec<SkippedUnit>,
    tracking: Option<String>,
    last_time: Option<f64>,
}

impl Fleet {
    /// Set up and simulate every unit of a field. `routes` maps
    /// `<lineid>_<route>` keys to route CSV text.
    ///
    /// Units that fail are logged and skipped; only a missing default
    /// locomotive fails the whole fleet.
    pub fn from_field(
        field: &FieldDocument,
        routes: &HashMap<String, String>,
        catalog: &dyn LocomotiveCatalog,
        clock: &dyn TimeBase,
        config: FleetConfig,
    ) -> Result<Self> {
        let locomotive_name = field
            .locomotive
            .clone()
            .unwrap_or_else(|| config.default_locomotive.clone());
        let default_locomotive = catalog
            .locomotive(&locomotive_name)
            .ok_or_else(|| FleetError::DefaultLocomotive(locomotive_name.clone()))?;
        let defaults = UnitDefaults {
            marker: &config.default_marker,
            locomotive: default_locomotive,
        };

        let mut units = BTreeMap::new();
        let mut skipped = Vec::new();
        for document in &field.units {
            if units.contains_key(&document.trainid) {
                let err = FleetError::DuplicateTrain(document.trainid.clone());
                warn!(train = %document.trainid, "Skipping unit: {err}");
                skipped.push(SkippedUnit {
                    train_id: document.trainid.clone(),
                    reason: err.to_string(),
                });
                continue;
            }

            match build_unit(document, defaults, catalog, routes, clock, &config) {
                Ok(unit) => {
                    units.insert(document.trainid.clone(), unit);
                }
                Err(err) => {
                    warn!(train = %document.trainid, "Skipping unit: {err}");
                    skipped.push(SkippedUnit {
                        train_id: document.trainid.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            field = %field.description,
            units = units.len(),
            skipped = skipped.len(),
            "Fleet ready"
        );

        Ok(Self {
            config,
            units,
            skipped,
            tracking: None,
            last_time: None,
        })
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn unit(&self, train_id: &str) -> Option<&TrainUnit> {
        self.units.get(train_id)
    }

    /// Train ids in ascending order.
    pub fn train_ids(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    pub fn skipped(&self) -> &[SkippedUnit] {
        &self.skipped
    }

    pub fn last_time(&self) -> Option<f64> {
        self.last_time
    }

    /// Advance to `time_s` and collect every rendered coach.
    ///
    /// Returns `None` for a small backward step (clock jitter); the
    /// previous time is kept. Larger backward jumps are honoured.
    pub fn update(&mut self, time_s: f64) -> Option<Frame> {
        if let Some(previous) = self.last_time {
            let step = time_s - previous;
            if step < 0.0 && step > -self.config.reverse_tolerance_s {
                debug!(time_s, previous, "Ignoring small backward step");
                return None;
            }
        }
        self.last_time = Some(time_s);

        let units = self
            .units
            .iter()
            .map(|(id, unit)| UnitFrame {
                train_id: unit.train_id().clone(),
                coaches: (0..unit.locomotive_model_count().min(unit.coach_count()))
                    .map(|coach| CoachFrame {
                        coach,
                        motion: unit.motion(time_s, coach).unwrap_or_else(|err| {
                            warn!(train = %id, coach, "{err}");
                            Motion::NotRunning
                        }),
                        layer_position: unit.control_point_layer(time_s, coach),
                    })
                    .collect(),
            })
            .collect();

        let tracked = self
            .tracking
            .as_deref()
            .and_then(|id| self.units.get(id))
            .map(|unit| unit.control_point(time_s, 0))
            .filter(|point| !point.is_not_running())
            .map(|point| point.position);

        Some(Frame {
            time_s,
            units,
            tracked,
        })
    }

    /// Follow `train_id`, or stop following with [`UNTRACKING`]. Returns
    /// `false` (and changes nothing) for an unknown train.
    pub fn set_tracking(&mut self, train_id: &str) -> bool {
        if self.units.contains_key(train_id) {
            self.tracking = Some(train_id.to_string());
        } else if train_id == UNTRACKING {
            self.tracking = None;
        } else {
            return false;
        }
        true
    }

    /// Tracked train id, or [`UNTRACKING`].
    pub fn tracking(&self) -> &str {
        self.tracking.as_deref().unwrap_or(UNTRACKING)
    }

    /// Head-coach position as `<lon> <lat> <alt>`.
    ///
    /// For [`ALL_TRAINS`] every running unit contributes `,<id> <lon> <lat> <alt>`.
    pub fn train_position(&self, train_id: &str, time_s: f64) -> String {
        if train_id.eq_ignore_ascii_case(ALL_TRAINS) {
            return self
                .units
                .iter()
                .filter(|(_, unit)| !unit.control_point(time_s, 0).is_not_running())
                .map(|(id, unit)| format!(",{id} {}", unit.position_summary(time_s)))
                .collect();
        }

        match self.units.get(train_id) {
            Some(unit) => unit.position_summary(time_s),
            None => NOT_FOUND.to_string(),
        }
    }

    pub fn train_timetable(&self, train_id: &str) -> String {
        self.units
            .get(train_id)
            .map_or_else(|| NOT_FOUND.to_string(), TrainUnit::timetable_summary)
    }

    /// Space-separated train ids.
    pub fn units_summary(&self) -> String {
        self.train_ids().collect::<Vec<_>>().join(" ")
    }
}

fn build_unit(
    document: &UnitDocument,
    defaults: UnitDefaults<'_>,
    catalog: &dyn LocomotiveCatalog,
    routes: &HashMap<String, String>,
    clock: &dyn TimeBase,
    config: &FleetConfig,
) -> Result<TrainUnit> {
    let key = document.route_key();
    let csv = routes.get(&key).ok_or_else(|| FleetError::MissingRoute {
        train: document.trainid.clone(),
        key: key.clone(),
    })?;

    let mut unit = TrainUnit::from_document(document, defaults, catalog, csv, config.motion.clone())?;
    unit.simulate_path(clock)?;
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rail_motion::{Locomotive, ServiceClock};

    const METERS_PER_DEGREE: f64 = 111_319.490_793_273_57;

    fn route_csv() -> String {
        (0..31)
            .map(|i| {
                let label = match i {
                    5 => "A,B",
                    25 => "B,B",
                    _ => "x,",
                };
                format!("0.0,{:.12},0.0,{label}\n", i as f64 * 100.0 / METERS_PER_DEGREE)
            })
            .collect()
    }

    fn field(units: &str) -> FieldDocument {
        FieldDocument::from_json(&format!(r#"{{"timezone":"+00:00","units":[{units}]}}"#)).unwrap()
    }

    fn unit_json(id: &str, route: &str, start: &str, end: &str) -> String {
        format!(
            r#"{{"trainid":"{id}","lineid":"L","route":"{route}","timetable":["{start}","A",4,"{end}","B",2]}}"#
        )
    }

    fn catalog() -> HashMap<String, Locomotive> {
        let mut catalog = HashMap::new();
        catalog.insert(
            "default".to_string(),
            Locomotive::new(vec![20, 20], vec!["a.glb".into(), "b.glb".into()]).unwrap(),
        );
        catalog
    }

    fn fleet(units: &str) -> Fleet {
        let routes = HashMap::from([("L_main".to_string(), route_csv())]);
        let clock = ServiceClock::utc(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        Fleet::from_field(&field(units), &routes, &catalog(), &clock, FleetConfig::default()).unwrap()
    }

    fn two_trains() -> Fleet {
        fleet(&format!(
            "{},{}",
            unit_json("202", "main", "0T10:00:00", "0T10:02:00"),
            unit_json("101", "main", "0T11:00:00", "0T11:02:00"),
        ))
    }

    #[test]
    fn test_ids_sorted_and_failures_skipped() {
        let fleet = fleet(&format!(
            "{},{},{}",
            unit_json("202", "main", "0T10:00:00", "0T10:02:00"),
            unit_json("101", "main", "0T11:00:00", "0T11:02:00"),
            unit_json("303", "branch", "0T11:00:00", "0T11:02:00"),
        ));
        assert_eq!(fleet.train_ids().collect::<Vec<_>>(), vec!["101", "202"]);
        assert_eq!(fleet.units_summary(), "101 202");
        assert_eq!(fleet.skipped().len(), 1);
        assert_eq!(fleet.skipped()[0].train_id, "303");
        assert!(fleet.skipped()[0].reason.contains("L_branch"));
    }

    #[test]
    fn test_duplicate_train_keeps_first() {
        let fleet = fleet(&format!(
            "{},{}",
            unit_json("101", "main", "0T10:00:00", "0T10:02:00"),
            unit_json("101", "main", "0T11:00:00", "0T11:02:00"),
        ));
        assert_eq!(fleet.len(), 1);
        assert_eq!(fleet.train_timetable("101"), "10:00:00,A,10:02:00,B,");
        assert_eq!(fleet.skipped().len(), 1);
    }

    #[test]
    fn test_missing_default_locomotive() {
        let routes = HashMap::new();
        let clock = ServiceClock::utc(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let field = FieldDocument::from_json(r#"{"locomotive":"e5","units":[]}"#).unwrap();
        let err = Fleet::from_field(&field, &routes, &catalog(), &clock, FleetConfig::default()).unwrap_err();
        assert!(matches!(err, FleetError::DefaultLocomotive(name) if name == "e5"));
    }

    #[test]
    fn test_update_ignores_small_backward_steps() {
        let mut fleet = two_trains();
        assert!(fleet.update(36_060.0).is_some());
        assert!(fleet.update(36_059.9).is_none());
        assert_eq!(fleet.last_time(), Some(36_060.0));

        // A large jump back is a deliberate seek.
        let frame = fleet.update(36_000.0).unwrap();
        assert_eq!(frame.time_s, 36_000.0);
        assert_eq!(fleet.last_time(), Some(36_000.0));
    }

    #[test]
    fn test_frame_contents() {
        let mut fleet = two_trains();
        let frame = fleet.update(36_060.0).unwrap();
        assert_eq!(frame.units.len(), 2);

        let running = frame.units.iter().find(|u| u.train_id.as_str() == "202").unwrap();
        // Two models, so two rendered coaches out of three tracks.
        assert_eq!(running.coaches.len(), 2);
        assert!(running.coaches.iter().all(|c| c.motion.is_running()));
        assert!(running.coaches.iter().all(|c| c.layer_position != DVec3::ZERO));

        let idle = frame.units.iter().find(|u| u.train_id.as_str() == "101").unwrap();
        assert!(idle.coaches.iter().all(|c| c.motion == Motion::NotRunning));
        assert!(frame.tracked.is_none());
    }

    #[test]
    fn test_tracking() {
        let mut fleet = two_trains();
        assert_eq!(fleet.tracking(), UNTRACKING);
        assert!(!fleet.set_tracking("999"));
        assert!(fleet.set_tracking("202"));
        assert_eq!(fleet.tracking(), "202");

        assert!(fleet.update(36_060.0).unwrap().tracked.is_some());
        assert!(fleet.update(50_000.0).unwrap().tracked.is_none());

        assert!(fleet.set_tracking(UNTRACKING));
        assert_eq!(fleet.tracking(), UNTRACKING);
    }

    #[test]
    fn test_train_position() {
        let fleet = two_trains();
        assert_eq!(fleet.train_position("999", 36_060.0), "Not found");
        assert_eq!(fleet.train_position("101", 36_060.0), "Not running 36060.000000");
        assert_eq!(fleet.train_timetable("999"), "Not found");

        let single = fleet.train_position("202", 36_060.0);
        let all = fleet.train_position("ALL", 36_060.0);
        assert_eq!(all, format!(",202 {single}"));
        assert_eq!(fleet.train_position("all", 50_000.0), "");
    }
}
