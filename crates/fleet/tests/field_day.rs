//! A small field in a non-UTC timezone, driven frame by frame.

use std::collections::HashMap;

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use rail_fleet::motion::spatial::geocentric_to_geodetic;
use rail_fleet::motion::Locomotive;
use rail_fleet::prelude::*;

const METERS_PER_DEGREE: f64 = 111_319.490_793_273_57;

const FIELD: &str = r#"{
    "timezone": "+09:00",
    "description": "shuttle",
    "locomotive": "ec",
    "units": [
        {
            "trainid": "S1",
            "lineid": "sh",
            "route": "up",
            "direction": "east",
            "timetable": ["0T09:00:00", "A", 4, "0T09:01:40", "B", 2, "0T09:02:40", "B", 4, "0T09:04:20", "C", 2]
        },
        {
            "trainid": "S2",
            "lineid": "sh",
            "route": "up",
            "locomotive": "long",
            "timetable": ["0T09:10:00", "A", 7, "0T09:13:20", "C", 7]
        },
        {
            "trainid": "S3",
            "lineid": "sh",
            "route": "up",
            "timetable": ["0T09:00:00", "Nowhere", 4]
        }
    ]
}"#;

fn route_csv() -> String {
    let mut csv = String::new();
    for i in 0..41 {
        let label = match i {
            5 => "A,B",
            20 => "B,B",
            35 => "C,B",
            _ => "x,",
        };
        csv.push_str(&format!("0.0,{:.12},0.0,{label}\n", i as f64 * 100.0 / METERS_PER_DEGREE));
    }
    csv
}

fn fleet() -> Fleet {
    let field = FieldDocument::from_json(FIELD).unwrap();
    let clock = field.clock(NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()).unwrap();
    let catalog = HashMap::from([
        ("ec".to_string(), Locomotive::new(vec![20], vec!["ec.glb".into()]).unwrap()),
        (
            "long".to_string(),
            Locomotive::new(vec![20, 20, 20], vec!["a.glb".into(), "b.glb".into(), "c.glb".into()]).unwrap(),
        ),
    ]);
    let routes = HashMap::from([("sh_up".to_string(), route_csv())]);
    Fleet::from_field(&field, &routes, &catalog, &clock, FleetConfig::default()).unwrap()
}

fn head_m(fleet: &Fleet, train: &str, time_s: f64) -> f64 {
    let point = fleet.unit(train).unwrap().control_point(time_s, 0);
    assert!(!point.is_not_running(), "{train} not running at {time_s}");
    geocentric_to_geodetic(point.position).longitude_deg * METERS_PER_DEGREE
}

#[test]
fn test_field_setup() {
    let fleet = fleet();
    assert_eq!(fleet.units_summary(), "S1 S2");
    assert_eq!(fleet.skipped().len(), 1);
    assert_eq!(fleet.skipped()[0].train_id, "S3");

    let s1 = fleet.unit("S1").unwrap();
    assert_eq!(s1.locomotive_model_count(), 1);
    assert_eq!(s1.line_info(), "sh east up");
    assert_eq!(s1.marker(), "train.png");
    assert_eq!(fleet.unit("S2").unwrap().locomotive_model_count(), 3);
}

#[test]
fn test_stop_and_dwell_in_local_time() {
    let fleet = fleet();
    // 09:00 at +09:00 is the base instant.
    assert_abs_diff_eq!(head_m(&fleet, "S1", 0.0), 510.0, epsilon = 1e-3);
    assert_abs_diff_eq!(head_m(&fleet, "S1", 100.0), 2_010.0, epsilon = 1e-3);
    assert_abs_diff_eq!(head_m(&fleet, "S1", 130.0), 2_010.0, epsilon = 1e-3);
    assert_abs_diff_eq!(head_m(&fleet, "S1", 260.0), 3_510.0, epsilon = 1e-3);
    assert_eq!(fleet.train_position("S1", 261.0), "Not running 261.000000");
}

#[test]
fn test_through_run_is_linear() {
    let fleet = fleet();
    // 3000 m in 200 s with passes at both ends.
    let start = 600.0;
    for t in [0.0, 50.0, 120.0, 200.0] {
        assert_abs_diff_eq!(head_m(&fleet, "S2", start + t), 530.0 + 15.0 * t, epsilon = 1e-3);
    }
}

#[test]
fn test_frames_follow_tracked_train() {
    let mut fleet = fleet();
    assert!(fleet.set_tracking("S2"));

    let frame = fleet.update(650.0).unwrap();
    let tracked = frame.tracked.unwrap();
    assert_abs_diff_eq!(
        geocentric_to_geodetic(tracked).longitude_deg * METERS_PER_DEGREE,
        1_280.0,
        epsilon = 1e-3
    );

    let s1 = frame.units.iter().find(|u| u.train_id.as_str() == "S1").unwrap();
    assert_eq!(s1.coaches.len(), 1);
    assert!(!s1.coaches[0].motion.is_running());

    assert!(fleet.update(649.95).is_none());
    assert!(fleet.update(0.0).is_some());
    assert_eq!(fleet.train_position("all", 650.0), format!(",S2 {}", fleet.train_position("S2", 650.0)));
}
