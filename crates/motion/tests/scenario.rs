//! End-to-end run of a two-coach train over a short equatorial route.

use std::collections::HashMap;

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use rail_motion::prelude::*;
use rail_motion::spatial::geocentric_to_geodetic;

const METERS_PER_DEGREE: f64 = 111_319.490_793_273_57;

/// 31 samples 100 m apart; A at 500 m, B at 2500 m.
fn route_csv() -> String {
    let mut csv = String::new();
    for i in 0..31 {
        let station = match i {
            5 => "A,B",
            25 => "B,B",
            _ => "x,",
        };
        csv.push_str(&format!("0.0,{:.12},0.0,{station}\n", i as f64 * 100.0 / METERS_PER_DEGREE));
        if i == 15 {
            csv.push_str("#,ly=12.0\n");
        }
    }
    csv
}

const UNIT: &str = r#"{
    "trainid": "S1",
    "lineid": "east",
    "route": "main",
    "direction": "outbound",
    "marker": "default",
    "locomotive": "default",
    "timetable": ["0T10:00:00", "A", 4, "0T10:02:00", "B", 2]
}"#;

fn simulated_unit() -> TrainUnit {
    let locomotive = Locomotive::new(vec![20, 20], vec!["lead.glb".into(), "trailer.glb".into()]).unwrap();
    let catalog: HashMap<String, Locomotive> = HashMap::new();
    let mut unit = TrainUnit::setup(
        UNIT,
        UnitDefaults {
            marker: "icon.png",
            locomotive: &locomotive,
        },
        &catalog,
        &route_csv(),
        MotionConfig::default(),
    )
    .unwrap();
    let clock = ServiceClock::utc(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    unit.simulate_path(&clock).unwrap();
    unit
}

fn along_track_m(point: ControlPoint) -> f64 {
    geocentric_to_geodetic(point.position).longitude_deg * METERS_PER_DEGREE
}

#[test]
fn test_coaches_start_and_end_at_their_anchors() {
    let unit = simulated_unit();
    let (start, end) = (36_000.0, 36_120.0);

    // Offsets are +20, 0 and -20 m around each station.
    for (coach, offset) in [(0, 20.0), (1, 0.0), (2, -20.0)] {
        let at_start = unit.control_point(start, coach);
        let at_end = unit.control_point(end, coach);
        assert_abs_diff_eq!(along_track_m(at_start), 500.0 + offset, epsilon = 1e-3);
        assert_abs_diff_eq!(along_track_m(at_end), 2_500.0 + offset, epsilon = 1e-3);
    }
}

#[test]
fn test_not_running_outside_the_schedule() {
    let unit = simulated_unit();
    for coach in 0..unit.coach_count() {
        assert_eq!(unit.control_point(36_121.0, coach), ControlPoint::NOT_RUNNING);
        assert_eq!(unit.control_point(35_999.0, coach), ControlPoint::NOT_RUNNING);
        assert!(unit.control_point(36_121.0, coach).is_not_running());
    }
}

#[test]
fn test_halfway_at_half_time() {
    let unit = simulated_unit();
    // The trapezoid is symmetric: half the distance at half the time.
    let head = unit.control_point(36_060.0, 0);
    assert_abs_diff_eq!(along_track_m(head), 1_520.0, epsilon = 1e-3);

    // Early in the leg the train is still accelerating.
    let early = along_track_m(unit.control_point(36_006.0, 0)) - 520.0;
    let cruise_speed = 2_000.0 / (0.89 * 120.0);
    assert!(early > 0.0 && early < cruise_speed * 6.0, "{early}");
}

#[test]
fn test_layer_track_follows_annotation() {
    let unit = simulated_unit();
    // Coach 1 sits on the centre anchor, which passes the 1500 m sample at
    // the half-way time.
    let layer = unit.control_point_layer(36_060.0, 1);
    assert_abs_diff_eq!(geocentric_to_geodetic(layer).altitude_m, 12.0, epsilon = 1e-3);
    let primary = unit.control_point(36_060.0, 1).position;
    assert_abs_diff_eq!(geocentric_to_geodetic(primary).altitude_m, 0.0, epsilon = 1e-3);
}

#[test]
fn test_summaries() {
    let unit = simulated_unit();
    assert_eq!(unit.line_info(), "east outbound main");
    assert_eq!(unit.timetable_summary(), "10:00:00,A,10:02:00,B,");
    assert_eq!(unit.distance_summary(), "A,0.000000,B,2000.000000,");
    assert_eq!(unit.position_summary(40_000.0), "Not running 40000.000000");
    assert_eq!(unit.locomotive_model_count(), 2);
}
