//! Timetables and the station visits they imply.
//!
//! A timetable document is a flat JSON array of `[timestamp, station, code]`
//! triples. Consecutive events at the same station (arrive, then depart) form
//! one *visit*; a station that reappears later is a separate visit.

use serde_json::Value;

use crate::identifiers::StationLabel;
use crate::models::types::{EventKind, MotionError, Result, TimetableEvent};

/// One stop or passage at a station, covering one or more consecutive events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StationVisit {
    pub station: StationLabel,
    /// Kind of the first event of the visit.
    pub kind: EventKind,
    /// Index of the first event of the visit.
    pub first_event: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timetable {
    events: Vec<TimetableEvent>,
    visits: Vec<StationVisit>,
    event_visits: Vec<usize>,
}

impl Timetable {
    pub fn from_events(events: Vec<TimetableEvent>) -> Result<Self> {
        if events.is_empty() {
            return Err(MotionError::InvalidTimetable("no events".into()));
        }

        let mut visits: Vec<StationVisit> = Vec::new();
        let mut event_visits = Vec::with_capacity(events.len());
        for (index, event) in events.iter().enumerate() {
            let continues = visits
                .last()
                .is_some_and(|visit| visit.station == event.station);
            if !continues {
                visits.push(StationVisit {
                    station: event.station.clone(),
                    kind: event.kind,
                    first_event: index,
                });
            }
            event_visits.push(visits.len() - 1);
        }

        Ok(Self {
            events,
            visits,
            event_visits,
        })
    }

    /// Decode the `timetable` array of a unit document.
    pub fn from_json(value: &Value) -> Result<Self> {
        let entries = value
            .as_array()
            .ok_or_else(|| MotionError::InvalidTimetable("expected an array".into()))?;
        if entries.len() % 3 != 0 {
            return Err(MotionError::InvalidTimetable(format!(
                "{} entries is not a list of triples",
                entries.len()
            )));
        }

        let events = entries
            .chunks_exact(3)
            .enumerate()
            .map(|(index, triple)| decode_event(index, triple))
            .collect::<Result<Vec<_>>>()?;

        Self::from_events(events)
    }

    pub fn events(&self) -> &[TimetableEvent] {
        &self.events
    }

    pub fn visits(&self) -> &[StationVisit] {
        &self.visits
    }

    /// Visit that the event at `event_index` belongs to.
    pub fn visit_of(&self, event_index: usize) -> Option<usize> {
        self.event_visits.get(event_index).copied()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// `HH:MM:SS,<station>,` for every event.
    pub fn summary(&self) -> String {
        self.events
            .iter()
            .map(|event| format!("{},{},", event.clock_time(), event.station))
            .collect()
    }
}

fn decode_event(index: usize, triple: &[Value]) -> Result<TimetableEvent> {
    let invalid = |what: &str| MotionError::InvalidTimetable(format!("event {index}: {what}"));

    let timestamp = triple[0].as_str().ok_or_else(|| invalid("timestamp is not a string"))?;
    let station = triple[1].as_str().ok_or_else(|| invalid("station is not a string"))?;
    let code = match &triple[2] {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| invalid("event code is not an integer"))?;
    let kind = EventKind::from_code(code)
        .ok_or_else(|| invalid(&format!("unknown event code {code}")))?;

    Ok(TimetableEvent::new(timestamp, station, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eurostar() -> Value {
        json!([
            "0T16:56:00", "Brussels Midi", 4,
            "0T17:34:00", "Lille Europe", 2,
            "0T17:35:00", "Lille Europe", 4,
            "0T18:10:00", "Calais Frethun", 7,
            "0T19:15:00", "London St. Pancras Intl", 2
        ])
    }

    #[test]
    fn test_decode_and_visits() {
        let timetable = Timetable::from_json(&eurostar()).unwrap();
        assert_eq!(timetable.len(), 5);
        assert_eq!(timetable.visits().len(), 4);

        assert_eq!(timetable.visit_of(1), Some(1));
        assert_eq!(timetable.visit_of(2), Some(1));
        assert_eq!(timetable.visit_of(3), Some(2));
        assert_eq!(timetable.visit_of(5), None);

        let lille = &timetable.visits()[1];
        assert_eq!(lille.station.as_str(), "Lille Europe");
        assert_eq!(lille.kind, EventKind::Arrival);
        assert_eq!(lille.first_event, 1);
        assert_eq!(timetable.visits()[2].kind, EventKind::Through);
    }

    #[test]
    fn test_revisited_station_is_a_new_visit() {
        let timetable = Timetable::from_json(&json!([
            "0T10:00:00", "A", 4,
            "0T10:05:00", "B", 2,
            "0T10:06:00", "B", 4,
            "0T10:11:00", "A", 2
        ]))
        .unwrap();
        let names: Vec<&str> = timetable
            .visits()
            .iter()
            .map(|v| v.station.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B", "A"]);
    }

    #[test]
    fn test_string_codes_accepted() {
        let timetable = Timetable::from_json(&json!(["0T10:00:00", "A", "4"])).unwrap();
        assert_eq!(timetable.events()[0].kind, EventKind::Departure);
    }

    #[test]
    fn test_malformed_timetables() {
        assert!(Timetable::from_json(&json!({})).is_err());
        assert!(Timetable::from_json(&json!([])).is_err());
        assert!(Timetable::from_json(&json!(["0T10:00:00", "A"])).is_err());
        assert!(Timetable::from_json(&json!(["0T10:00:00", "A", 3])).is_err());
        assert!(Timetable::from_json(&json!([36000, "A", 4])).is_err());
    }

    #[test]
    fn test_summary() {
        let timetable = Timetable::from_json(&eurostar()).unwrap();
        assert!(timetable
            .summary()
            .starts_with("16:56:00,Brussels Midi,17:34:00,Lille Europe,"));
    }
}
