//! Station anchor expansion.
//!
//! A raw route has one sample per station, but every coach of a train needs
//! its own stopping point. Expansion works in two passes:
//!
//! 1. Build a *template* polyline: the raw samples plus synthetic points that
//!    guarantee a train's length of track behind terminal stations and past
//!    sharp curves.
//! 2. Walk the timetable's station visits, copy the template between them and
//!    splice in one anchor per coach offset around each station, tagged with
//!    `(visit, coach_rank)` so tracks can find their anchors directly.

use tracing::{debug, warn};

use crate::config::MotionConfig;
use crate::geometry::{accumulate_distances, AnchorTag, RoutePoint, RouteGeometry};
use crate::identifiers::StationLabel;
use crate::models::locomotive::CoachOffsets;
use crate::models::timetable::Timetable;
use crate::models::types::{AnchorRole, MotionError, Result, StationKind};
use crate::spatial::queries::{
    geodesic_bearing, geodesic_destination, heading_change, reverse_bearing,
};

/// The per-unit polyline all coach tracks are built on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpandedGeometry {
    points: Vec<RoutePoint>,
    /// `anchors[visit][coach_rank]` is the index of that coach's anchor.
    anchors: Vec<Vec<usize>>,
}

impl ExpandedGeometry {
    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn visit_count(&self) -> usize {
        self.anchors.len()
    }

    /// Number of coach anchors placed at every visit.
    pub fn anchor_ranks(&self) -> usize {
        self.anchors.first().map_or(0, Vec::len)
    }

    pub fn anchor_index(&self, visit: usize, coach_rank: usize) -> Option<usize> {
        self.anchors.get(visit)?.get(coach_rank).copied()
    }

    pub fn anchor(&self, visit: usize, coach_rank: usize) -> Option<&RoutePoint> {
        self.anchor_index(visit, coach_rank)
            .and_then(|index| self.points.get(index))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// A coach anchor before it is spliced: it sits on the template segment
/// starting at `segment`.
#[derive(Clone, Debug)]
struct PendingAnchor {
    segment: usize,
    coach_rank: usize,
    point: RoutePoint,
}

pub struct StationAnchorExpander<'a> {
    config: &'a MotionConfig,
}

impl<'a> StationAnchorExpander<'a> {
    pub fn new(config: &'a MotionConfig) -> Self {
        Self { config }
    }

    pub fn expand(
        &self,
        route: &RouteGeometry,
        timetable: &Timetable,
        offsets: &CoachOffsets,
    ) -> Result<ExpandedGeometry> {
        let template = self.template(&route.points);
        let stations = self.locate_visits(&template, timetable)?;
        let ascending = offsets.ascending();
        let rank_count = offsets.len();

        let mut points: Vec<RoutePoint> = Vec::with_capacity(template.len() + stations.len() * rank_count);
        let mut anchors = Vec::with_capacity(stations.len());
        let mut cursor: Option<usize> = None;

        for (visit_index, (visit, &station_index)) in timetable.visits().iter().zip(&stations).enumerate() {
            let pending: Vec<PendingAnchor> = ascending
                .iter()
                .map(|&(coach_rank, offset)| {
                    let (segment, (lat, lon)) = self.place_anchor(&template, station_index, offset);
                    let role = anchor_role(coach_rank, rank_count);
                    let mut point = RoutePoint::new(lat, lon, template[segment].altitude_m).with_station(
                        Some(visit.station.clone()),
                        StationKind::for_anchor(visit.kind, role),
                    );
                    point.anchor = Some(AnchorTag {
                        visit: visit_index,
                        coach_rank,
                    });
                    PendingAnchor {
                        segment,
                        coach_rank,
                        point,
                    }
                })
                .collect();

            let tail_segment = pending.first().map_or(station_index, |a| a.segment);
            let head_segment = pending.last().map_or(station_index, |a| a.segment);
            let start = cursor.unwrap_or(tail_segment);
            if start > tail_segment {
                warn!(
                    station = %visit.station,
                    start,
                    tail_segment,
                    "Station anchors overlap the previous station"
                );
            }
            let end = head_segment + 1;

            let mut visit_anchors = vec![0; rank_count];
            let mut pending = pending.into_iter().peekable();
            for index in start..end {
                points.push(through_sample(&template[index]));
                while let Some(anchor) = pending.next_if(|a| a.segment <= index) {
                    visit_anchors[anchor.coach_rank] = points.len();
                    points.push(anchor.point);
                }
            }
            for anchor in pending {
                visit_anchors[anchor.coach_rank] = points.len();
                points.push(anchor.point);
            }

            anchors.push(visit_anchors);
            cursor = Some(end.max(start));
        }

        accumulate_distances(&mut points);
        debug!(
            template = template.len(),
            expanded = points.len(),
            visits = anchors.len(),
            "Expanded route geometry"
        );

        Ok(ExpandedGeometry { points, anchors })
    }

    /// Raw samples plus endpoint and curve extensions, distances recomputed.
    fn template(&self, raw: &[RoutePoint]) -> Vec<RoutePoint> {
        let Some(last) = raw.len().checked_sub(1) else {
            return Vec::new();
        };
        let window = self.config.curve_window;
        let margin = self.config.curve_margin;

        let mut template = Vec::with_capacity(raw.len() + 2);
        if let Some(head) = self.extension_point(raw, 0, Direction::Forward) {
            template.push(head);
        }

        for (index, sample) in raw.iter().enumerate() {
            template.push(sample.clone());

            let interior = index > margin && index + margin < raw.len();
            if interior && index >= window && index + window <= last {
                let before = geodesic_bearing(raw[index - window].coordinates(), sample.coordinates());
                let after = geodesic_bearing(sample.coordinates(), raw[index + window].coordinates());
                if heading_change(before, after) >= self.config.sharp_turn_deg {
                    if let Some(point) = self.extension_point(raw, index, Direction::Backward) {
                        template.push(point);
                    }
                }
            }
        }

        if let Some(tail) = self.extension_point(raw, last, Direction::Backward) {
            template.push(tail);
        }

        accumulate_distances(&mut template);
        template
    }

    /// A synthetic point continuing the track away from the nearest station
    /// in `direction`, when that station is closer than a train's length.
    fn extension_point(&self, raw: &[RoutePoint], start: usize, direction: Direction) -> Option<RoutePoint> {
        let last = raw.len().checked_sub(1)?;
        let here = raw.get(start)?;

        let station = match direction {
            Direction::Forward => raw[start..]
                .iter()
                .position(RoutePoint::is_station)
                .map_or(last, |offset| start + offset),
            Direction::Backward => raw[..=start]
                .iter()
                .rposition(RoutePoint::is_station)
                .unwrap_or(0),
        };

        let distance = (raw[station].distance_m - here.distance_m).abs();
        let shortfall = self.config.min_train_length_m - distance;
        if shortfall <= 0.0 {
            return None;
        }

        // Look one sample ahead, or two if the station sits right here.
        let step = if station == start { 2 } else { 1 };
        let toward = match direction {
            Direction::Forward => (start + step).min(last),
            Direction::Backward => start.saturating_sub(step),
        };
        if toward == start {
            return None;
        }

        let bearing = reverse_bearing(geodesic_bearing(here.coordinates(), raw[toward].coordinates()));
        let (lat, lon) = geodesic_destination(here.coordinates(), bearing, shortfall);
        Some(RoutePoint::new(lat, lon, here.altitude_m))
    }

    /// Template index of every visit's station, searching forward from the
    /// previous visit so that revisited stations resolve in order.
    fn locate_visits(&self, template: &[RoutePoint], timetable: &Timetable) -> Result<Vec<usize>> {
        let mut from = 0;
        let mut stations = Vec::with_capacity(timetable.visits().len());
        for visit in timetable.visits() {
            let index = find_station(template, &visit.station, from)
                .ok_or_else(|| MotionError::StationNotFound(visit.station.clone()))?;
            stations.push(index);
            from = index + 1;
        }
        Ok(stations)
    }

    /// Place an anchor `offset` meters along the track from `station`.
    /// Returns the template segment it lies on and its coordinates.
    fn place_anchor(&self, template: &[RoutePoint], station: usize, offset: f64) -> (usize, (f64, f64)) {
        let window = self.config.anchor_search_window;
        let origin = &template[station];

        if offset == 0.0 {
            return (station, origin.coordinates());
        }

        if offset < 0.0 {
            let lowest = station.saturating_sub(window.saturating_sub(1));
            let found = (lowest..station)
                .rev()
                .find(|&i| origin.distance_m - template[i].distance_m > -offset);
            return match found {
                Some(i) => {
                    let along = (origin.distance_m - template[i].distance_m) + offset;
                    (i, towards(&template[i], &template[i + 1], along))
                }
                None => {
                    warn!(station, offset, "No sample far enough behind station, using window boundary");
                    (lowest, template[lowest].coordinates())
                }
            };
        }

        let highest = (station + window).min(template.len()).saturating_sub(1).max(station);
        let found = (station + 1..=highest).find(|&i| template[i].distance_m - origin.distance_m > offset);
        match found {
            Some(i) => {
                let along = offset - (template[i - 1].distance_m - origin.distance_m);
                (i - 1, towards(&template[i - 1], &template[i], along))
            }
            None => {
                warn!(station, offset, "No sample far enough ahead of station, using window boundary");
                (highest, template[highest].coordinates())
            }
        }
    }
}

fn towards(from: &RoutePoint, to: &RoutePoint, distance_m: f64) -> (f64, f64) {
    let bearing = geodesic_bearing(from.coordinates(), to.coordinates());
    geodesic_destination(from.coordinates(), bearing, distance_m)
}

fn find_station(points: &[RoutePoint], station: &StationLabel, from: usize) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, p)| p.station.as_ref() == Some(station))
        .map(|(index, _)| index)
}

fn through_sample(template: &RoutePoint) -> RoutePoint {
    RoutePoint::new(template.latitude_deg, template.longitude_deg, template.altitude_m)
        .with_station(None, StationKind::Through)
}

fn anchor_role(coach_rank: usize, rank_count: usize) -> AnchorRole {
    if coach_rank == 0 {
        AnchorRole::Head
    } else if coach_rank + 1 == rank_count {
        AnchorRole::Tail
    } else {
        AnchorRole::Middle
    }
}
