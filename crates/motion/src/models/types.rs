//! Core data types and enums for timetables and route samples.

use crate::identifiers::*;

// ============================================================================
// Enums
// ============================================================================

/// What a route sample represents.
///
/// Raw route files only produce `Normal`, `Through` and `Undefined`. The
/// head/tail variants tag the outermost coach anchors synthesized at a
/// timetabled station.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StationKind {
    #[default]
    Undefined,
    Normal,
    NormalHead,
    NormalTail,
    Through,
    ThroughHead,
    ThroughTail,
}

/// Position of a coach anchor within the set synthesized for one station visit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnchorRole {
    Head,
    Middle,
    Tail,
}

impl StationKind {
    /// Station type column of a route file (`B` stop, `V` pass).
    pub fn from_route_column(column: &str) -> Self {
        match column.trim() {
            "B" => Self::Normal,
            "V" => Self::Through,
            _ => Self::Undefined,
        }
    }

    /// Kind given to a coach anchor synthesized for an event of `event` kind.
    pub fn for_anchor(event: EventKind, role: AnchorRole) -> Self {
        match (event.stops(), role) {
            (true, AnchorRole::Head) => Self::NormalHead,
            (true, AnchorRole::Middle) => Self::Normal,
            (true, AnchorRole::Tail) => Self::NormalTail,
            (false, AnchorRole::Head) => Self::ThroughHead,
            (false, AnchorRole::Middle) => Self::Through,
            (false, AnchorRole::Tail) => Self::ThroughTail,
        }
    }
}

/// Timetable event type, with the wire codes used by timetable documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventKind {
    Arrival = 2,
    Departure = 4,
    Through = 7,
}

impl EventKind {
    pub fn from_code(value: i64) -> Option<Self> {
        match value {
            2 => Some(Self::Arrival),
            4 => Some(Self::Departure),
            7 => Some(Self::Through),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether the train stands at the station for this event.
    pub fn stops(self) -> bool {
        !matches!(self, Self::Through)
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// A single timetable entry: a stop or a passage at a named station.
///
/// The timestamp is kept in its document form (`<day>T<HH>:<MM>:<SS>`);
/// converting it to simulation seconds is the job of a [`TimeBase`].
///
/// [`TimeBase`]: crate::models::traits::TimeBase
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimetableEvent {
    pub timestamp: String,
    pub station: StationLabel,
    pub kind: EventKind,
}

impl TimetableEvent {
    pub fn new(timestamp: impl Into<String>, station: impl Into<StationLabel>, kind: EventKind) -> Self {
        Self {
            timestamp: timestamp.into(),
            station: station.into(),
            kind,
        }
    }

    /// Wall-clock part of the timestamp, without the day prefix.
    pub fn clock_time(&self) -> &str {
        self.timestamp
            .split_once('T')
            .map(|(_, time)| time)
            .unwrap_or(&self.timestamp)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MotionError {
    #[error("Invalid route geometry at line {line}: {reason}")]
    InvalidGeometry { line: usize, reason: String },

    #[error("Invalid timetable: {0}")]
    InvalidTimetable(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Station not found on route: {0}")]
    StationNotFound(StationLabel),

    #[error("Locomotive not found: {0}")]
    LocomotiveNotFound(String),

    #[error("Invalid locomotive: {0}")]
    InvalidLocomotive(String),

    #[error("Coach {coach} out of range (unit has {count})")]
    CoachOutOfRange { coach: usize, count: usize },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MotionError>;
