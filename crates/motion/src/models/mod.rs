//! Timetable, rolling stock and time-base models.

pub mod clock;
pub mod locomotive;
pub mod timetable;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use clock::ServiceClock;
pub use locomotive::{CoachOffsets, Locomotive};
pub use timetable::{StationVisit, Timetable};
pub use traits::{LocomotiveCatalog, TimeBase};
pub use types::{AnchorRole, EventKind, MotionError, Result, StationKind, TimetableEvent};
