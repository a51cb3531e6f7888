//! Service clock: turns timetable timestamps into simulation seconds.
//!
//! Timestamps are local wall times relative to a service day, written
//! `<day>T<HH>:<MM>:<SS>` (`0T14:54:00`, `1T00:10:00`). Simulation seconds are
//! counted from midnight UTC of the base date.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc};

use crate::models::traits::TimeBase;
use crate::models::types::{MotionError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServiceClock {
    base: NaiveDateTime,
    offset: FixedOffset,
}

impl ServiceClock {
    /// Clock for `base_date` in a `±HH:MM` timezone.
    pub fn new(base_date: NaiveDate, timezone: &str) -> Result<Self> {
        Ok(Self {
            base: base_date.and_time(NaiveTime::MIN),
            offset: parse_offset(timezone)?,
        })
    }

    pub fn utc(base_date: NaiveDate) -> Self {
        Self {
            base: base_date.and_time(NaiveTime::MIN),
            offset: Utc.fix(),
        }
    }

    pub fn base_date(&self) -> NaiveDate {
        self.base.date()
    }

    /// Minutes to add to local time to reach UTC (`+09:00` gives -540).
    pub fn timezone_minutes(&self) -> i32 {
        -self.offset.local_minus_utc() / 60
    }

    /// Local wall time of a timetable timestamp.
    pub fn local_time(&self, timestamp: &str) -> Result<NaiveDateTime> {
        let invalid = || MotionError::InvalidTimestamp(timestamp.to_string());

        let (day, clock) = timestamp.trim().split_once('T').ok_or_else(invalid)?;
        let day: i64 = day.parse().map_err(|_| invalid())?;

        let mut fields = clock.split(':');
        let mut next_field = || -> Result<i64> {
            fields
                .next()
                .and_then(|f| f.parse::<i64>().ok())
                .filter(|v| *v >= 0)
                .ok_or_else(invalid)
        };
        let (hours, minutes, seconds) = (next_field()?, next_field()?, next_field()?);
        if minutes >= 60 || seconds >= 60 || fields.next().is_some() {
            return Err(invalid());
        }

        let elapsed = day * 86_400 + hours * 3_600 + minutes * 60 + seconds;
        TimeDelta::try_seconds(elapsed)
            .and_then(|delta| self.base.checked_add_signed(delta))
            .ok_or_else(invalid)
    }

    pub fn duration_seconds_from_base(&self, timestamp: &str) -> Result<f64> {
        let local = self.local_time(timestamp)?;
        let instant = self
            .offset
            .from_local_datetime(&local)
            .single()
            .ok_or_else(|| MotionError::InvalidTimestamp(timestamp.to_string()))?;
        Ok((instant.naive_utc() - self.base).num_seconds() as f64)
    }

    /// Seconds between two timestamps (`later - earlier`).
    pub fn duration_seconds_between(&self, later: &str, earlier: &str) -> Result<f64> {
        Ok(self.duration_seconds_from_base(later)? - self.duration_seconds_from_base(earlier)?)
    }
}

impl TimeBase for ServiceClock {
    fn duration_seconds_from_base(&self, timestamp: &str) -> Result<f64> {
        ServiceClock::duration_seconds_from_base(self, timestamp)
    }
}

/// Parse a `±HH:MM` offset. A missing sign means east of UTC.
pub fn parse_offset(timezone: &str) -> Result<FixedOffset> {
    let invalid = || MotionError::InvalidTimezone(timezone.to_string());
    let text = timezone.trim();

    let (sign, rest) = match text.as_bytes().first() {
        Some(b'-') => (-1, &text[1..]),
        Some(b'+') => (1, &text[1..]),
        _ => (1, text),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..=23).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3_600 + minutes * 60)).ok_or_else(invalid)
}
