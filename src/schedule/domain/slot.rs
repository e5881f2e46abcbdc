//! Time and place value types for visits.

use super::ScheduleDomainError;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Planned time window of a visit.
///
/// Construction guarantees `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledSlot {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl ScheduledSlot {
    /// Creates a validated slot.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::InvalidSlot`] when `from` is after `to`.
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, ScheduleDomainError> {
        if from > to {
            return Err(ScheduleDomainError::InvalidSlot { from, to });
        }
        Ok(Self { from, to })
    }

    /// Returns the slot start.
    #[must_use]
    pub const fn starts_at(&self) -> DateTime<Utc> {
        self.from
    }

    /// Returns the slot end.
    #[must_use]
    pub const fn ends_at(&self) -> DateTime<Utc> {
        self.to
    }

    /// Returns a slot with either bound replaced, validated as a whole.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::InvalidSlot`] when the merged bounds
    /// are inverted.
    pub fn with_bounds(
        self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Self, ScheduleDomainError> {
        Self::new(from.unwrap_or(self.from), to.unwrap_or(self.to))
    }
}

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub long: f64,
}

impl Location {
    /// Creates a location.
    #[must_use]
    pub const fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }
}

/// Time and place recorded at check-in or check-out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisitStamp {
    /// Recorded instant.
    pub time: DateTime<Utc>,
    /// Recorded position.
    pub location: Location,
}

impl VisitStamp {
    /// Creates a stamp.
    #[must_use]
    pub const fn new(time: DateTime<Utc>, location: Location) -> Self {
        Self { time, location }
    }
}

/// Half-open calendar day `[start, end)` expressed in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DayWindow {
    /// Returns the day containing `now`, bounded by midnight to midnight in
    /// the time zone of `now`.
    ///
    /// On days where midnight is ambiguous the earliest instant is used.
    /// Where a clock change skips midnight, the day starts at the first
    /// local minute after the gap.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleDomainError::UnresolvableDay`] when no minute of a
    /// bounding day can be mapped to an instant.
    pub fn containing<Tz: TimeZone>(now: &DateTime<Tz>) -> Result<Self, ScheduleDomainError> {
        let zone = now.timezone();
        let today = now.date_naive();
        let unresolvable = || ScheduleDomainError::UnresolvableDay(today);
        let tomorrow = today.succ_opt().ok_or_else(unresolvable)?;

        let start = start_of_day(&zone, today).ok_or_else(unresolvable)?;
        let end = start_of_day(&zone, tomorrow).ok_or_else(unresolvable)?;

        Ok(Self {
            start: start.with_timezone(&Utc),
            end: end.with_timezone(&Utc),
        })
    }

    /// Returns the inclusive window start.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the exclusive window end.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns whether `instant` falls inside the window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

const MINUTES_PER_DAY: i64 = 24 * 60;

/// First instant of `date` in `zone`, skipping a gap that swallows midnight.
fn start_of_day<Tz: TimeZone>(zone: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..MINUTES_PER_DAY).find_map(|minute| {
        zone.from_local_datetime(&(midnight + Duration::minutes(minute)))
            .earliest()
    })
}
