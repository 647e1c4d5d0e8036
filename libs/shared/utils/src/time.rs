use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

/// Half-open interval `[start, end)`. Touching ranges do not overlap, which
/// is what lets back-to-back bookings coexist without a false conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Builds a range, rejecting empty or inverted spans.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        if end > start {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Range starting at `start` and lasting `duration`.
    pub fn span(start: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            start,
            end: start + duration,
        }
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Projects an instant into the weekday and local time-of-day of the
/// calendar's operating timezone.
pub fn weekday_and_time_in(tz: Tz, instant: DateTime<Utc>) -> (Weekday, NaiveTime) {
    let local = instant.with_timezone(&tz);
    (local.weekday(), local.time())
}

/// Calendar rows store weekdays as 0 (Sunday) through 6 (Saturday).
pub fn weekday_index(weekday: Weekday) -> i16 {
    match weekday {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}
