// Timestamp domain model - milliseconds since the Unix epoch
use chrono::{DateTime, TimeZone, Timelike, Utc};
use std::fmt;

const MILLIS_PER_HOUR: i64 = 3_600_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn of(ts: i64) -> Self {
        Self(ts)
    }

    pub fn get(&self) -> i64 {
        self.0
    }

    /// Render the timestamp with its wall-clock time in the given zone.
    /// The zone is display-only, nothing about it is stored.
    pub fn to_string_in<Tz>(&self, zone: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match zone.timestamp_millis_opt(self.0).single() {
            Some(date_time) => format!("Timestamp({}, {})", self.0, date_time.to_rfc3339()),
            None => format!("Timestamp({}, <out of range>)", self.0),
        }
    }

    /// Truncate to the start of the hour in the given zone.
    pub fn truncate_to_hour<Tz: TimeZone>(&self, zone: &Tz) -> Self {
        let Some(date_time) = zone.timestamp_millis_opt(self.0).single() else {
            return Self(self.0 - self.0.rem_euclid(MILLIS_PER_HOUR));
        };
        let truncated = date_time
            .with_nanosecond(0)
            .and_then(|d| d.with_second(0))
            .and_then(|d| d.with_minute(0));
        match truncated {
            Some(d) => Self(d.timestamp_millis()),
            None => Self(self.0 - self.0.rem_euclid(MILLIS_PER_HOUR)),
        }
    }

    /// `None` once the result leaves the i64 millisecond range.
    pub fn checked_plus_hours(&self, hours: i64) -> Option<Self> {
        hours
            .checked_mul(MILLIS_PER_HOUR)
            .and_then(|delta| self.0.checked_add(delta))
            .map(Self)
    }

    pub fn to_date_time<Tz: TimeZone>(&self, zone: &Tz) -> Option<DateTime<Tz>> {
        zone.timestamp_millis_opt(self.0).single()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_in(&Utc))
    }
}

impl From<i64> for Timestamp {
    fn from(ts: i64) -> Self {
        Self(ts)
    }
}

/// Overlap of an entity's lifetime `[from, to]` with the generation window,
/// `None` when they are disjoint.
pub fn date_range_intersection(
    from: Timestamp,
    to: Timestamp,
    generation_from: Timestamp,
    generation_to: Timestamp,
) -> Option<(Timestamp, Timestamp)> {
    let latest_start = from.max(generation_from);
    let earliest_end = to.min(generation_to);

    (latest_start <= earliest_end).then_some((latest_start, earliest_end))
}

/// With `full_generation` the whole generation window is used regardless of
/// the entity's own lifetime.
pub fn calculate_date_range(
    from: Timestamp,
    to: Timestamp,
    generation_from: Timestamp,
    generation_to: Timestamp,
    full_generation: bool,
) -> Option<(Timestamp, Timestamp)> {
    if full_generation {
        return Some((generation_from, generation_to));
    }
    date_range_intersection(from, to, generation_from, generation_to)
}
