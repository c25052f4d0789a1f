// Synthetic signal generator - hourly daily-cycle series with seeded noise
use crate::application::random::SeededRandom;
use crate::domain::telemetry::Telemetry;
use crate::domain::timestamp::Timestamp;
use crate::domain::value::Value;
use chrono::{FixedOffset, Timelike};
use serde::Deserialize;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Integer,
    Long,
    Double,
}

impl ValueKind {
    fn value(&self, raw: f64) -> Value {
        match self {
            ValueKind::Integer => Value::Integer(raw.round() as i32),
            ValueKind::Long => Value::Long(raw.round() as i64),
            ValueKind::Double => Value::Double(raw),
        }
    }
}

/// `value = min_value + noise + round(amplitude * sin(phase + PI / period_hours * (hour - 12)))`
/// where `noise` is `noise_width` times a random integer in
/// `[-noise_steps, noise_steps)`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SignalProfile {
    pub min_value: f64,
    pub amplitude: f64,
    #[serde(default)]
    pub noise_width: f64,
    #[serde(default)]
    pub noise_steps: i64,
    #[serde(default)]
    pub phase: f64,
    #[serde(default = "default_period_hours")]
    pub period_hours: f64,
}

fn default_period_hours() -> f64 {
    24.0
}

impl SignalProfile {
    fn sample(&self, hour: u32, random: &mut SeededRandom) -> f64 {
        let argument = hour as f64 - 12.0;
        let noise = random.random_number(-self.noise_steps, self.noise_steps) as f64 * self.noise_width;
        let wave = (self.amplitude * (self.phase + PI / self.period_hours * argument).sin()).round();
        self.min_value + noise + wave
    }
}

/// One point per hour from `start` (truncated to the hour) up to, not
/// including, `end`. Hours are read on the wall clock of `zone`.
pub fn generate_hourly(
    name: &str,
    profile: &SignalProfile,
    kind: ValueKind,
    start: Timestamp,
    end: Timestamp,
    zone: &FixedOffset,
    random: &mut SeededRandom,
) -> Telemetry {
    let mut telemetry = Telemetry::new(name);
    let mut iterated = start.truncate_to_hour(zone);

    while iterated < end {
        let hour = iterated
            .to_date_time(zone)
            .map(|date_time| date_time.hour())
            .unwrap_or_default();
        let raw = profile.sample(hour, random);
        telemetry.add_value(iterated.get(), kind.value(raw));
        match iterated.checked_plus_hours(1) {
            Some(next) => iterated = next,
            None => break,
        }
    }

    telemetry
}
