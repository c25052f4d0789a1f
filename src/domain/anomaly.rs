// Anomaly descriptor domain model
use super::error::AnomalyError;
use super::timestamp::Timestamp;
use serde::Deserialize;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyType {
    DataGap,
    DecreasedData,
    IncreasedData,
    SetValues,
    ShiftedData,
    ZeroValues,
}

impl AnomalyType {
    pub const ALL: [AnomalyType; 6] = [
        AnomalyType::DataGap,
        AnomalyType::DecreasedData,
        AnomalyType::IncreasedData,
        AnomalyType::SetValues,
        AnomalyType::ShiftedData,
        AnomalyType::ZeroValues,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyType::DataGap => "DATA_GAP",
            AnomalyType::DecreasedData => "DECREASED_DATA",
            AnomalyType::IncreasedData => "INCREASED_DATA",
            AnomalyType::SetValues => "SET_VALUES",
            AnomalyType::ShiftedData => "SHIFTED_DATA",
            AnomalyType::ZeroValues => "ZERO_VALUES",
        }
    }
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A distortion applied to the points in `[start_ts, end_ts)`.
///
/// Only the parameters relevant to `anomaly_type` are read: `setting_value`
/// by SET_VALUES, `coefficient`, `shift_value` and `noise_amplitude` by
/// SHIFTED_DATA.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnomalyInfo {
    pub start_ts: i64,
    pub end_ts: i64,
    #[serde(rename = "type")]
    pub anomaly_type: AnomalyType,
    #[serde(default)]
    pub setting_value: f64,
    #[serde(default)]
    pub shift_value: f64,
    #[serde(default = "default_coefficient")]
    pub coefficient: f64,
    #[serde(default)]
    pub noise_amplitude: f64,
}

fn default_coefficient() -> f64 {
    1.0
}

impl AnomalyInfo {
    pub fn builder(anomaly_type: AnomalyType, start_ts: i64, end_ts: i64) -> AnomalyInfoBuilder {
        AnomalyInfoBuilder {
            info: AnomalyInfo {
                start_ts,
                end_ts,
                anomaly_type,
                setting_value: 0.0,
                shift_value: 0.0,
                coefficient: default_coefficient(),
                noise_amplitude: 0.0,
            },
        }
    }

    pub fn start(&self) -> Timestamp {
        Timestamp::of(self.start_ts)
    }

    pub fn end(&self) -> Timestamp {
        Timestamp::of(self.end_ts)
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start() <= ts && ts < self.end()
    }

    pub fn validate(&self) -> Result<(), AnomalyError> {
        if self.start_ts >= self.end_ts {
            return Err(AnomalyError::InvalidWindow {
                start: self.start_ts,
                end: self.end_ts,
            });
        }
        if !(self.noise_amplitude >= 0.0 && (2.0 * self.noise_amplitude).is_finite()) {
            return Err(AnomalyError::InvalidNoiseAmplitude(self.noise_amplitude));
        }
        Ok(())
    }

    /// Orders by window start only. Used for display; the anomaly service
    /// applies windows in the order it is given.
    pub fn cmp_by_start(&self, other: &Self) -> Ordering {
        self.start_ts.cmp(&other.start_ts)
    }
}

pub struct AnomalyInfoBuilder {
    info: AnomalyInfo,
}

impl AnomalyInfoBuilder {
    pub fn setting_value(mut self, value: f64) -> Self {
        self.info.setting_value = value;
        self
    }

    pub fn shift_value(mut self, value: f64) -> Self {
        self.info.shift_value = value;
        self
    }

    pub fn coefficient(mut self, value: f64) -> Self {
        self.info.coefficient = value;
        self
    }

    pub fn noise_amplitude(mut self, value: f64) -> Self {
        self.info.noise_amplitude = value;
        self
    }

    pub fn build(self) -> AnomalyInfo {
        self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_end_exclusive() {
        let info = AnomalyInfo::builder(AnomalyType::DataGap, 1000, 3000).build();
        assert!(!info.contains(Timestamp::of(999)));
        assert!(info.contains(Timestamp::of(1000)));
        assert!(info.contains(Timestamp::of(2999)));
        assert!(!info.contains(Timestamp::of(3000)));
    }

    #[test]
    fn test_validate_rejects_empty_window() {
        let info = AnomalyInfo::builder(AnomalyType::SetValues, 3000, 3000).build();
        assert!(matches!(
            info.validate(),
            Err(AnomalyError::InvalidWindow { start: 3000, end: 3000 })
        ));

        let reversed = AnomalyInfo::builder(AnomalyType::SetValues, 4000, 3000).build();
        assert!(reversed.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_amplitude() {
        let info = AnomalyInfo::builder(AnomalyType::ShiftedData, 0, 10)
            .noise_amplitude(-1.0)
            .build();
        assert!(matches!(info.validate(), Err(AnomalyError::InvalidNoiseAmplitude(_))));
    }

    #[test]
    fn test_validate_rejects_overflowing_amplitude() {
        let info = AnomalyInfo::builder(AnomalyType::ShiftedData, 0, 2000)
            .noise_amplitude(1e308)
            .build();
        assert!(matches!(info.validate(), Err(AnomalyError::InvalidNoiseAmplitude(_))));

        let nan = AnomalyInfo::builder(AnomalyType::ShiftedData, 0, 2000)
            .noise_amplitude(f64::NAN)
            .build();
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_deserialize_defaults() {
        let info: AnomalyInfo = serde_json::from_str(
            r#"{"start_ts": 0, "end_ts": 100, "type": "SHIFTED_DATA", "shift_value": 300}"#,
        )
        .unwrap();
        assert_eq!(info.anomaly_type, AnomalyType::ShiftedData);
        assert_eq!(info.coefficient, 1.0);
        assert_eq!(info.shift_value, 300.0);
        assert_eq!(info.noise_amplitude, 0.0);
    }

    #[test]
    fn test_cmp_by_start() {
        let mut infos = vec![
            AnomalyInfo::builder(AnomalyType::SetValues, 500, 600).build(),
            AnomalyInfo::builder(AnomalyType::DataGap, 100, 900).build(),
        ];
        infos.sort_by(AnomalyInfo::cmp_by_start);
        assert_eq!(infos[0].anomaly_type, AnomalyType::DataGap);
    }
}
