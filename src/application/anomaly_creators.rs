// Anomaly creators - one mutation per anomaly type
use crate::application::random::SeededRandom;
use crate::domain::anomaly::{AnomalyInfo, AnomalyType};
use crate::domain::error::AnomalyError;
use crate::domain::telemetry::{Point, Telemetry};

/// Mutates the points of a series that fall inside an anomaly window.
///
/// Creators that change values work in three steps: collect the points in
/// the window, build replacements with the same timestamps, then remove the
/// old points and add the new ones. Replacements are built before anything is
/// removed, so a failing creator leaves the series untouched.
pub trait AnomalyCreator: Send + Sync {
    fn anomaly_type(&self) -> AnomalyType;

    fn create(
        &self,
        telemetry: &mut Telemetry,
        info: &AnomalyInfo,
        random: &mut SeededRandom,
    ) -> Result<(), AnomalyError>;
}

/// Every creator this crate ships, one per [`AnomalyType`].
pub fn all_creators() -> Vec<Box<dyn AnomalyCreator>> {
    vec![
        Box::new(DataGapAnomalyCreator),
        Box::new(PassThroughAnomalyCreator::new(AnomalyType::DecreasedData)),
        Box::new(PassThroughAnomalyCreator::new(AnomalyType::IncreasedData)),
        Box::new(SettingValueAnomalyCreator),
        Box::new(ShiftedDataAnomalyCreator),
        Box::new(PassThroughAnomalyCreator::new(AnomalyType::ZeroValues)),
    ]
}

fn replace_points(telemetry: &mut Telemetry, info: &AnomalyInfo, new_points: Vec<Point>) {
    telemetry.remove_range(info.start(), info.end());
    for point in new_points {
        telemetry.add(point);
    }
}

pub struct SettingValueAnomalyCreator;

impl AnomalyCreator for SettingValueAnomalyCreator {
    fn anomaly_type(&self) -> AnomalyType {
        AnomalyType::SetValues
    }

    fn create(
        &self,
        telemetry: &mut Telemetry,
        info: &AnomalyInfo,
        _random: &mut SeededRandom,
    ) -> Result<(), AnomalyError> {
        let new_points = telemetry
            .points_in_range(info.start(), info.end())
            .into_iter()
            .map(|point| {
                let value = point.value.cast(info.setting_value).ok_or(
                    AnomalyError::UnsupportedValue {
                        anomaly: AnomalyType::SetValues,
                        kind: point.value.kind(),
                    },
                )?;
                Ok::<_, AnomalyError>(Point::new(point.ts, value))
            })
            .collect::<Result<Vec<_>, AnomalyError>>()?;

        replace_points(telemetry, info, new_points);
        Ok(())
    }
}

pub struct ShiftedDataAnomalyCreator;

impl AnomalyCreator for ShiftedDataAnomalyCreator {
    fn anomaly_type(&self) -> AnomalyType {
        AnomalyType::ShiftedData
    }

    fn create(
        &self,
        telemetry: &mut Telemetry,
        info: &AnomalyInfo,
        random: &mut SeededRandom,
    ) -> Result<(), AnomalyError> {
        let old_points = telemetry.points_in_range(info.start(), info.end());

        let mut new_points = Vec::with_capacity(old_points.len());
        for point in old_points {
            let unsupported = || AnomalyError::UnsupportedValue {
                anomaly: AnomalyType::ShiftedData,
                kind: point.value.kind(),
            };
            let old_value = point.value.as_f64().ok_or_else(unsupported)?;
            let noise = random.noise(info.noise_amplitude);
            let shifted = old_value * info.coefficient + info.shift_value + noise;
            let value = point.value.cast(shifted).ok_or_else(unsupported)?;
            new_points.push(Point::new(point.ts, value));
        }

        replace_points(telemetry, info, new_points);
        Ok(())
    }
}

pub struct DataGapAnomalyCreator;

impl AnomalyCreator for DataGapAnomalyCreator {
    fn anomaly_type(&self) -> AnomalyType {
        AnomalyType::DataGap
    }

    fn create(
        &self,
        telemetry: &mut Telemetry,
        info: &AnomalyInfo,
        _random: &mut SeededRandom,
    ) -> Result<(), AnomalyError> {
        let removed = telemetry.remove_range(info.start(), info.end());
        tracing::debug!(
            "Removed {} points from '{}' for data gap",
            removed.len(),
            telemetry.name()
        );
        Ok(())
    }
}

/// Registered so that lookups for these types succeed, but leaves the series
/// unchanged. DECREASED_DATA, INCREASED_DATA and ZERO_VALUES have no agreed
/// shape yet.
pub struct PassThroughAnomalyCreator {
    anomaly_type: AnomalyType,
}

impl PassThroughAnomalyCreator {
    pub fn new(anomaly_type: AnomalyType) -> Self {
        Self { anomaly_type }
    }
}

impl AnomalyCreator for PassThroughAnomalyCreator {
    fn anomaly_type(&self) -> AnomalyType {
        self.anomaly_type
    }

    fn create(
        &self,
        _telemetry: &mut Telemetry,
        _info: &AnomalyInfo,
        _random: &mut SeededRandom,
    ) -> Result<(), AnomalyError> {
        Ok(())
    }
}
