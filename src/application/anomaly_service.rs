// Anomaly service - Resolves anomaly types to creators and applies them
use crate::application::anomaly_creators::{AnomalyCreator, all_creators};
use crate::application::random::SeededRandom;
use crate::domain::anomaly::{AnomalyInfo, AnomalyType};
use crate::domain::error::AnomalyError;
use crate::domain::telemetry::Telemetry;
use std::collections::HashMap;

pub struct AnomalyService {
    creators: HashMap<AnomalyType, Box<dyn AnomalyCreator>>,
}

impl AnomalyService {
    pub fn new(creators: Vec<Box<dyn AnomalyCreator>>) -> Self {
        let creators = creators
            .into_iter()
            .map(|creator| (creator.anomaly_type(), creator))
            .collect();
        Self { creators }
    }

    /// Apply `anomalies` to `telemetry` in the given order.
    ///
    /// Windows may overlap, so order matters and is never changed here. Every
    /// window is validated and resolved before the first mutation; an invalid
    /// window or an unregistered type fails the whole pass.
    pub fn apply_anomalies(
        &self,
        telemetry: &mut Telemetry,
        anomalies: &[AnomalyInfo],
        random: &mut SeededRandom,
    ) -> Result<(), AnomalyError> {
        let resolved = anomalies
            .iter()
            .map(|info| {
                info.validate()?;
                let creator = self
                    .creators
                    .get(&info.anomaly_type)
                    .ok_or(AnomalyError::UnsupportedType(info.anomaly_type))?;
                Ok::<_, AnomalyError>((creator, info))
            })
            .collect::<Result<Vec<_>, AnomalyError>>()?;

        for (creator, info) in resolved {
            tracing::debug!(
                "Applying {} anomaly to '{}' in [{}, {})",
                info.anomaly_type,
                telemetry.name(),
                info.start_ts,
                info.end_ts
            );
            creator.create(telemetry, info, random)?;
        }

        Ok(())
    }
}

impl Default for AnomalyService {
    fn default() -> Self {
        Self::new(all_creators())
    }
}
