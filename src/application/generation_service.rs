// Generation service - Use case for one generation run
use crate::application::anomaly_service::AnomalyService;
use crate::application::push_service::{PushReport, TelemetryPushService};
use crate::application::random::SeededRandom;
use crate::application::signal_generator::generate_hourly;
use crate::domain::telemetry::Telemetry;
use crate::domain::timestamp::{Timestamp, calculate_date_range};
use crate::infrastructure::config::{GenerationSettings, SeriesConfig};
use anyhow::Context;
use chrono::FixedOffset;

pub struct GenerationService {
    anomaly_service: AnomalyService,
    push_service: TelemetryPushService,
    settings: GenerationSettings,
    zone: FixedOffset,
    random: SeededRandom,
}

impl GenerationService {
    pub fn new(
        anomaly_service: AnomalyService,
        push_service: TelemetryPushService,
        settings: GenerationSettings,
    ) -> anyhow::Result<Self> {
        let zone = FixedOffset::east_opt(settings.utc_offset_seconds)
            .with_context(|| format!("Invalid UTC offset: {}s", settings.utc_offset_seconds))?;
        let random = SeededRandom::new(settings.seed);
        Ok(Self {
            anomaly_service,
            push_service,
            settings,
            zone,
            random,
        })
    }

    pub async fn generate(&mut self, series: &[SeriesConfig]) -> anyhow::Result<Vec<PushReport>> {
        let now = Timestamp::of(chrono::Utc::now().timestamp_millis());
        self.generate_at(series, now).await
    }

    /// Build, distort and push every configured series, in order.
    ///
    /// The random source is reseeded first so repeated runs produce the same
    /// data. The first series that fails to build or push stops the run;
    /// series pushed before it stay delivered.
    pub async fn generate_at(
        &mut self,
        series: &[SeriesConfig],
        now: Timestamp,
    ) -> anyhow::Result<Vec<PushReport>> {
        self.random.reseed();
        tracing::info!("Generation started: {} series, seed = {}", series.len(), self.random.seed());

        let mut reports = Vec::with_capacity(series.len());
        for config in series {
            let Some(telemetry) = self.build_series(config, now)? else {
                tracing::info!("Skipping '{}': outside of the generation window", config.name);
                continue;
            };

            let report = self
                .push_service
                .push_telemetry(&config.device_token, &telemetry)
                .await
                .with_context(|| format!("Failed to push telemetry '{}'", config.name))?;
            tracing::info!(
                "Telemetry '{}' pushed: {} points in {} batches",
                report.name,
                telemetry.len(),
                report.batches_sent
            );
            reports.push(report);
        }

        tracing::info!("Generation finished: {} series pushed", reports.len());
        Ok(reports)
    }

    /// Generate one series and apply its anomalies. `None` when the series'
    /// lifetime does not overlap the generation window.
    pub fn build_series(
        &mut self,
        config: &SeriesConfig,
        now: Timestamp,
    ) -> anyhow::Result<Option<Telemetry>> {
        let generation_from = Timestamp::of(self.settings.start_ts.unwrap_or(config.start_ts));
        let generation_to = Timestamp::of(self.settings.end_ts.unwrap_or(now.get()));
        let series_to = Timestamp::of(config.end_ts.unwrap_or(now.get()));

        let Some((from, to)) = calculate_date_range(
            Timestamp::of(config.start_ts),
            series_to,
            generation_from,
            generation_to,
            self.settings.full_generation,
        ) else {
            return Ok(None);
        };

        let mut telemetry = generate_hourly(
            &config.name,
            &config.profile,
            config.kind,
            from,
            to,
            &self.zone,
            &mut self.random,
        );

        self.anomaly_service
            .apply_anomalies(&mut telemetry, &config.anomalies, &mut self.random)
            .with_context(|| format!("Failed to apply anomalies to '{}'", config.name))?;

        Ok(Some(telemetry))
    }
}
