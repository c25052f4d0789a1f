use crate::application::push_service::PushPolicy;
use crate::application::random::DEFAULT_SEED;
use crate::application::signal_generator::{SignalProfile, ValueKind};
use crate::domain::anomaly::AnomalyInfo;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct GeneratorConfig {
    pub sink: SinkConfig,
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub series: Vec<SeriesConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SinkConfig {
    pub host: String,
    /// Cloud targets are rate limited and get batched, paced pushes.
    #[serde(default)]
    pub cloud: bool,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_send_delay_ms")]
    pub send_delay_ms: u64,
    #[serde(default = "default_suppress_error_count")]
    pub suppress_error_count: usize,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationSettings {
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Offset of the wall clock used for hour-of-day, in seconds east of UTC.
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub start_ts: Option<i64>,
    pub end_ts: Option<i64>,
    /// Generate every series over the whole window, ignoring its own dates.
    #[serde(default)]
    pub full_generation: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            utc_offset_seconds: 0,
            start_ts: None,
            end_ts: None,
            full_generation: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeriesConfig {
    pub device_token: String,
    pub name: String,
    pub kind: ValueKind,
    pub start_ts: i64,
    pub end_ts: Option<i64>,
    pub profile: SignalProfile,
    #[serde(default)]
    pub anomalies: Vec<AnomalyInfo>,
}

fn default_batch_size() -> usize {
    crate::application::push_service::PUSH_TELEMETRY_BATCH_SIZE
}

fn default_send_delay_ms() -> u64 {
    crate::application::push_service::PUSH_TELEMETRY_DELAY.as_millis() as u64
}

fn default_suppress_error_count() -> usize {
    crate::application::push_service::PUSH_TELEMETRY_SUPPRESS_ERROR_COUNT
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl SinkConfig {
    pub fn push_policy(&self) -> PushPolicy {
        PushPolicy {
            batched: self.cloud,
            batch_size: self.batch_size,
            send_delay: Duration::from_millis(self.send_delay_ms),
            suppress_error_count: self.suppress_error_count,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sink.batch_size == 0 {
            anyhow::bail!("sink.batch_size must be at least 1");
        }
        if self.sink.suppress_error_count == 0 {
            anyhow::bail!("sink.suppress_error_count must be at least 1");
        }
        for series in &self.series {
            for anomaly in &series.anomalies {
                anomaly.validate().map_err(|e| {
                    anyhow::anyhow!("series '{}' has a bad anomaly: {}", series.name, e)
                })?;
            }
        }
        Ok(())
    }
}

/// Reads `config/generator.{toml,...}` and `GENERATOR__*` environment
/// overrides, e.g. `GENERATOR__SINK__HOST`.
pub fn load_generator_config() -> anyhow::Result<GeneratorConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/generator"))
        .add_source(config::Environment::with_prefix("GENERATOR").separator("__"))
        .build()?;

    let config: GeneratorConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
