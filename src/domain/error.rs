// Domain errors
use super::anomaly::AnomalyType;
use thiserror::Error;

/// Data-shape errors. Any of these aborts the anomaly pass for a series.
#[derive(Debug, Error)]
pub enum AnomalyError {
    #[error("invalid anomaly window: start {start} must be before end {end}")]
    InvalidWindow { start: i64, end: i64 },

    #[error("invalid anomaly noise amplitude: {0}")]
    InvalidNoiseAmplitude(f64),

    #[error("anomaly creator type is not supported: {0}")]
    UnsupportedType(AnomalyType),

    #[error("value kind is not supported by {anomaly}: {kind}")]
    UnsupportedValue { anomaly: AnomalyType, kind: &'static str },
}

#[derive(Debug, Error)]
pub enum PushTelemetryError {
    #[error(
        "pushing telemetry failed, name: {name} ({batches_sent}/{total_batches} batches sent, {error_count} consecutive errors)"
    )]
    SuppressedErrors {
        name: String,
        batches_sent: usize,
        total_batches: usize,
        error_count: usize,
    },

    #[error("pushing telemetry failed, name: {name}")]
    Transport {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

impl PushTelemetryError {
    pub fn telemetry_name(&self) -> &str {
        match self {
            Self::SuppressedErrors { name, .. } | Self::Transport { name, .. } => name,
        }
    }
}
