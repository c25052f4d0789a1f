// Main entry point - Dependency wiring and one generation run
use std::sync::Arc;
use std::time::Duration;

use telemetry_generator::application::anomaly_service::AnomalyService;
use telemetry_generator::application::generation_service::GenerationService;
use telemetry_generator::application::push_service::TelemetryPushService;
use telemetry_generator::infrastructure::config::load_generator_config;
use telemetry_generator::infrastructure::http_sink::HttpTelemetrySink;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_generator_config()?;

    // Create sink (infrastructure layer)
    let sink = Arc::new(HttpTelemetrySink::new(
        config.sink.host.clone(),
        Duration::from_millis(config.sink.timeout_ms),
    )?);

    // Create services (application layer)
    let push_service = TelemetryPushService::new(sink, config.sink.push_policy());
    let mut generation_service =
        GenerationService::new(AnomalyService::default(), push_service, config.generation.clone())?;

    let reports = generation_service.generate(&config.series).await?;
    for report in &reports {
        tracing::info!(
            "{}: {} batches sent in {} attempts",
            report.name,
            report.batches_sent,
            report.attempts
        );
    }

    Ok(())
}
