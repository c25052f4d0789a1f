// Sink trait for delivering telemetry payloads
use async_trait::async_trait;

#[async_trait]
pub trait TelemetrySink: Send + Sync {
    /// Submit one serialized payload under a device access token.
    /// Any error is a transport failure and may be retried by the caller.
    async fn push(&self, access_token: &str, payload: &str) -> anyhow::Result<()>;
}
