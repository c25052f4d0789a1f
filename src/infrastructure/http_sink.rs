// HTTP telemetry sink - device telemetry upload endpoint
use crate::application::telemetry_sink::TelemetrySink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpTelemetrySink {
    host: String,
    client: reqwest::Client,
}

impl HttpTelemetrySink {
    pub fn new(host: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn build_telemetry_url(&self, access_token: &str) -> String {
        format!(
            "{}/api/v1/{}/telemetry",
            self.host,
            urlencoding::encode(access_token)
        )
    }
}

#[async_trait]
impl TelemetrySink for HttpTelemetrySink {
    async fn push(&self, access_token: &str, payload: &str) -> Result<()> {
        let url = self.build_telemetry_url(access_token);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(payload.to_string())
            .send()
            .await
            .context("Failed to send telemetry request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Telemetry upload failed with status {}: {}", status, body);
        }

        Ok(())
    }
}
