// Push service - Delivers telemetry to a sink, batching and retrying for cloud targets
use crate::application::telemetry_sink::TelemetrySink;
use crate::domain::error::PushTelemetryError;
use crate::domain::telemetry::Telemetry;
use std::sync::Arc;
use std::time::Duration;

pub const PUSH_TELEMETRY_BATCH_SIZE: usize = 100;
pub const PUSH_TELEMETRY_DELAY: Duration = Duration::from_millis(100);
pub const PUSH_TELEMETRY_SUPPRESS_ERROR_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct PushPolicy {
    /// Split into batches and retry failed ones. Off for direct sinks, which
    /// receive the whole series in one request.
    pub batched: bool,
    pub batch_size: usize,
    pub send_delay: Duration,
    pub suppress_error_count: usize,
}

impl PushPolicy {
    pub fn direct() -> Self {
        Self {
            batched: false,
            ..Self::cloud()
        }
    }

    pub fn cloud() -> Self {
        Self {
            batched: true,
            batch_size: PUSH_TELEMETRY_BATCH_SIZE,
            send_delay: PUSH_TELEMETRY_DELAY,
            suppress_error_count: PUSH_TELEMETRY_SUPPRESS_ERROR_COUNT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReport {
    pub name: String,
    pub batches_sent: usize,
    pub attempts: usize,
}

#[derive(Clone)]
pub struct TelemetryPushService {
    sink: Arc<dyn TelemetrySink>,
    policy: PushPolicy,
}

impl TelemetryPushService {
    pub fn new(sink: Arc<dyn TelemetrySink>, policy: PushPolicy) -> Self {
        Self { sink, policy }
    }

    pub fn policy(&self) -> &PushPolicy {
        &self.policy
    }

    pub async fn push_telemetry(
        &self,
        access_token: &str,
        telemetry: &Telemetry,
    ) -> Result<PushReport, PushTelemetryError> {
        if telemetry.is_empty() {
            return Ok(PushReport {
                name: telemetry.name().to_string(),
                batches_sent: 0,
                attempts: 0,
            });
        }

        if self.policy.batched {
            self.push_batched(access_token, telemetry).await
        } else {
            self.sink
                .push(access_token, &telemetry.to_json())
                .await
                .map_err(|source| PushTelemetryError::Transport {
                    name: telemetry.name().to_string(),
                    source,
                })?;
            Ok(PushReport {
                name: telemetry.name().to_string(),
                batches_sent: 1,
                attempts: 1,
            })
        }
    }

    /// Send batch by batch. A failed batch is retried until it succeeds or
    /// `suppress_error_count` attempts in a row have failed, at which point
    /// the push gives up. Batches already sent stay sent.
    async fn push_batched(
        &self,
        access_token: &str,
        telemetry: &Telemetry,
    ) -> Result<PushReport, PushTelemetryError> {
        let batch_size = self.policy.batch_size.max(1);
        let total_batches = telemetry.partition_count(batch_size);
        tracing::info!(
            "Pushing telemetry '{}' to the cloud, batch size = {}, send delay = {:?}, suppress error count = {}",
            telemetry.name(),
            batch_size,
            self.policy.send_delay,
            self.policy.suppress_error_count
        );

        let mut partitions = telemetry.partition(batch_size);
        let mut current = partitions.next();
        let mut error_count = 0;
        let mut batches_sent = 0;
        let mut attempts = 0;

        while let Some(batch) = &current {
            if error_count >= self.policy.suppress_error_count {
                break;
            }

            tokio::time::sleep(self.policy.send_delay).await;
            attempts += 1;

            let payload = batch.to_json();
            match self.sink.push(access_token, &payload).await {
                Ok(()) => {
                    error_count = 0;
                    batches_sent += 1;
                    tracing::info!("Batch is sent ({}/{})", batches_sent, total_batches);
                    current = partitions.next();
                }
                Err(e) => {
                    error_count += 1;
                    tracing::error!(
                        "Error during pushing telemetry to the cloud, error count = {}, retry... {:#}",
                        error_count,
                        e
                    );
                }
            }
        }

        if error_count >= self.policy.suppress_error_count {
            tracing::warn!(
                "Giving up on telemetry '{}' after {} consecutive errors",
                telemetry.name(),
                error_count
            );
            return Err(PushTelemetryError::SuppressedErrors {
                name: telemetry.name().to_string(),
                batches_sent,
                total_batches,
                error_count,
            });
        }

        Ok(PushReport {
            name: telemetry.name().to_string(),
            batches_sent,
            attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Records every attempt by the first timestamp of its payload and fails
    /// a batch as many times as scripted.
    #[derive(Default)]
    struct ScriptedSink {
        attempts: Mutex<Vec<i64>>,
        failures: Mutex<HashMap<i64, usize>>,
        always_fail: bool,
    }

    impl ScriptedSink {
        fn failing_batch(first_ts: i64, times: usize) -> Self {
            let sink = Self::default();
            sink.failures.lock().unwrap().insert(first_ts, times);
            sink
        }

        fn always_failing() -> Self {
            Self {
                always_fail: true,
                ..Self::default()
            }
        }

        fn attempts_for(&self, first_ts: i64) -> usize {
            self.attempts
                .lock()
                .unwrap()
                .iter()
                .filter(|ts| **ts == first_ts)
                .count()
        }
    }

    #[async_trait]
    impl TelemetrySink for ScriptedSink {
        async fn push(&self, _access_token: &str, payload: &str) -> anyhow::Result<()> {
            let records: serde_json::Value = serde_json::from_str(payload)?;
            let first_ts = records[0]["ts"].as_i64().unwrap_or_default();
            self.attempts.lock().unwrap().push(first_ts);

            if self.always_fail {
                anyhow::bail!("rate limited");
            }
            let mut failures = self.failures.lock().unwrap();
            if let Some(left) = failures.get_mut(&first_ts) {
                if *left > 0 {
                    *left -= 1;
                    anyhow::bail!("timeout");
                }
            }
            Ok(())
        }
    }

    fn series(points: i64) -> Telemetry {
        let mut telemetry = Telemetry::new("consumption");
        for i in 0..points {
            telemetry.add_value(i, i);
        }
        telemetry
    }

    fn fast_cloud() -> PushPolicy {
        PushPolicy {
            send_delay: Duration::ZERO,
            ..PushPolicy::cloud()
        }
    }

    #[tokio::test]
    async fn test_empty_series_is_noop() {
        let sink = Arc::new(ScriptedSink::always_failing());
        for policy in [fast_cloud(), PushPolicy::direct()] {
            let service = TelemetryPushService::new(sink.clone(), policy);
            let report = service.push_telemetry("token", &Telemetry::new("empty")).await.unwrap();
            assert_eq!(report.attempts, 0);
        }
        assert!(sink.attempts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_direct_push_sends_whole_series_once() {
        let sink = Arc::new(ScriptedSink::default());
        let service = TelemetryPushService::new(sink.clone(), PushPolicy::direct());

        let report = service.push_telemetry("token", &series(250)).await.unwrap();

        assert_eq!(report.batches_sent, 1);
        assert_eq!(*sink.attempts.lock().unwrap(), vec![0]);
    }

    #[tokio::test]
    async fn test_direct_push_does_not_retry() {
        let sink = Arc::new(ScriptedSink::always_failing());
        let service = TelemetryPushService::new(sink.clone(), PushPolicy::direct());

        let err = service.push_telemetry("token", &series(5)).await.unwrap_err();

        assert!(matches!(err, PushTelemetryError::Transport { .. }));
        assert_eq!(err.telemetry_name(), "consumption");
        assert_eq!(sink.attempts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_batched_push_sends_every_batch() {
        let sink = Arc::new(ScriptedSink::default());
        let service = TelemetryPushService::new(sink.clone(), fast_cloud());

        let report = service.push_telemetry("token", &series(250)).await.unwrap();

        assert_eq!(report.batches_sent, 3);
        assert_eq!(report.attempts, 3);
        assert_eq!(*sink.attempts.lock().unwrap(), vec![0, 100, 200]);
    }

    #[tokio::test]
    async fn test_batch_retried_until_success() {
        let sink = Arc::new(ScriptedSink::failing_batch(100, 3));
        let service = TelemetryPushService::new(sink.clone(), fast_cloud());

        let report = service.push_telemetry("token", &series(300)).await.unwrap();

        assert_eq!(sink.attempts_for(0), 1);
        assert_eq!(sink.attempts_for(100), 4);
        assert_eq!(sink.attempts_for(200), 1);
        assert_eq!(report.batches_sent, 3);
        assert_eq!(report.attempts, 6);
    }

    #[tokio::test]
    async fn test_gives_up_after_suppress_error_count() {
        let sink = Arc::new(ScriptedSink::always_failing());
        let service = TelemetryPushService::new(sink.clone(), fast_cloud());

        let err = service.push_telemetry("token", &series(300)).await.unwrap_err();

        assert_eq!(*sink.attempts.lock().unwrap(), vec![0; 10]);
        match err {
            PushTelemetryError::SuppressedErrors {
                name,
                batches_sent,
                total_batches,
                error_count,
            } => {
                assert_eq!(name, "consumption");
                assert_eq!(batches_sent, 0);
                assert_eq!(total_batches, 3);
                assert_eq!(error_count, 10);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_error_count_resets_after_success() {
        // 9 failures on two different batches stay under the threshold
        let sink = ScriptedSink::failing_batch(0, 9);
        sink.failures.lock().unwrap().insert(200, 9);
        let sink = Arc::new(sink);
        let service = TelemetryPushService::new(sink.clone(), fast_cloud());

        let report = service.push_telemetry("token", &series(300)).await.unwrap();

        assert_eq!(report.attempts, 21);
        assert_eq!(report.batches_sent, 3);
    }

    #[tokio::test]
    async fn test_failure_after_partial_delivery_reports_progress() {
        let sink = Arc::new(ScriptedSink::failing_batch(200, usize::MAX));
        let service = TelemetryPushService::new(sink.clone(), fast_cloud());

        let err = service.push_telemetry("token", &series(300)).await.unwrap_err();

        assert!(matches!(
            err,
            PushTelemetryError::SuppressedErrors { batches_sent: 2, total_batches: 3, .. }
        ));
        assert_eq!(sink.attempts_for(200), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batches_are_paced() {
        let sink = Arc::new(ScriptedSink::default());
        let service = TelemetryPushService::new(sink, PushPolicy::cloud());
        let started = tokio::time::Instant::now();

        service.push_telemetry("token", &series(300)).await.unwrap();

        assert!(started.elapsed() >= PUSH_TELEMETRY_DELAY * 3);
    }
}
