//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define relay metrics (requests, latency, health checks, client signals)
//! - Render a Prometheus-compatible exposition
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, matched path, status
//! - `http_request_duration_seconds` (histogram): latency distribution
//! - `health_checks_total` (counter): health checks served
//! - `client_events_total` (counter): ingested events by event type and session
//! - `client_metrics_total` (counter): ingested metric samples by kind
//! - `game_metrics` (gauge): business values by metric type, session, source
//! - `game_metric_observations` (histogram): client histogram-kind samples
//!
//! # Design Decisions
//! - The recorder is owned by the server instead of being installed
//!   globally, so independent servers never share instruments
//! - Every update runs under `metrics::with_local_recorder`; the recorder's
//!   registry is lock-free for concurrent updates
//! - A recorder built without `install` gets no background upkeep, so the
//!   server drives `run_upkeep` on an interval until shutdown

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram,
    with_local_recorder, Unit,
};
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::ObservabilityConfig;
use crate::record::MetricKind;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const HEALTH_CHECKS_TOTAL: &str = "health_checks_total";
pub const CLIENT_EVENTS_TOTAL: &str = "client_events_total";
pub const CLIENT_METRICS_TOTAL: &str = "client_metrics_total";
pub const GAME_METRICS: &str = "game_metrics";
pub const GAME_METRIC_OBSERVATIONS: &str = "game_metric_observations";

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to configure metric instruments: {0}")]
    Build(#[from] BuildError),
}

/// Process-wide instruments shared by every request handler.
#[derive(Clone)]
pub struct Metrics {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
}

impl Metrics {
    /// Build the recorder and describe every instrument.
    pub fn new(config: &ObservabilityConfig) -> Result<Self, MetricsError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(HTTP_REQUEST_DURATION_SECONDS.to_string()),
                &config.duration_buckets,
            )?
            .build_recorder();
        let handle = recorder.handle();

        let metrics = Self {
            recorder: Arc::new(recorder),
            handle,
        };
        metrics.describe();
        tracing::info!("Metric instruments initialized");
        Ok(metrics)
    }

    fn describe(&self) {
        self.scoped(|| {
            describe_counter!(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests");
            describe_histogram!(
                HTTP_REQUEST_DURATION_SECONDS,
                Unit::Seconds,
                "HTTP request duration in seconds"
            );
            describe_counter!(HEALTH_CHECKS_TOTAL, "Total number of health check requests");
            describe_counter!(
                CLIENT_EVENTS_TOTAL,
                "Total number of client telemetry events received"
            );
            describe_counter!(
                CLIENT_METRICS_TOTAL,
                "Total number of client telemetry metrics received"
            );
            describe_gauge!(GAME_METRICS, "Various game-related metrics");
            describe_histogram!(
                GAME_METRIC_OBSERVATIONS,
                "Distribution of client histogram-kind metrics"
            );
        });
    }

    fn scoped<T>(&self, f: impl FnOnce() -> T) -> T {
        with_local_recorder(self.recorder.as_ref(), f)
    }

    /// Record a completed HTTP request.
    pub fn record_request(&self, method: &str, path: &str, status: u16, start: Instant) {
        let elapsed = start.elapsed().as_secs_f64();
        self.scoped(|| {
            counter!(
                HTTP_REQUESTS_TOTAL,
                "method" => method.to_string(),
                "path" => path.to_string(),
                "status" => status.to_string()
            )
            .increment(1);
            histogram!(
                HTTP_REQUEST_DURATION_SECONDS,
                "method" => method.to_string(),
                "path" => path.to_string()
            )
            .record(elapsed);
        });
    }

    pub fn record_health_check(&self) {
        self.scoped(|| counter!(HEALTH_CHECKS_TOTAL).increment(1));
    }

    /// Count one ingested client event.
    pub fn record_client_event(&self, event_type: &str, session_id: &str) {
        self.scoped(|| {
            counter!(
                CLIENT_EVENTS_TOTAL,
                "event_type" => event_type.to_string(),
                "session_id" => session_id.to_string()
            )
            .increment(1);
        });
    }

    /// Count one ingested client metric sample.
    pub fn record_client_metric(&self, kind: MetricKind) {
        self.scoped(|| counter!(CLIENT_METRICS_TOTAL, "kind" => kind.as_str()).increment(1));
    }

    /// Set a business gauge. `source` is attached as a label when present.
    pub fn record_game_metric(
        &self,
        metric_type: &str,
        session_id: &str,
        source: Option<&str>,
        value: f64,
    ) {
        self.scoped(|| match source {
            Some(source) => gauge!(
                GAME_METRICS,
                "metric_type" => metric_type.to_string(),
                "session_id" => session_id.to_string(),
                "source" => source.to_string()
            )
            .set(value),
            None => gauge!(
                GAME_METRICS,
                "metric_type" => metric_type.to_string(),
                "session_id" => session_id.to_string()
            )
            .set(value),
        });
    }

    /// Observe a client histogram-kind sample.
    pub fn record_game_observation(&self, metric_type: &str, session_id: &str, value: f64) {
        self.scoped(|| {
            histogram!(
                GAME_METRIC_OBSERVATIONS,
                "metric_type" => metric_type.to_string(),
                "session_id" => session_id.to_string()
            )
            .record(value);
        });
    }

    /// Prometheus text exposition of every instrument.
    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Drain buffered histogram samples into their summaries.
    pub fn run_upkeep(&self) {
        self.handle.run_upkeep();
    }

    /// Run upkeep every `interval` until `shutdown` fires or its sender is dropped.
    pub fn spawn_upkeep(
        &self,
        interval: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let metrics = self.clone();
        tokio::spawn(async move {
            tracing::debug!(interval_secs = interval.as_secs(), "Metrics upkeep starting");
            let mut ticker = time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => metrics.run_upkeep(),
                    _ = shutdown.recv() => {
                        tracing::debug!("Metrics upkeep received shutdown signal, exiting loop");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> Metrics {
        Metrics::new(&ObservabilityConfig::default()).unwrap()
    }

    fn line_for<'a>(rendered: &'a str, name: &str, labels: &[&str]) -> Option<&'a str> {
        rendered.lines().find(|line| {
            line.starts_with(name)
                && line[name.len()..].starts_with('{')
                && labels.iter().all(|l| line.contains(l))
        })
    }

    #[test]
    fn test_client_event_counter() {
        let metrics = metrics();
        metrics.record_client_event("level_change", "session_a");
        metrics.record_client_event("level_change", "session_a");
        metrics.record_client_event("game_start", "session_a");

        let rendered = metrics.render();
        let level_change = [r#"event_type="level_change""#];
        let line = line_for(&rendered, CLIENT_EVENTS_TOTAL, &level_change).unwrap();
        assert!(line.ends_with(" 2"), "{}", line);
        let game_start = [r#"event_type="game_start""#];
        let line = line_for(&rendered, CLIENT_EVENTS_TOTAL, &game_start).unwrap();
        assert!(line.ends_with(" 1"), "{}", line);
    }

    #[test]
    fn test_gauge_overwrites() {
        let metrics = metrics();
        metrics.record_game_metric("current_level", "s", None, 3.0);
        metrics.record_game_metric("current_level", "s", None, 5.0);

        let rendered = metrics.render();
        let line = line_for(&rendered, GAME_METRICS, &[r#"metric_type="current_level""#]).unwrap();
        assert!(line.ends_with(" 5"), "{}", line);
    }

    #[test]
    fn test_instances_are_isolated() {
        let a = metrics();
        let b = metrics();
        a.record_health_check();

        assert!(a.render().contains("health_checks_total 1"));
        assert!(!b.render().contains("health_checks_total 1"));
    }

    #[test]
    fn test_upkeep_keeps_histogram_totals() {
        let metrics = metrics();
        for _ in 0..3 {
            metrics.record_game_observation("frame_time_ms", "s", 16.0);
        }
        metrics.run_upkeep();
        metrics.record_game_observation("frame_time_ms", "s", 20.0);
        metrics.run_upkeep();

        let rendered = metrics.render();
        let count = format!("{}_count", GAME_METRIC_OBSERVATIONS);
        let line = line_for(&rendered, &count, &[r#"metric_type="frame_time_ms""#]).unwrap();
        assert!(line.ends_with(" 4"), "{}", line);
    }

    #[tokio::test]
    async fn test_upkeep_task_stops_on_shutdown() {
        let metrics = metrics();
        let (tx, rx) = broadcast::channel(1);
        let task = metrics.spawn_upkeep(Duration::from_millis(10), rx);

        metrics.record_health_check();
        time::sleep(Duration::from_millis(50)).await;
        assert!(!task.is_finished());

        tx.send(()).unwrap();
        time::timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
        assert!(metrics.render().contains("health_checks_total 1"));
    }

    #[test]
    fn test_empty_buckets_fail_initialization() {
        let config = ObservabilityConfig {
            duration_buckets: Vec::new(),
            ..ObservabilityConfig::default()
        };
        assert!(matches!(Metrics::new(&config), Err(MetricsError::Build(_))));
    }
}
