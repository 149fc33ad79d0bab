//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

use telemetry_relay::config::RelayConfig;
use telemetry_relay::http::HttpServer;
use telemetry_relay::lifecycle::Shutdown;
use telemetry_relay::observability::Metrics;

/// A relay running on an ephemeral port.
pub struct TestRelay {
    pub addr: SocketAddr,
    pub metrics: Metrics,
    pub shutdown: Shutdown,
}

impl TestRelay {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a relay with `config` on 127.0.0.1:0.
pub async fn spawn_relay(config: RelayConfig) -> TestRelay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config).unwrap();
    let metrics = server.metrics().clone();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestRelay {
        addr,
        metrics,
        shutdown,
    }
}

pub async fn spawn_default_relay() -> TestRelay {
    spawn_relay(RelayConfig::default()).await
}

/// Value of the sample `name` whose label set includes every `(key, value)`.
///
/// Label order in the exposition is not relied on.
pub fn sample(rendered: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    rendered
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find(|line| {
            let Some(rest) = line.strip_prefix(name) else {
                return false;
            };
            if labels.is_empty() {
                return rest.starts_with(' ') || rest.starts_with('{');
            }
            rest.starts_with('{')
                && labels.iter().all(|(k, v)| {
                    let pair = format!("{}=\"{}\"", k, v);
                    rest.contains(&format!("{{{}", pair)) || rest.contains(&format!(",{}", pair))
                })
        })
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse().ok())
}

/// Number of samples named exactly `name` (any labels).
pub fn series_count(rendered: &str, name: &str) -> usize {
    rendered
        .lines()
        .filter(|line| {
            line.strip_prefix(name)
                .is_some_and(|rest| rest.starts_with('{') || rest.starts_with(' '))
        })
        .count()
}
