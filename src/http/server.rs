//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the ingestion, health and exposition handlers
//! - Wire up middleware (CORS, request metrics, tracing, limits, timeout)
//! - Mount the optional static asset directory
//! - Bind server to listener and drain on shutdown

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::client::Endpoint;
use crate::config::RelayConfig;
use crate::http::health::health_check;
use crate::http::middleware::{cors, track_requests};
use crate::ingest::{ingest_event, ingest_metric};
use crate::observability::{Metrics, MetricsError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub metrics: Metrics,
    pub service_name: Arc<str>,
}

/// HTTP server for the telemetry relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
    metrics: Metrics,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails when the metric instruments cannot be configured.
    pub fn new(config: RelayConfig) -> Result<Self, MetricsError> {
        let metrics = Metrics::new(&config.observability)?;

        let state = AppState {
            metrics: metrics.clone(),
            service_name: Arc::from(config.service.name.as_str()),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            metrics,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/health", get(health_check))
            .route(Endpoint::Events.path(), post(ingest_event))
            .route(Endpoint::Metrics.path(), post(ingest_metric));

        if config.observability.metrics_enabled {
            router = router.route(&config.observability.metrics_path, get(render_metrics));
        }

        if let Some(dir) = &config.assets.dir {
            tracing::info!(dir = %dir, mount = %config.assets.mount_path, "Serving static assets");
            router = router.nest_service(&config.assets.mount_path, ServeDir::new(dir));
        }

        router
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
            .layer(middleware::from_fn(cors))
            .layer(middleware::from_fn_with_state(state.metrics.clone(), track_requests))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Instruments shared with every handler.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service = %self.config.service.name,
            "Telemetry relay listening"
        );

        let upkeep = self.metrics.spawn_upkeep(
            Duration::from_secs(self.config.observability.upkeep_interval_secs),
            shutdown.resubscribe(),
        );

        let served = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining requests");
            })
            .await;

        // A serve error leaves no shutdown message for the upkeep task.
        upkeep.abort();
        served?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

async fn render_metrics(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
        .into_response()
}
