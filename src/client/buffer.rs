//! Client-side event and metric accumulation.

use dashmap::DashMap;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::client::span::Span;
use crate::client::transport::{encode, Endpoint, Transport};
use crate::identity::{IdentityContext, IdentitySnapshot};
use crate::record::attributes::sanitize_non_finite;
use crate::record::{Attributes, Event, EventPayload, Metric, MetricKind};

/// Default number of events retained locally.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// Handle through which an observed system emits telemetry.
///
/// Cloning is cheap and every clone shares identity, buffer and transport,
/// so the handle can be passed to several emitting tasks.
#[derive(Clone)]
pub struct TelemetryClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    identity: IdentityContext,
    events: Mutex<VecDeque<Event>>,
    capacity: usize,
    dropped: AtomicU64,
    latest: DashMap<String, f64>,
    transport: Arc<dyn Transport>,
}

impl TelemetryClient {
    pub fn new(identity: IdentityContext, transport: Arc<dyn Transport>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        tracing::info!(
            session_id = %identity.session_id(),
            correlation_id = %identity.correlation_id(),
            capacity,
            "Client telemetry initialized"
        );
        Self {
            inner: Arc::new(ClientInner {
                identity,
                events: Mutex::new(VecDeque::with_capacity(
                    capacity.min(DEFAULT_BUFFER_CAPACITY),
                )),
                capacity,
                dropped: AtomicU64::new(0),
                latest: DashMap::new(),
                transport,
            }),
        }
    }

    /// Record a discrete event and ship it.
    pub fn record_event(&self, event_type: &str, payload: EventPayload) {
        let event = Event::new(event_type, self.inner.identity.snapshot(), payload);
        tracing::debug!(
            event_type = %event.event_type,
            session_id = %event.session_id,
            level = ?event.level,
            score = ?event.score,
            "Client telemetry event recorded"
        );
        self.dispatch_event(event);
    }

    /// Record a metric sample and ship it. Only the latest value per name is kept locally.
    ///
    /// NaN and infinite values have no JSON encoding and are dropped with a warning.
    pub fn record_metric(&self, name: &str, value: f64, kind: MetricKind, mut labels: Attributes) {
        if !value.is_finite() {
            tracing::warn!(metric = %name, value = %value, "Dropping non-finite metric sample");
            return;
        }
        let replaced = sanitize_non_finite(&mut labels);
        if replaced > 0 {
            tracing::warn!(metric = %name, replaced, "Non-finite metric labels sent as text");
        }

        let identity = self.identity();
        let metric = Metric::new(name, value, kind, &identity.session_id, labels);
        self.inner.latest.insert(metric.name.clone(), value);
        self.ship(Endpoint::Metrics, &metric, identity);
    }

    /// Open a span timed from now.
    pub fn start_span(&self, operation_name: impl Into<String>) -> Span {
        Span::start(self.clone(), operation_name.into())
    }

    pub fn session_id(&self) -> &str {
        self.inner.identity.session_id()
    }

    pub fn correlation_id(&self) -> Arc<String> {
        self.inner.identity.correlation_id()
    }

    /// Re-scope subsequent records to a new logical interaction.
    pub fn set_correlation_id(&self, correlation_id: impl Into<String>) {
        self.inner.identity.set_correlation_id(correlation_id);
    }

    pub fn rotate_correlation_id(&self) -> Arc<String> {
        self.inner.identity.rotate_correlation_id()
    }

    pub fn latest_metric(&self, name: &str) -> Option<f64> {
        self.inner.latest.get(name).map(|v| *v.value())
    }

    /// Copy of the locally retained events, oldest first.
    pub fn events(&self) -> Vec<Event> {
        self.lock_events().iter().cloned().collect()
    }

    /// Number of events evicted because the buffer was full.
    pub fn dropped_events(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    /// Wait until in-flight sends finish or `timeout` elapses.
    ///
    /// Returns the number of sends still pending.
    pub async fn settle(&self, timeout: Duration) -> usize {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let pending = self.inner.transport.pending();
            if pending == 0 || tokio::time::Instant::now() >= deadline {
                return pending;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    pub(crate) fn identity(&self) -> IdentitySnapshot {
        self.inner.identity.snapshot()
    }

    /// Buffer an already-built event and hand it to the transport.
    ///
    /// Request headers carry the ids stamped on the event, not the current ones.
    pub(crate) fn dispatch_event(&self, mut event: Event) {
        if let Some(attributes) = event.attributes.as_mut() {
            let replaced = sanitize_non_finite(attributes);
            if replaced > 0 {
                tracing::warn!(
                    event_type = %event.event_type,
                    replaced,
                    "Non-finite event attributes sent as text"
                );
            }
        }
        {
            let mut events = self.lock_events();
            if events.len() >= self.inner.capacity {
                events.pop_front();
                let dropped = self.inner.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(
                    dropped,
                    capacity = self.inner.capacity,
                    "Client event buffer full, evicted oldest"
                );
            }
            events.push_back(event.clone());
        }
        let identity = IdentitySnapshot {
            session_id: event.session_id.clone(),
            correlation_id: event.correlation_id.clone(),
        };
        self.ship(Endpoint::Events, &event, identity);
    }

    fn ship<T: Serialize>(&self, endpoint: Endpoint, record: &T, identity: IdentitySnapshot) {
        match encode(record) {
            Ok(body) => self.inner.transport.send(endpoint, body, identity),
            Err(e) => {
                tracing::warn!(
                    endpoint = endpoint.path(),
                    error = %e,
                    "Failed to marshal telemetry data"
                );
            }
        }
    }

    fn lock_events(&self) -> MutexGuard<'_, VecDeque<Event>> {
        // A panic while holding the lock cannot leave the deque half-updated.
        self.inner
            .events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for TelemetryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryClient")
            .field("session_id", &self.session_id())
            .field("capacity", &self.inner.capacity)
            .finish()
    }
}
