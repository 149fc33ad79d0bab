//! Client-side spans.
//!
//! A span is open from `start_span` until the first `end()`, which
//! materializes exactly one `span` event. Later calls are rejected.

use chrono::{DateTime, Utc};
use std::time::Instant;
use thiserror::Error;

use crate::client::buffer::TelemetryClient;
use crate::identity::{new_span_id, new_trace_id};
use crate::record::event::kinds;
use crate::record::{AttributeValue, Attributes, Event};

/// Attribute carrying the elapsed time of a closed span.
pub const DURATION_MS: &str = "duration_ms";
/// Attribute carrying the span's operation name.
pub const OPERATION_NAME: &str = "operation_name";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpanError {
    #[error("span {span_id} ({operation}) is already closed")]
    AlreadyClosed { span_id: String, operation: String },
}

/// A timed unit of work.
#[derive(Debug)]
pub struct Span {
    trace_id: String,
    span_id: String,
    parent_span_id: Option<String>,
    operation_name: String,
    start_time: DateTime<Utc>,
    started: Instant,
    end_time: Option<DateTime<Utc>>,
    session_id: String,
    attributes: Attributes,
    client: TelemetryClient,
}

impl Span {
    pub(crate) fn start(client: TelemetryClient, operation_name: String) -> Self {
        Self {
            trace_id: new_trace_id(),
            span_id: new_span_id(),
            parent_span_id: None,
            operation_name,
            start_time: Utc::now(),
            started: Instant::now(),
            end_time: None,
            session_id: client.session_id().to_string(),
            attributes: Attributes::new(),
            client,
        }
    }

    /// Record an explicit parent. Trace ids are never inherited.
    pub fn with_parent(mut self, parent_span_id: impl Into<String>) -> Self {
        self.parent_span_id = Some(parent_span_id.into());
        self
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn span_id(&self) -> &str {
        &self.span_id
    }

    pub fn parent_span_id(&self) -> Option<&str> {
        self.parent_span_id.as_deref()
    }

    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn is_closed(&self) -> bool {
        self.end_time.is_some()
    }

    /// Insert or overwrite an attribute. Only legal while the span is open.
    pub fn set_attribute(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Result<(), SpanError> {
        self.ensure_open()?;
        self.attributes.insert(key.into(), value.into());
        Ok(())
    }

    /// Close the span and ship its `span` event.
    pub fn end(&mut self) -> Result<(), SpanError> {
        if let Err(e) = self.ensure_open() {
            tracing::warn!(
                span_id = %self.span_id,
                operation = %self.operation_name,
                "Span closed twice, ignoring"
            );
            return Err(e);
        }

        let end_time = Utc::now();
        self.end_time = Some(end_time);
        let duration_ms = i64::try_from(self.started.elapsed().as_millis()).unwrap_or(i64::MAX);

        let mut attributes = Attributes::new();
        attributes.insert(DURATION_MS.to_string(), AttributeValue::Int(duration_ms));
        attributes.insert(
            OPERATION_NAME.to_string(),
            AttributeValue::String(self.operation_name.clone()),
        );
        if let Some(parent) = &self.parent_span_id {
            attributes.insert(
                "parent_span_id".to_string(),
                AttributeValue::String(parent.clone()),
            );
        }
        // Caller-set attributes take precedence over the generated ones.
        attributes.extend(self.attributes.clone());

        let identity = self.client.identity();
        let event = Event {
            event_type: kinds::SPAN.to_string(),
            timestamp: self.start_time,
            session_id: self.session_id.clone(),
            correlation_id: identity.correlation_id,
            level: None,
            score: None,
            data: Some(self.operation_name.clone()),
            attributes: Some(attributes),
            trace_id: Some(self.trace_id.clone()),
            span_id: Some(self.span_id.clone()),
        };

        tracing::debug!(
            trace_id = %self.trace_id,
            span_id = %self.span_id,
            operation = %self.operation_name,
            duration_ms,
            "Client span closed"
        );
        self.client.dispatch_event(event);
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), SpanError> {
        if self.is_closed() {
            return Err(SpanError::AlreadyClosed {
                span_id: self.span_id.clone(),
                operation: self.operation_name.clone(),
            });
        }
        Ok(())
    }
}
