//! Numeric client-side observations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record::attributes::Attributes;

/// Aggregation semantics the collector applies to a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "counter" => Ok(MetricKind::Counter),
            "gauge" => Ok(MetricKind::Gauge),
            "histogram" => Ok(MetricKind::Histogram),
            other => Err(format!("unknown metric kind: {}", other)),
        }
    }
}

/// A metric sample as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    #[serde(rename = "type", alias = "kind")]
    pub kind: MetricKind,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Attributes>,
}

impl Metric {
    pub fn new(
        name: impl Into<String>,
        value: f64,
        kind: MetricKind,
        session_id: impl Into<String>,
        labels: Attributes,
    ) -> Self {
        Self {
            name: name.into(),
            value,
            kind,
            timestamp: Utc::now(),
            session_id: session_id.into(),
            labels: if labels.is_empty() { None } else { Some(labels) },
        }
    }
}
