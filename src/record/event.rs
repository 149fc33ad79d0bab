//! Discrete client-side occurrences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::IdentitySnapshot;
use crate::record::attributes::Attributes;

/// Well-known event categories.
pub mod kinds {
    pub const GAME_START: &str = "game_start";
    pub const LEVEL_CHANGE: &str = "level_change";
    pub const SCORE_CHANGE: &str = "score_change";
    pub const SPAN: &str = "span";
}

/// A telemetry event as it travels over the wire.
///
/// Optional fields are omitted from the JSON when unset and decode back to
/// `None`; nothing is defaulted in between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub correlation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
}

/// Caller-supplied part of an event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPayload {
    pub level: Option<i64>,
    pub score: Option<i64>,
    pub data: Option<String>,
    pub attributes: Attributes,
}

impl EventPayload {
    pub fn level(mut self, level: i64) -> Self {
        self.level = Some(level);
        self
    }

    pub fn score(mut self, score: i64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }
}

impl Event {
    /// Stamp a payload with identity and the current time.
    pub fn new(
        event_type: impl Into<String>,
        identity: IdentitySnapshot,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp: Utc::now(),
            session_id: identity.session_id,
            correlation_id: identity.correlation_id,
            level: payload.level,
            score: payload.score,
            data: payload.data,
            attributes: if payload.attributes.is_empty() {
                None
            } else {
                Some(payload.attributes)
            },
            trace_id: None,
            span_id: None,
        }
    }

    /// True when this event materializes a completed span.
    pub fn is_span(&self) -> bool {
        self.trace_id.is_some() && self.span_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::attributes::AttributeValue;

    fn identity() -> IdentitySnapshot {
        IdentitySnapshot {
            session_id: "session_abc".into(),
            correlation_id: "corr_def".into(),
        }
    }

    #[test]
    fn test_minimal_event_omits_optionals() {
        let event = Event::new(kinds::GAME_START, identity(), EventPayload::default());
        let json = serde_json::to_value(&event).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj["type"], "game_start");
        assert_eq!(obj["session_id"], "session_abc");
        assert_eq!(obj["correlation_id"], "corr_def");
        for absent in ["level", "score", "data", "attributes", "trace_id", "span_id"] {
            assert!(!obj.contains_key(absent), "{} should be omitted", absent);
        }

        let decoded: Event = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, event);
        assert_eq!(decoded.level, None);
        assert_eq!(decoded.attributes, None);
    }

    #[test]
    fn test_full_event_preserves_optionals() {
        let mut payload = EventPayload::default().level(3).score(0).data("went up");
        payload.attributes.insert("combo".into(), AttributeValue::Int(4));
        let mut event = Event::new(kinds::LEVEL_CHANGE, identity(), payload);
        event.trace_id = Some("trace_1".into());
        event.span_id = Some("span_1".into());

        let text = serde_json::to_string(&event).unwrap();
        let decoded: Event = serde_json::from_str(&text).unwrap();

        assert_eq!(decoded, event);
        assert_eq!(decoded.score, Some(0));
        assert!(decoded.is_span());
    }

    #[test]
    fn test_missing_correlation_rejected() {
        let body = r#"{"type":"x","timestamp":"2024-01-01T00:00:00Z","session_id":"s"}"#;
        assert!(serde_json::from_str::<Event>(body).is_err());
    }
}
