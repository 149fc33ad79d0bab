//! Event-type to business-metric mapping.
//!
//! Only the event types listed in [`GameSignal`] drive a business gauge.
//! Anything else is logged and counted but has no gauge side effect.

use crate::record::event::kinds;
use crate::record::Event;

/// Event types that update a `game_metrics` gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameSignal {
    LevelChange,
    ScoreChange,
    GameStart,
}

/// Outcome of applying a signal to an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalValue {
    Record(f64),
    /// The event lacks the field this signal reads.
    Missing(&'static str),
}

impl GameSignal {
    pub fn from_event_type(event_type: &str) -> Option<Self> {
        match event_type {
            kinds::LEVEL_CHANGE => Some(GameSignal::LevelChange),
            kinds::SCORE_CHANGE => Some(GameSignal::ScoreChange),
            kinds::GAME_START => Some(GameSignal::GameStart),
            _ => None,
        }
    }

    /// `metric_type` label written to `game_metrics`.
    pub fn metric_type(&self) -> &'static str {
        match self {
            GameSignal::LevelChange => "current_level",
            GameSignal::ScoreChange => "current_score",
            GameSignal::GameStart => "game_sessions",
        }
    }

    pub fn value(&self, event: &Event) -> SignalValue {
        match self {
            GameSignal::LevelChange => event
                .level
                .map(|v| SignalValue::Record(v as f64))
                .unwrap_or(SignalValue::Missing("level")),
            GameSignal::ScoreChange => event
                .score
                .map(|v| SignalValue::Record(v as f64))
                .unwrap_or(SignalValue::Missing("score")),
            GameSignal::GameStart => SignalValue::Record(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentitySnapshot;
    use crate::record::EventPayload;

    fn event(event_type: &str, payload: EventPayload) -> Event {
        let identity = IdentitySnapshot {
            session_id: "s".into(),
            correlation_id: "c".into(),
        };
        Event::new(event_type, identity, payload)
    }

    #[test]
    fn test_closed_set() {
        assert_eq!(GameSignal::from_event_type("level_change"), Some(GameSignal::LevelChange));
        assert_eq!(GameSignal::from_event_type("score_change"), Some(GameSignal::ScoreChange));
        assert_eq!(GameSignal::from_event_type("game_start"), Some(GameSignal::GameStart));
        assert_eq!(GameSignal::from_event_type("span"), None);
        assert_eq!(GameSignal::from_event_type("Level_Change"), None);
    }

    #[test]
    fn test_values() {
        let level = event("level_change", EventPayload::default().level(5));
        assert_eq!(GameSignal::LevelChange.value(&level), SignalValue::Record(5.0));

        let score = event("score_change", EventPayload::default().score(1200));
        assert_eq!(GameSignal::ScoreChange.value(&score), SignalValue::Record(1200.0));

        let start = event("game_start", EventPayload::default());
        assert_eq!(GameSignal::GameStart.value(&start), SignalValue::Record(1.0));
    }

    #[test]
    fn test_missing_field() {
        let bare = event("level_change", EventPayload::default());
        assert_eq!(GameSignal::LevelChange.value(&bare), SignalValue::Missing("level"));
    }
}
