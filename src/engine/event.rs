//=========================================================================
// Game Events
//=========================================================================
//
// What the engine announces to its subscribers.
//
// Subscriptions are keyed by `EventKind`; the emitted `GameEvent` carries
// the payload. Built-in lifecycle events have fixed kinds, and games may
// emit their own named events with a JSON payload.
//
//=========================================================================

//=== External Dependencies ===============================================

use serde::Serialize;
use serde_json::Value;

//=== EventKind ===========================================================

/// Subscription key for [`GameEvent`]s.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    GameStart,
    GamePause,
    GameResume,
    GameStop,
    GameReset,
    GameOver,
    ScoreChange,
    Custom(String),
}

impl EventKind {
    /// Wire name used by the portal front end.
    pub fn name(&self) -> &str {
        match self {
            EventKind::GameStart => "gameStart",
            EventKind::GamePause => "gamePause",
            EventKind::GameResume => "gameResume",
            EventKind::GameStop => "gameStop",
            EventKind::GameReset => "gameReset",
            EventKind::GameOver => "gameOver",
            EventKind::ScoreChange => "scoreChange",
            EventKind::Custom(name) => name,
        }
    }

    /// Inverse of [`EventKind::name`]; unknown names become `Custom`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "gameStart" => EventKind::GameStart,
            "gamePause" => EventKind::GamePause,
            "gameResume" => EventKind::GameResume,
            "gameStop" => EventKind::GameStop,
            "gameReset" => EventKind::GameReset,
            "gameOver" => EventKind::GameOver,
            "scoreChange" => EventKind::ScoreChange,
            other => EventKind::Custom(other.to_string()),
        }
    }
}

//=== GameEvent ===========================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum GameEvent {
    GameStart,
    GamePause,
    GameResume,
    GameStop,
    GameReset,
    #[serde(rename_all = "camelCase")]
    GameOver {
        score: u64,
        high_score: u64,
    },
    ScoreChange {
        score: u64,
    },
    Custom {
        name: String,
        data: Value,
    },
}

impl GameEvent {
    pub fn custom(name: impl Into<String>, data: Value) -> Self {
        GameEvent::Custom {
            name: name.into(),
            data,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::GameStart => EventKind::GameStart,
            GameEvent::GamePause => EventKind::GamePause,
            GameEvent::GameResume => EventKind::GameResume,
            GameEvent::GameStop => EventKind::GameStop,
            GameEvent::GameReset => EventKind::GameReset,
            GameEvent::GameOver { .. } => EventKind::GameOver,
            GameEvent::ScoreChange { .. } => EventKind::ScoreChange,
            GameEvent::Custom { name, .. } => EventKind::Custom(name.clone()),
        }
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names_round_trip() {
        for kind in [
            EventKind::GameStart,
            EventKind::GamePause,
            EventKind::GameResume,
            EventKind::GameStop,
            EventKind::GameReset,
            EventKind::GameOver,
            EventKind::ScoreChange,
            EventKind::Custom("lineClear".into()),
        ] {
            assert_eq!(EventKind::from_name(kind.name()), kind);
        }
    }

    #[test]
    fn event_kind_matches_variant() {
        assert_eq!(GameEvent::ScoreChange { score: 3 }.kind(), EventKind::ScoreChange);
        assert_eq!(
            GameEvent::custom("lineClear", json!(4)).kind(),
            EventKind::Custom("lineClear".into())
        );
    }

    #[test]
    fn game_over_payload_uses_camel_case() {
        let event = GameEvent::GameOver {
            score: 50,
            high_score: 80,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "event": "gameOver", "score": 50, "highScore": 80 })
        );
    }
}
