//! Wire protocol.
//!
//! Every message is one JSON object per WebSocket text frame, discriminated by
//! its `type` field.
//!
//! Client → server: `init` (optional `join`), `play` (`column`).
//! Server → client: `init` (`join`), `play` (`player`, `column`, `row`),
//! `win` (`player`), `error` (`message`).

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ProtocolError;
use crate::ids::JoinToken;
use crate::player::Player;

/// Event sent by a client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientEvent {
    /// First message of every connection. Without `join` it creates a
    /// session; with `join` it asks to enter an existing one.
    Init {
        /// Token of the session to join. `null` is treated as absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        join: Option<JoinToken>,
    },
    /// Drop a disc into `column`. Range checking belongs to the game engine,
    /// so any integer decodes.
    Play {
        /// Target column, saturated to the `i64` range.
        #[serde(deserialize_with = "integer_column")]
        column: i64,
    },
}

/// 2^63, the first magnitude past `i64::MAX`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Accept any JSON integer. Integers beyond `i64` saturate so the engine can
/// reject them as out of range. serde_json reads integers beyond `u64` as
/// floats, and every float that large is integral.
fn integer_column<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(column) = number.as_i64() {
        return Ok(column);
    }
    if number.as_u64().is_some() {
        return Ok(i64::MAX);
    }
    match number.as_f64() {
        Some(value) if value.is_finite() && value >= I64_BOUND => Ok(i64::MAX),
        Some(value) if value.is_finite() && value <= -I64_BOUND => Ok(i64::MIN),
        _ => Err(D::Error::custom(format!(
            "invalid column {number}, expected an integer"
        ))),
    }
}

impl ClientEvent {
    /// Decode one text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Wire name of the event type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Play { .. } => "play",
        }
    }
}

/// Event sent by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerEvent {
    /// Sent to the creator only; carries the shareable token.
    Init {
        /// Token the second player uses to join.
        join: JoinToken,
    },
    /// Broadcast after a valid move.
    Play {
        /// Who moved.
        player: Player,
        /// Column played.
        column: usize,
        /// Row the disc landed in (0 is the bottom).
        row: usize,
    },
    /// Broadcast once, after the move that ended the game.
    Win {
        /// The winner.
        player: Player,
    },
    /// Sent to the offending connection only.
    Error {
        /// Human-readable explanation.
        message: String,
    },
}

impl ServerEvent {
    /// Build an `error` event.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Serialize to the JSON text sent over the wire.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Wire name of the event type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Play { .. } => "play",
            Self::Win { .. } => "win",
            Self::Error { .. } => "error",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use insta::assert_snapshot;

    // ── decoding ────────────────────────────────────────────────────

    #[test]
    fn decode_init_without_join() {
        let event = ClientEvent::decode(r#"{"type":"init"}"#).unwrap();
        assert_eq!(event, ClientEvent::Init { join: None });
    }

    #[test]
    fn decode_init_with_join() {
        let event = ClientEvent::decode(r#"{"type":"init","join":"T1"}"#).unwrap();
        assert_eq!(
            event,
            ClientEvent::Init {
                join: Some(JoinToken::from("T1"))
            }
        );
    }

    #[test]
    fn decode_init_with_null_join_is_create() {
        let event = ClientEvent::decode(r#"{"type":"init","join":null}"#).unwrap();
        assert_eq!(event, ClientEvent::Init { join: None });
    }

    #[test]
    fn decode_play() {
        let event = ClientEvent::decode(r#"{"type":"play","column":3}"#).unwrap();
        assert_eq!(event, ClientEvent::Play { column: 3 });
        assert_eq!(event.kind(), "play");
    }

    #[test]
    fn decode_negative_column_is_left_to_the_engine() {
        let event = ClientEvent::decode(r#"{"type":"play","column":-1}"#).unwrap();
        assert_eq!(event, ClientEvent::Play { column: -1 });
    }

    #[test]
    fn decode_column_beyond_i64_saturates() {
        let event = ClientEvent::decode(r#"{"type":"play","column":9223372036854775808}"#).unwrap();
        assert_eq!(event, ClientEvent::Play { column: i64::MAX });

        let event =
            ClientEvent::decode(r#"{"type":"play","column":123456789012345678901234567890}"#)
                .unwrap();
        assert_eq!(event, ClientEvent::Play { column: i64::MAX });

        let event =
            ClientEvent::decode(r#"{"type":"play","column":-9223372036854775809}"#).unwrap();
        assert_eq!(event, ClientEvent::Play { column: i64::MIN });
    }

    #[test]
    fn decode_column_at_i64_limits() {
        let event = ClientEvent::decode(r#"{"type":"play","column":-9223372036854775808}"#).unwrap();
        assert_eq!(event, ClientEvent::Play { column: i64::MIN });
        let event = ClientEvent::decode(r#"{"type":"play","column":9223372036854775807}"#).unwrap();
        assert_eq!(event, ClientEvent::Play { column: i64::MAX });
    }

    #[test]
    fn decode_ignores_unknown_fields() {
        let event = ClientEvent::decode(r#"{"type":"play","column":0,"extra":true}"#).unwrap();
        assert_eq!(event, ClientEvent::Play { column: 0 });
    }

    #[test]
    fn play_without_column_is_malformed() {
        let err = ClientEvent::decode(r#"{"type":"play"}"#).unwrap_err();
        assert_matches!(err, ProtocolError::Malformed(_));
    }

    #[test]
    fn non_integer_column_is_malformed() {
        assert!(ClientEvent::decode(r#"{"type":"play","column":"3"}"#).is_err());
        assert!(ClientEvent::decode(r#"{"type":"play","column":2.5}"#).is_err());
        assert!(ClientEvent::decode(r#"{"type":"play","column":3.0}"#).is_err());
        assert!(ClientEvent::decode(r#"{"type":"play","column":null}"#).is_err());
    }

    #[test]
    fn unknown_type_is_malformed() {
        let err = ClientEvent::decode(r#"{"type":"resign"}"#).unwrap_err();
        assert_matches!(err, ProtocolError::Malformed(_));
    }

    #[test]
    fn not_json_is_malformed() {
        assert!(ClientEvent::decode("hello").is_err());
        assert!(ClientEvent::decode("").is_err());
        assert!(ClientEvent::decode("[1,2]").is_err());
    }

    // ── encoding ────────────────────────────────────────────────────

    #[test]
    fn encode_init() {
        let json = ServerEvent::Init {
            join: JoinToken::from("T1"),
        }
        .encode()
        .unwrap();
        assert_snapshot!(json, @r#"{"type":"init","join":"T1"}"#);
    }

    #[test]
    fn encode_play() {
        let json = ServerEvent::Play {
            player: Player::Second,
            column: 3,
            row: 1,
        }
        .encode()
        .unwrap();
        assert_snapshot!(json, @r#"{"type":"play","player":"yellow","column":3,"row":1}"#);
    }

    #[test]
    fn encode_win() {
        let json = ServerEvent::Win {
            player: Player::First,
        }
        .encode()
        .unwrap();
        assert_snapshot!(json, @r#"{"type":"win","player":"red"}"#);
    }

    #[test]
    fn encode_error() {
        let json = ServerEvent::error("Game not found.").encode().unwrap();
        assert_snapshot!(json, @r#"{"type":"error","message":"Game not found."}"#);
    }

    #[test]
    fn server_event_kinds() {
        assert_eq!(ServerEvent::error("x").kind(), "error");
        assert_eq!(
            ServerEvent::Win {
                player: Player::First
            }
            .kind(),
            "win"
        );
    }
}
