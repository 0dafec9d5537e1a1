//! Protocol error types.

use thiserror::Error;

/// A message that breaks the wire protocol. Always fatal for the connection
/// that sent it.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Not valid JSON, or missing/mistyped fields for its `type`.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Well-formed, but not the event expected in the current state.
    #[error("expected a {expected:?} event, got {found:?}")]
    UnexpectedEvent {
        /// Event type the handler was waiting for.
        expected: &'static str,
        /// Event type that arrived.
        found: &'static str,
    },

    /// A binary frame whose payload is not UTF-8.
    #[error("binary frame is not valid UTF-8")]
    NonUtf8Frame,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn malformed_from_serde() {
        let err: ProtocolError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert_matches!(err, ProtocolError::Malformed(_));
        assert!(err.to_string().starts_with("malformed message"));
    }

    #[test]
    fn unexpected_event_display() {
        let err = ProtocolError::UnexpectedEvent {
            expected: "play",
            found: "init",
        };
        assert_eq!(err.to_string(), "expected a \"play\" event, got \"init\"");
    }
}
