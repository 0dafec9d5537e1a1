//! Server error types.

use thiserror::Error;

/// Session registry failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No live session has this token. Normal outcome of a stale or
    /// mistyped join; the message is sent to the client as-is.
    #[error("Game not found.")]
    NotFound,

    /// Every generated token collided with a live session.
    #[error("could not generate a unique join token after {attempts} attempts")]
    TokenExhausted {
        /// How many tokens were tried.
        attempts: usize,
    },
}
