//! Move rejection reasons.

use thiserror::Error;

/// Why the engine refused a move. The `Display` text is sent verbatim to the
/// player who tried it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidMove {
    /// A winner has already been decided.
    #[error("The game is already over.")]
    GameOver,
    /// The same player tried to move twice in a row.
    #[error("It isn't your turn.")]
    NotYourTurn,
    /// Column index outside the board.
    #[error("Invalid column.")]
    ColumnOutOfRange {
        /// The column that was requested.
        column: i64,
    },
    /// No free cell left in the column.
    #[error("This slot is full.")]
    ColumnFull {
        /// The full column.
        column: usize,
    },
}

impl InvalidMove {
    /// Reason string forwarded to the client.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}
