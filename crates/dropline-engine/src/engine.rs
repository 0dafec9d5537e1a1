//! Rules engine contract.

use dropline_core::Player;

use crate::errors::InvalidMove;

/// A turn-based drop game.
///
/// Implementations own their board and are mutated through `&mut self`; the
/// session holding one guarantees a single caller at a time.
pub trait GameEngine: Send {
    /// Apply `player`'s move into `column` and return the row it landed in.
    fn play(&mut self, player: Player, column: i64) -> Result<usize, InvalidMove>;

    /// The winner, once the game has reached a terminal state.
    fn winner(&self) -> Option<Player>;
}
