//! One live game: its rules engine and the connections watching it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use dropline_core::{ConnectionId, JoinToken, Player, ServerEvent};
use dropline_engine::{GameAdapter, InvalidMove, MoveRecord};
use parking_lot::Mutex;

use crate::websocket::broadcast::ParticipantSet;
use crate::websocket::connection::ClientConnection;

/// Result of a move that the engine accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The applied move.
    pub record: MoveRecord,
    /// Set when this move ended the game.
    pub winner: Option<Player>,
    /// Participants that accepted the `play` event.
    pub delivered: usize,
}

/// A game session, shared by its participants' connection tasks.
///
/// Lock order is `game` then `participants`.
pub struct GameSession {
    token: JoinToken,
    game: Mutex<GameAdapter>,
    participants: ParticipantSet,
    second_seat: AtomicBool,
    created_at: Instant,
}

impl GameSession {
    /// Wrap a fresh game under `token`.
    pub fn new(token: JoinToken, game: GameAdapter) -> Self {
        Self {
            token,
            game: Mutex::new(game),
            participants: ParticipantSet::new(),
            second_seat: AtomicBool::new(false),
            created_at: Instant::now(),
        }
    }

    /// The token this session is registered under.
    pub fn token(&self) -> &JoinToken {
        &self.token
    }

    /// When the session was created.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Attach a connection so it receives this session's broadcasts.
    pub fn add_participant(&self, connection: Arc<ClientConnection>) {
        self.participants.add(connection);
    }

    /// Detach a connection. Never fails; returns whether it was attached.
    pub fn remove_participant(&self, connection_id: &ConnectionId) -> bool {
        self.participants.remove(connection_id)
    }

    /// Number of attached connections.
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Best-effort fan-out to every attached connection.
    pub fn broadcast(&self, event: &ServerEvent) -> usize {
        self.participants.broadcast(event)
    }

    /// Claim the second-mover seat. Only the first caller gets `true`.
    pub fn claim_second_seat(&self) -> bool {
        self.second_seat
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Apply `player`'s move and broadcast the result.
    ///
    /// The game lock is held across the `play` and `win` broadcasts, so every
    /// participant receives complete moves in the order they were applied.
    /// Nothing is broadcast for a rejected move.
    pub fn apply_move(&self, player: Player, column: i64) -> Result<MoveOutcome, InvalidMove> {
        let mut game = self.game.lock();
        let record = game.attempt_move(player, column)?;

        let delivered = self.participants.broadcast(&ServerEvent::Play {
            player: record.player,
            column: record.column,
            row: record.row,
        });

        let winner = game.winner();
        if let Some(player) = winner {
            let _ = self.participants.broadcast(&ServerEvent::Win { player });
        }

        Ok(MoveOutcome {
            record,
            winner,
            delivered,
        })
    }

    /// The winner, if the game has ended.
    pub fn winner(&self) -> Option<Player> {
        self.game.lock().winner()
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("token", &self.token)
            .field("participants", &self.participant_count())
            .field("second_seat", &self.second_seat.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
