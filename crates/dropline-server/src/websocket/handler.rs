//! Per-connection protocol state machine.
//!
//! A connection starts in `AwaitingInit`. Its first message must be `init`:
//! without a token it creates a session and plays first, with a token it
//! joins that session and plays second. After that only `play` is accepted.
//! The handler is transport-independent; the socket task feeds it text and
//! acts on the returned [`Flow`].

use std::sync::Arc;

use dropline_core::{ClientEvent, JoinToken, Player, ProtocolError, ServerEvent};
use dropline_engine::GameAdapter;
use metrics::counter;
use tracing::{debug, error, info, warn};

use super::connection::ClientConnection;
use crate::game::{GameSession, SessionRegistry};
use crate::metrics::{
    GAMES_WON_TOTAL, MOVES_APPLIED_TOTAL, MOVES_REJECTED_TOTAL, PROTOCOL_VIOLATIONS_TOTAL,
    SESSION_JOIN_FAILURES_TOTAL, SESSION_JOINS_TOTAL,
};

/// Sent to a third connection trying to join a session.
pub const GAME_FULL: &str = "Game is full.";
/// Sent when the registry cannot issue a token.
pub const GAME_NOT_CREATED: &str = "Could not create a game.";

/// WebSocket close codes used by the broker.
pub mod close_code {
    /// Normal closure.
    pub const NORMAL: u16 = 1000;
    /// Server going away.
    pub const AWAY: u16 = 1001;
    /// Policy violation.
    pub const POLICY: u16 = 1008;
}

/// Close reasons must fit in a control frame.
const MAX_CLOSE_REASON: usize = 123;

/// Why a connection is ending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CloseReason {
    /// The handler finished its work (join refused).
    Finished,
    /// The client broke the protocol.
    Violation(String),
    /// The server is shutting down.
    Shutdown,
    /// The client stopped answering pings.
    Unresponsive,
}

impl CloseReason {
    /// Close code and reason to send, or `None` when the peer is unreachable.
    pub fn frame(&self) -> Option<(u16, String)> {
        match self {
            Self::Finished => Some((close_code::NORMAL, String::new())),
            Self::Violation(reason) => Some((close_code::POLICY, truncate_reason(reason))),
            Self::Shutdown => Some((close_code::AWAY, "server shutting down".into())),
            Self::Unresponsive => None,
        }
    }
}

fn truncate_reason(reason: &str) -> String {
    if reason.len() <= MAX_CLOSE_REASON {
        return reason.to_owned();
    }
    let mut end = MAX_CLOSE_REASON;
    while !reason.is_char_boundary(end) {
        end -= 1;
    }
    reason[..end].to_owned()
}

/// What the socket task should do after a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading.
    Continue,
    /// Close the connection.
    Close(CloseReason),
}

/// A claimed place in a session.
struct Seat {
    session: Arc<GameSession>,
    player: Player,
    creator: bool,
}

enum Phase {
    AwaitingInit,
    Playing(Seat),
    Closed,
}

/// Protocol state for one connection.
pub struct ProtocolHandler {
    connection: Arc<ClientConnection>,
    registry: Arc<SessionRegistry>,
    phase: Phase,
}

impl ProtocolHandler {
    /// Fresh handler waiting for `init`.
    pub fn new(connection: Arc<ClientConnection>, registry: Arc<SessionRegistry>) -> Self {
        Self {
            connection,
            registry,
            phase: Phase::AwaitingInit,
        }
    }

    /// This connection's role, once seated.
    pub fn player(&self) -> Option<Player> {
        match &self.phase {
            Phase::Playing(seat) => Some(seat.player),
            _ => None,
        }
    }

    /// Token of the session this connection sits in.
    pub fn token(&self) -> Option<&JoinToken> {
        match &self.phase {
            Phase::Playing(seat) => Some(seat.session.token()),
            _ => None,
        }
    }

    /// Whether this connection created its session.
    pub fn is_creator(&self) -> bool {
        matches!(&self.phase, Phase::Playing(seat) if seat.creator)
    }

    /// Decode and handle one text message.
    pub fn handle_text(&mut self, text: &str) -> Flow {
        match ClientEvent::decode(text) {
            Ok(event) => self.handle_event(event),
            Err(err) => self.violation(&err),
        }
    }

    /// Handle one decoded event.
    pub fn handle_event(&mut self, event: ClientEvent) -> Flow {
        debug!(event_type = event.kind(), "dispatching client event");
        match self.phase {
            Phase::AwaitingInit => match event {
                ClientEvent::Init { join: None } => self.create(),
                ClientEvent::Init { join: Some(token) } => self.join(&token),
                other => self.violation(&ProtocolError::UnexpectedEvent {
                    expected: "init",
                    found: other.kind(),
                }),
            },
            Phase::Playing(_) => match event {
                ClientEvent::Play { column } => self.play(column),
                other => self.violation(&ProtocolError::UnexpectedEvent {
                    expected: "play",
                    found: other.kind(),
                }),
            },
            Phase::Closed => Flow::Close(CloseReason::Finished),
        }
    }

    /// Record a protocol violation and end the connection.
    pub fn violation(&mut self, err: &ProtocolError) -> Flow {
        counter!(PROTOCOL_VIOLATIONS_TOTAL).increment(1);
        warn!(connection_id = %self.connection.id, error = %err, "protocol violation");
        self.close();
        Flow::Close(CloseReason::Violation(err.to_string()))
    }

    fn create(&mut self) -> Flow {
        let session = match self.registry.create(GameAdapter::connect_four()) {
            Ok(session) => session,
            Err(err) => {
                error!(error = %err, "failed to create session");
                return self.refuse(GAME_NOT_CREATED, "create_failed");
            }
        };

        session.add_participant(self.connection.clone());
        let _ = self.connection.send_event(&ServerEvent::Init {
            join: session.token().clone(),
        });
        info!(
            connection_id = %self.connection.id,
            token = %session.token(),
            player = %Player::First,
            "session started"
        );
        self.phase = Phase::Playing(Seat {
            session,
            player: Player::First,
            creator: true,
        });
        Flow::Continue
    }

    fn join(&mut self, token: &JoinToken) -> Flow {
        let session = match self.registry.lookup(token) {
            Ok(session) => session,
            Err(err) => {
                info!(connection_id = %self.connection.id, %token, "join refused: unknown token");
                return self.refuse(&err.to_string(), "not_found");
            }
        };

        if !session.claim_second_seat() {
            info!(connection_id = %self.connection.id, %token, "join refused: seat taken");
            return self.refuse(GAME_FULL, "full");
        }

        session.add_participant(self.connection.clone());
        counter!(SESSION_JOINS_TOTAL).increment(1);
        info!(
            connection_id = %self.connection.id,
            %token,
            player = %Player::Second,
            "session joined"
        );
        self.phase = Phase::Playing(Seat {
            session,
            player: Player::Second,
            creator: false,
        });
        Flow::Continue
    }

    fn play(&mut self, column: i64) -> Flow {
        let Phase::Playing(seat) = &self.phase else {
            return Flow::Close(CloseReason::Finished);
        };

        match seat.session.apply_move(seat.player, column) {
            Ok(outcome) => {
                counter!(MOVES_APPLIED_TOTAL).increment(1);
                debug!(
                    player = %outcome.record.player,
                    column = outcome.record.column,
                    row = outcome.record.row,
                    delivered = outcome.delivered,
                    "move applied"
                );
                if let Some(winner) = outcome.winner {
                    counter!(GAMES_WON_TOTAL).increment(1);
                    info!(token = %seat.session.token(), %winner, "game won");
                }
            }
            Err(invalid) => {
                counter!(MOVES_REJECTED_TOTAL).increment(1);
                debug!(player = %seat.player, column, reason = %invalid, "move rejected");
                let _ = self
                    .connection
                    .send_event(&ServerEvent::error(invalid.reason()));
            }
        }
        Flow::Continue
    }

    /// Send one error event and end the connection without a seat.
    fn refuse(&mut self, message: &str, reason: &'static str) -> Flow {
        counter!(SESSION_JOIN_FAILURES_TOTAL, "reason" => reason).increment(1);
        let _ = self.connection.send_event(&ServerEvent::error(message));
        self.phase = Phase::Closed;
        Flow::Close(CloseReason::Finished)
    }

    /// Release the seat. The creator's exit also unregisters the session.
    ///
    /// Idempotent; also runs on drop.
    pub fn close(&mut self) {
        let Phase::Playing(seat) = std::mem::replace(&mut self.phase, Phase::Closed) else {
            return;
        };
        let _ = seat.session.remove_participant(&self.connection.id);
        if seat.creator {
            let _ = self.registry.remove(seat.session.token());
        }
        debug!(
            connection_id = %self.connection.id,
            token = %seat.session.token(),
            creator = seat.creator,
            "seat released"
        );
    }
}

impl Drop for ProtocolHandler {
    fn drop(&mut self) {
        self.close();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
