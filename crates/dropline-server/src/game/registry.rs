//! Join token → live session index.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use dropline_core::JoinToken;
use dropline_engine::GameAdapter;
use metrics::{counter, gauge};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::session::GameSession;
use crate::errors::RegistryError;
use crate::metrics::{SESSIONS_ACTIVE, SESSIONS_CREATED_TOTAL};

/// Tokens tried before `create` gives up.
const MAX_TOKEN_ATTEMPTS: usize = 8;

/// Every session reachable by join token.
///
/// A single coarse lock makes each operation atomic with respect to the
/// others; none of them hold it across anything slower than a map update.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<JoinToken, Arc<GameSession>>>,
    generate: fn() -> JoinToken,
}

impl SessionRegistry {
    /// Empty registry issuing random tokens.
    pub fn new() -> Self {
        Self::with_token_source(JoinToken::generate)
    }

    fn with_token_source(generate: fn() -> JoinToken) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            generate,
        }
    }

    /// Register `game` under a fresh token.
    pub fn create(&self, game: GameAdapter) -> Result<Arc<GameSession>, RegistryError> {
        let mut sessions = self.sessions.write();
        for attempt in 1..=MAX_TOKEN_ATTEMPTS {
            let token = (self.generate)();
            match sessions.entry(token) {
                Entry::Vacant(slot) => {
                    let session = Arc::new(GameSession::new(slot.key().clone(), game));
                    let _ = slot.insert(session.clone());
                    counter!(SESSIONS_CREATED_TOTAL).increment(1);
                    gauge!(SESSIONS_ACTIVE).increment(1.0);
                    info!(token = %session.token(), live = sessions.len(), "session created");
                    return Ok(session);
                }
                Entry::Occupied(slot) => {
                    warn!(token = %slot.key(), attempt, "join token collision");
                }
            }
        }
        Err(RegistryError::TokenExhausted {
            attempts: MAX_TOKEN_ATTEMPTS,
        })
    }

    /// Find the session registered under `token`.
    pub fn lookup(&self, token: &JoinToken) -> Result<Arc<GameSession>, RegistryError> {
        self.sessions
            .read()
            .get(token)
            .cloned()
            .ok_or(RegistryError::NotFound)
    }

    /// Unregister `token`. Returns whether it was present; removing twice is
    /// harmless.
    pub fn remove(&self, token: &JoinToken) -> bool {
        let Some(session) = self.sessions.write().remove(token) else {
            debug!(%token, "session already removed");
            return false;
        };
        gauge!(SESSIONS_ACTIVE).decrement(1.0);
        info!(
            %token,
            age_secs = session.created_at().elapsed().as_secs(),
            participants = session.participant_count(),
            "session removed"
        );
        true
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Whether no session is live.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
