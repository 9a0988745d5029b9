//! Time-boxed undo tokens.
//!
//! # Design
//! - A token is `Pending` until it is consumed or expires; both are terminal.
//! - The deadline is checked on consumption, so a click that lands after the
//!   deadline is rejected even when the expiry timer has not fired yet.
//! - Tokens are independent; rapid distinct actions may hold several at once.

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::capabilities::Millis;
use crate::core::error::UndoError;

/// Identifier of an armed undo token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UndoTokenId(u64);

impl UndoTokenId {
    /// Raw numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Lifecycle state of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenState {
    /// Still actionable until its deadline.
    Pending,
    /// The user undid the action.
    Consumed,
    /// The window elapsed.
    Expired,
}

/// One pending reversible action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndoToken {
    /// Token id.
    pub id: UndoTokenId,
    /// Reversal URL supplied by the server.
    pub reversal_endpoint: String,
    /// Text shown next to the undo control.
    pub description: String,
    /// Creation time.
    pub created_at_ms: Millis,
    /// Deadline; consumption at or after it is rejected.
    pub expires_at_ms: Millis,
    /// Lifecycle state.
    pub state: TokenState,
}

impl UndoToken {
    /// Whether the token may still be consumed at `now_ms`.
    #[must_use]
    pub fn is_actionable(&self, now_ms: Millis) -> bool {
        self.state == TokenState::Pending && now_ms < self.expires_at_ms
    }
}

/// Registry of armed tokens.
#[derive(Debug)]
pub struct UndoRegistry {
    window_ms: Millis,
    next_id: u64,
    tokens: BTreeMap<UndoTokenId, UndoToken>,
}

impl UndoRegistry {
    /// Registry whose tokens live for `window_ms`.
    #[must_use]
    pub const fn new(window_ms: Millis) -> Self {
        Self {
            window_ms,
            next_id: 1,
            tokens: BTreeMap::new(),
        }
    }

    /// Undo window length.
    #[must_use]
    pub const fn window_ms(&self) -> Millis {
        self.window_ms
    }

    /// Arm a new token.
    pub fn arm(
        &mut self,
        reversal_endpoint: impl Into<String>,
        description: impl Into<String>,
        now_ms: Millis,
    ) -> UndoTokenId {
        self.prune(now_ms);
        let id = UndoTokenId(self.next_id);
        self.next_id += 1;
        let token = UndoToken {
            id,
            reversal_endpoint: reversal_endpoint.into(),
            description: description.into(),
            created_at_ms: now_ms,
            expires_at_ms: now_ms.saturating_add(self.window_ms),
            state: TokenState::Pending,
        };
        debug!(token = id.get(), expires_at_ms = token.expires_at_ms, "undo token armed");
        self.tokens.insert(id, token);
        id
    }

    /// Consume a pending token and return its reversal endpoint.
    ///
    /// # Errors
    ///
    /// [`UndoError::Unknown`] for ids never armed (or long settled),
    /// [`UndoError::AlreadyConsumed`] on a second attempt, and
    /// [`UndoError::Expired`] once the deadline has passed.
    pub fn consume(&mut self, id: UndoTokenId, now_ms: Millis) -> Result<String, UndoError> {
        let token = self.tokens.get_mut(&id).ok_or(UndoError::Unknown)?;
        match token.state {
            TokenState::Consumed => Err(UndoError::AlreadyConsumed),
            TokenState::Expired => Err(UndoError::Expired),
            TokenState::Pending if now_ms >= token.expires_at_ms => {
                token.state = TokenState::Expired;
                debug!(token = id.get(), "undo rejected after deadline");
                Err(UndoError::Expired)
            }
            TokenState::Pending => {
                token.state = TokenState::Consumed;
                debug!(token = id.get(), "undo token consumed");
                Ok(token.reversal_endpoint.clone())
            }
        }
    }

    /// Timer callback: move a pending token to `Expired`. Returns `true` on transition.
    pub fn expire(&mut self, id: UndoTokenId) -> bool {
        match self.tokens.get_mut(&id) {
            Some(token) if token.state == TokenState::Pending => {
                token.state = TokenState::Expired;
                debug!(token = id.get(), "undo token expired");
                true
            }
            _ => false,
        }
    }

    /// Look up a token.
    #[must_use]
    pub fn get(&self, id: UndoTokenId) -> Option<&UndoToken> {
        self.tokens.get(&id)
    }

    // Settled tokens are kept for one extra window so late clicks still get a
    // precise rejection instead of "unknown".
    fn prune(&mut self, now_ms: Millis) {
        let grace = self.window_ms;
        self.tokens.retain(|_, token| {
            token.state == TokenState::Pending
                || now_ms < token.expires_at_ms.saturating_add(grace)
        });
    }
}
