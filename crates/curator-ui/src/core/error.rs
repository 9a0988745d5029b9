//! Error types for the triage UI.
//!
//! # Design
//! - One enum per concern so call sites can turn each into the right notification.
//! - Keep messages constant and carry context in fields.
//! - Every network failure ends at the call site that started it; nothing here is
//!   meant to reach a global handler.

use thiserror::Error;

/// Generic message shown when a request never produced a usable answer.
pub const NETWORK_FAILURE: &str = "Network request failed";

/// Failures raised by HTTP capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be sent or the connection dropped.
    #[error("network request failed: {detail}")]
    Network {
        /// Transport diagnostic.
        detail: String,
    },
    /// The server answered with a non-success HTTP status.
    #[error("request returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
    /// The body did not match the expected shape.
    #[error("malformed response: {detail}")]
    Malformed {
        /// Decoder diagnostic.
        detail: String,
    },
}

impl TransportError {
    /// Build a [`TransportError::Network`] from any displayable failure.
    #[must_use]
    pub fn network(err: impl std::fmt::Display) -> Self {
        Self::Network {
            detail: err.to_string(),
        }
    }

    /// Build a [`TransportError::Malformed`] from any displayable failure.
    #[must_use]
    pub fn malformed(err: impl std::fmt::Display) -> Self {
        Self::Malformed {
            detail: err.to_string(),
        }
    }
}

/// Bulk dispatch failures. The first failing category halts the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The backend answered without an explicit success signal.
    #[error("bulk action rejected")]
    Rejected {
        /// Category whose request was rejected.
        category: String,
        /// Backend message, or the generic fallback.
        message: String,
    },
    /// The request for a category failed in transit or returned garbage.
    #[error("bulk action request failed")]
    Transport {
        /// Category whose request failed.
        category: String,
        /// Underlying transport failure.
        source: TransportError,
    },
}

impl DispatchError {
    /// Category that stopped the pipeline.
    #[must_use]
    pub fn category(&self) -> &str {
        match self {
            Self::Rejected { category, .. } | Self::Transport { category, .. } => category,
        }
    }

    /// Text shown to the user. Backend messages are surfaced verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            Self::Transport {
                source: TransportError::Malformed { .. },
                ..
            } => curator_api_models::UNKNOWN_ERROR.to_string(),
            Self::Transport { .. } => NETWORK_FAILURE.to_string(),
        }
    }
}

/// Failures of a single-row action request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowActionError {
    /// The action request failed; the optimistic change was reverted.
    #[error("row action request failed")]
    Transport {
        /// Underlying transport failure.
        source: TransportError,
    },
}

impl RowActionError {
    /// Text shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport {
                source: TransportError::Status { status },
            } => format!("server returned HTTP {status}"),
            Self::Transport {
                source: TransportError::Malformed { .. },
            } => curator_api_models::UNKNOWN_ERROR.to_string(),
            Self::Transport { .. } => NETWORK_FAILURE.to_string(),
        }
    }
}

/// Undo failures. Rejections are never silent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UndoError {
    /// The undo window elapsed before the user acted.
    #[error("Cannot undo: the undo window has expired")]
    Expired,
    /// The token was already used.
    #[error("Cannot undo: this action was already undone")]
    AlreadyConsumed,
    /// No token with that id was ever armed.
    #[error("Cannot undo: unknown action")]
    Unknown,
    /// The reversal request itself failed.
    #[error("Failed to undo")]
    Request {
        /// Underlying transport failure.
        source: TransportError,
    },
}

/// Durable storage failures. Callers log these and fall back to "nothing stored".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The storage backend refused the operation.
    #[error("storage unavailable")]
    Unavailable {
        /// Backend diagnostic.
        detail: String,
    },
    /// A stored value could not be decoded.
    #[error("stored value could not be parsed")]
    Parse {
        /// Decoder diagnostic.
        detail: String,
    },
    /// A value could not be encoded for storage.
    #[error("value could not be encoded")]
    Encode {
        /// Encoder diagnostic.
        detail: String,
    },
}

/// Configuration validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The configuration document could not be decoded.
    #[error("configuration could not be parsed")]
    Parse {
        /// Decoder diagnostic.
        detail: String,
    },
    /// A field holds an unusable value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
