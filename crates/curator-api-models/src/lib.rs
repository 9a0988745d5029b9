#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! Shared HTTP DTOs for the Curator triage endpoints.
//!
//! The dashboard server owns the bulk, per-row, and undo endpoints; these types
//! pin the JSON contract the browser relies on. Validation of a bulk response
//! lives here so every caller applies the same "explicit success" rule.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback message when the backend rejects a request without explaining why.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Value of the `status` field that signals success.
pub const STATUS_SUCCESS: &str = "success";

/// Name of a triage action. The set is open: the server decides which names it
/// accepts, the client only forwards them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionName(String);

impl ActionName {
    /// Mark the item as kept.
    pub const KEEP: &'static str = "keep";
    /// Mark the item for deletion after the grace period.
    pub const DELETE: &'static str = "delete";
    /// Keep the item on a rolling/seasonal basis (shows only).
    pub const SEASONAL: &'static str = "seasonal";
    /// Clear any score.
    pub const NOT_SCORED: &'static str = "not_scored";
    /// Restart the deletion grace period for items already marked.
    pub const RESET_GRACE_PERIOD: &'static str = "reset_grace_period";
    /// Remove the item and its files immediately.
    pub const DELETE_NOW: &'static str = "delete_now";

    /// Wrap a raw action name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Raw action name as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable form, underscores rendered as spaces.
    #[must_use]
    pub fn display_label(&self) -> String {
        self.0.replace('_', " ")
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Body of a category-scoped bulk action call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkActionRequest {
    /// Category tag shared by every id in the request.
    pub media_type: String,
    /// Server-assigned row identifiers, in selection order.
    pub ids: Vec<u64>,
    /// Action to apply.
    pub action: ActionName,
}

/// Raw bulk action response. Every field is optional so a partial body still
/// decodes and can be judged by [`BulkActionResponse::into_ack`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkActionResponse {
    /// `"success"` when the category was applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Free-form message; on failure it is surfaced verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error text used by some failure paths instead of `message`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Number of items the server touched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

/// Confirmed bulk action result for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkActionAck {
    /// Number of items the server reports as updated, when provided.
    pub count: Option<u64>,
}

/// Reasons a bulk response is not a success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulkResponseError {
    /// The backend answered but did not signal success.
    #[error("{message}")]
    Rejected {
        /// Backend-provided message or [`UNKNOWN_ERROR`].
        message: String,
    },
}

impl BulkActionResponse {
    /// Judge the response: only an explicit `status == "success"` counts.
    ///
    /// # Errors
    ///
    /// Returns [`BulkResponseError::Rejected`] carrying `message`, then
    /// `error`, then [`UNKNOWN_ERROR`] when the status is anything else.
    pub fn into_ack(self) -> Result<BulkActionAck, BulkResponseError> {
        if self.status.as_deref() == Some(STATUS_SUCCESS) {
            return Ok(BulkActionAck { count: self.count });
        }
        let message = self
            .message
            .filter(|text| !text.trim().is_empty())
            .or_else(|| self.error.filter(|text| !text.trim().is_empty()))
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        Err(BulkResponseError::Rejected { message })
    }
}

/// JSON body returned by a per-row action URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowActionResponse {
    /// Reversal target; absent when the action cannot be undone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undo_url: Option<String>,
    /// Optional status echo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Optional message echo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RowActionResponse {
    /// Reversal target when the server supplied a non-empty one.
    #[must_use]
    pub fn undo_target(&self) -> Option<&str> {
        self.undo_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
