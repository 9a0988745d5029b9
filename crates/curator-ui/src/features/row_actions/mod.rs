//! Per-row score actions with optimistic updates and undo.

pub mod actions;
pub mod controller;

pub use actions::{BADGE_BASE_CLASS, Score, failure_message, marked_message};
pub use controller::{
    RowActionController, RowActionDeps, RowActionOutcome, RowActionSettings, RowActionTrigger,
    RowSnapshot, RowTransport, RowView, UNDONE_MESSAGE,
};
