//! Feature slices for the triage dashboard.
pub mod bulk;
pub mod mass_edit;
pub mod preferences;
pub mod row_actions;
pub mod selection;
pub mod undo;
