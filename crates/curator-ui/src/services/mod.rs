//! Browser-backed implementations of the controller capabilities.
pub(crate) mod api;
pub(crate) mod browser;
