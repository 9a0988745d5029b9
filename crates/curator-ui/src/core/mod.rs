//! Core, DOM-free primitives and helpers for the triage UI.
pub mod capabilities;
pub mod config;
pub mod error;
pub mod logging;
pub mod shortcuts;
pub mod subscriptions;

#[cfg(test)]
pub(crate) mod testing;
