//! Bulk action dispatch for mass edit.

pub mod dispatcher;

pub use dispatcher::{
    BulkDeps, BulkDispatcher, BulkSettings, BulkTransport, DispatchOutcome, ERROR_PREFIX,
    confirmation_message,
};
