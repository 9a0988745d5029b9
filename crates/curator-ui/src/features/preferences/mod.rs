//! View preferences persisted per page kind.

pub mod record;
pub mod store;

pub use record::{PreferenceDefaults, PreferenceKey, PreferenceRecord, with_preferences};
pub use store::{
    LoadDecision, PageIdentity, PreferenceSettings, PreferenceStorage, PreferenceStore,
};
