//! Row selection for mass edit.

pub mod state;

pub use state::{
    ActionGroup, ItemId, RowChange, RowHandle, SelectAllState, SelectionModel, SelectionSource,
    SelectionSummary,
};
