//! Mass edit mode controller.
//!
//! # Design
//! - Owns the "mass edit active" flag; nothing else reads or writes it.
//! - Owns the [`SelectionModel`] so leaving the mode and re-render barriers
//!   always go through one place.

use std::cell::RefCell;

use tracing::debug;

use crate::features::selection::{
    ActionGroup, RowChange, RowHandle, SelectionModel, SelectionSource, SelectionSummary,
};

/// Toggle label while the mode is off.
pub const ENTER_LABEL: &str = "Mass Edit";
/// Toggle label while the mode is on.
pub const EXIT_LABEL: &str = "Exit Mass Edit";

/// Visual state the bindings apply to the toggle and the row checkboxes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeView {
    /// Whether mass edit is engaged.
    pub active: bool,
    /// Label for the toggle control.
    pub toggle_label: &'static str,
}

impl ModeView {
    const fn for_state(active: bool) -> Self {
        Self {
            active,
            toggle_label: if active { EXIT_LABEL } else { ENTER_LABEL },
        }
    }

    /// Row checkboxes are shown only while the mode is on.
    #[must_use]
    pub const fn affordances_visible(&self) -> bool {
        self.active
    }
}

/// Result of entering, leaving, or re-synchronizing the mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeTransition {
    /// Visual state to apply.
    pub view: ModeView,
    /// Checkboxes that must be unchecked on the page.
    pub cleared: Vec<RowChange>,
    /// Selection summary after the transition.
    pub summary: SelectionSummary,
}

/// Mass edit controller.
#[derive(Debug, Default)]
pub struct MassEditController {
    active: bool,
    selection: SelectionModel,
}

impl MassEditController {
    /// Controller with the mode off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the mode is engaged.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Current visual state.
    #[must_use]
    pub const fn view(&self) -> ModeView {
        ModeView::for_state(self.active)
    }

    /// Flip the mode.
    pub fn toggle(&mut self) -> ModeTransition {
        if self.active { self.exit() } else { self.enter() }
    }

    /// Engage the mode.
    pub fn enter(&mut self) -> ModeTransition {
        self.active = true;
        debug!(rows = self.selection.rows().len(), "mass edit enabled");
        ModeTransition {
            view: self.view(),
            cleared: Vec::new(),
            summary: self.selection.summary(),
        }
    }

    /// Leave the mode, unchecking every row.
    pub fn exit(&mut self) -> ModeTransition {
        self.active = false;
        let cleared = self.selection.clear_all();
        debug!(cleared = cleared.len(), "mass edit disabled");
        ModeTransition {
            view: self.view(),
            cleared,
            summary: self.selection.summary(),
        }
    }

    /// Re-render barrier: adopt the live rows and report the state to reapply.
    ///
    /// With the mode off, any row that arrives checked is unchecked so hidden
    /// checkboxes never carry a selection.
    pub fn resync(&mut self, rows: impl IntoIterator<Item = RowHandle>) -> ModeTransition {
        let summary = self.selection.resync(rows);
        let cleared = if self.active || summary.count == 0 {
            Vec::new()
        } else {
            self.selection.clear_all()
        };
        ModeTransition {
            view: self.view(),
            cleared,
            summary: self.selection.summary(),
        }
    }

    /// Read access to the selection.
    #[must_use]
    pub const fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    /// Write access to the selection.
    pub const fn selection_mut(&mut self) -> &mut SelectionModel {
        &mut self.selection
    }
}

impl SelectionSource for MassEditController {
    fn selected_group(&self) -> ActionGroup {
        self.selection.selected_by_category()
    }
}

impl<T: SelectionSource> SelectionSource for RefCell<T> {
    fn selected_group(&self) -> ActionGroup {
        self.borrow().selected_group()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<RowHandle> {
        vec![RowHandle::new(1, "movie"), RowHandle::new(2, "movie")]
    }

    #[test]
    fn toggle_swaps_labels_and_visibility() {
        let mut controller = MassEditController::new();
        assert_eq!(controller.view().toggle_label, ENTER_LABEL);
        let on = controller.toggle();
        assert!(on.view.active);
        assert!(on.view.affordances_visible());
        assert_eq!(on.view.toggle_label, EXIT_LABEL);
        let off = controller.toggle();
        assert!(!off.view.affordances_visible());
        assert_eq!(off.view.toggle_label, ENTER_LABEL);
    }

    #[test]
    fn leaving_clears_selection() {
        let mut controller = MassEditController::new();
        controller.resync(rows());
        controller.enter();
        controller.selection_mut().select_all(true);
        let transition = controller.exit();
        assert_eq!(transition.cleared.len(), 2);
        assert_eq!(transition.summary.count, 0);
        assert!(!transition.summary.fab_visible());
    }

    #[test]
    fn resync_reapplies_mode_state() {
        let mut controller = MassEditController::new();
        let inactive = controller.resync(vec![RowHandle::new(1, "movie").with_selected(true)]);
        assert!(!inactive.view.affordances_visible());
        assert_eq!(inactive.cleared.len(), 1);
        assert_eq!(inactive.summary.count, 0);

        controller.enter();
        let active = controller.resync(vec![RowHandle::new(5, "show").with_selected(true)]);
        assert!(active.view.affordances_visible());
        assert!(active.cleared.is_empty());
        assert_eq!(active.summary.count, 1);
    }

    #[test]
    fn refcell_source_reads_live_selection() {
        let controller = RefCell::new(MassEditController::new());
        controller.borrow_mut().resync(rows());
        controller.borrow_mut().selection_mut().toggle("movie", 2, false);
        let group = controller.selected_group();
        assert_eq!(group.item_count(), 1);
    }
}
