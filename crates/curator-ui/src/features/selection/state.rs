//! Multi-select state for mass edit, kept DOM-free for native testing.
//!
//! # Design
//! - Rows are a snapshot of the live checkboxes. A partial re-render invalidates
//!   the snapshot, so [`SelectionModel::resync`] replaces it wholesale and drops the anchor.
//! - "Select all" is derived from the rows and never stored.
//! - Every mutation returns the rows whose checked state changed so bindings can
//!   mirror them onto the page.

use crate::core::subscriptions::Subscriptions;

/// Server-assigned row identifier.
pub type ItemId = u64;

/// One selectable row in the current rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowHandle {
    /// Server identifier. Unique only within its category: movies and shows
    /// are numbered independently and can share ids on one page.
    pub id: ItemId,
    /// Category tag used to partition bulk requests.
    pub category: String,
    /// Whether the row checkbox is checked.
    pub selected: bool,
    /// Ordinal within the current rendering.
    pub position: usize,
}

impl RowHandle {
    /// Unselected row; `position` is assigned on [`SelectionModel::resync`].
    #[must_use]
    pub fn new(id: ItemId, category: impl Into<String>) -> Self {
        Self {
            id,
            category: category.into(),
            selected: false,
            position: 0,
        }
    }

    /// Same row with the given checked state.
    #[must_use]
    pub const fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Whether this row is `id` within `category`.
    #[must_use]
    pub fn is(&self, category: &str, id: ItemId) -> bool {
        self.id == id && self.category == category
    }
}

/// Derived state of the select-all control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectAllState {
    /// No rows, or none selected.
    Unchecked,
    /// Some but not all rows selected.
    Indeterminate,
    /// At least one row and all of them selected.
    Checked,
}

impl SelectAllState {
    /// Derive the state from counts.
    #[must_use]
    pub const fn from_counts(selected: usize, total: usize) -> Self {
        if selected == 0 || total == 0 {
            Self::Unchecked
        } else if selected >= total {
            Self::Checked
        } else {
            Self::Indeterminate
        }
    }

    /// Value for the control's `checked` property.
    #[must_use]
    pub const fn checked(self) -> bool {
        matches!(self, Self::Checked)
    }

    /// Value for the control's `indeterminate` property.
    #[must_use]
    pub const fn indeterminate(self) -> bool {
        matches!(self, Self::Indeterminate)
    }
}

/// Selected ids grouped by category, categories in first-seen row order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionGroup {
    groups: Vec<(String, Vec<ItemId>)>,
}

impl ActionGroup {
    /// Group the selected rows, preserving row order within each category.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a RowHandle>) -> Self {
        let mut group = Self::default();
        for row in rows.into_iter().filter(|row| row.selected) {
            group.push(&row.category, row.id);
        }
        group
    }

    fn push(&mut self, category: &str, id: ItemId) {
        if let Some((_, ids)) = self.groups.iter_mut().find(|(name, _)| name == category) {
            ids.push(id);
        } else {
            self.groups.push((category.to_string(), vec![id]));
        }
    }

    /// Categories with their ids, in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ItemId])> {
        self.groups
            .iter()
            .map(|(category, ids)| (category.as_str(), ids.as_slice()))
    }

    /// Category names in dispatch order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        self.groups.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Total number of ids across categories.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|(_, ids)| ids.len()).sum()
    }

    /// True when nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Checked-state change to mirror onto a row checkbox.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowChange {
    /// Row identifier.
    pub id: ItemId,
    /// Category of the row; ids alone are ambiguous.
    pub category: String,
    /// New checked state.
    pub selected: bool,
}

/// Snapshot published to the count display, the floating action button, and
/// the select-all control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionSummary {
    /// Selected row count.
    pub count: usize,
    /// Rows in the current rendering.
    pub total: usize,
    /// Derived select-all state.
    pub select_all: SelectAllState,
}

impl SelectionSummary {
    /// The floating action button shows only when something is selected.
    #[must_use]
    pub const fn fab_visible(&self) -> bool {
        self.count > 0
    }
}

/// Anything that can hand the dispatcher a fresh [`ActionGroup`].
pub trait SelectionSource {
    /// Group the rows selected right now.
    fn selected_group(&self) -> ActionGroup;
}

/// Checkbox state machine behind mass edit.
#[derive(Debug, Default)]
pub struct SelectionModel {
    rows: Vec<RowHandle>,
    anchor: Option<usize>,
    listeners: Subscriptions<String, SelectionSummary>,
}

impl SelectionModel {
    /// Empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the row snapshot with the live rows after a (re-)render.
    ///
    /// Positions are reassigned from the iteration order and the range anchor
    /// is dropped: nothing from the previous rendering survives.
    pub fn resync(&mut self, rows: impl IntoIterator<Item = RowHandle>) -> SelectionSummary {
        self.rows = rows
            .into_iter()
            .enumerate()
            .map(|(position, mut row)| {
                row.position = position;
                row
            })
            .collect();
        self.anchor = None;
        self.publish()
    }

    /// Rows of the current rendering in order.
    #[must_use]
    pub fn rows(&self) -> &[RowHandle] {
        &self.rows
    }

    /// Flip the row `id` of `category`; with `with_range` and an anchor, extend
    /// the new state over the span.
    pub fn toggle(&mut self, category: &str, id: ItemId, with_range: bool) -> Vec<RowChange> {
        let Some(index) = self.index_of(category, id) else {
            return Vec::new();
        };
        let next = !self.rows[index].selected;
        self.apply_click(index, next, with_range)
    }

    /// Record a click whose checkbox already holds `checked` (browser default action).
    pub fn set_from_click(
        &mut self,
        category: &str,
        id: ItemId,
        checked: bool,
        with_range: bool,
    ) -> Vec<RowChange> {
        let Some(index) = self.index_of(category, id) else {
            return Vec::new();
        };
        self.apply_click(index, checked, with_range)
    }

    fn apply_click(&mut self, index: usize, checked: bool, with_range: bool) -> Vec<RowChange> {
        let span = match self.anchor {
            Some(anchor) if with_range => anchor.min(index)..=anchor.max(index),
            _ => index..=index,
        };
        let mut changes = Vec::new();
        for row in &mut self.rows[span] {
            if row.selected != checked {
                row.selected = checked;
                changes.push(RowChange {
                    id: row.id,
                    category: row.category.clone(),
                    selected: checked,
                });
            }
        }
        self.anchor = Some(index);
        self.publish();
        changes
    }

    /// Set every row to `selected`.
    pub fn select_all(&mut self, selected: bool) -> Vec<RowChange> {
        let mut changes = Vec::new();
        for row in &mut self.rows {
            if row.selected != selected {
                row.selected = selected;
                changes.push(RowChange {
                    id: row.id,
                    category: row.category.clone(),
                    selected,
                });
            }
        }
        self.publish();
        changes
    }

    /// Uncheck every row and forget the range anchor.
    pub fn clear_all(&mut self) -> Vec<RowChange> {
        self.anchor = None;
        self.select_all(false)
    }

    /// Number of selected rows.
    #[must_use]
    pub fn count(&self) -> usize {
        self.rows.iter().filter(|row| row.selected).count()
    }

    /// Whether the row `id` of `category` is selected.
    #[must_use]
    pub fn is_selected(&self, category: &str, id: ItemId) -> bool {
        self.rows.iter().any(|row| row.is(category, id) && row.selected)
    }

    /// Row holding the range anchor.
    #[must_use]
    pub fn anchor(&self) -> Option<&RowHandle> {
        self.anchor.and_then(|index| self.rows.get(index))
    }

    /// Derived select-all state.
    #[must_use]
    pub fn select_all_state(&self) -> SelectAllState {
        SelectAllState::from_counts(self.count(), self.rows.len())
    }

    /// Current summary.
    #[must_use]
    pub fn summary(&self) -> SelectionSummary {
        SelectionSummary {
            count: self.count(),
            total: self.rows.len(),
            select_all: self.select_all_state(),
        }
    }

    /// Selected ids partitioned by category.
    #[must_use]
    pub fn selected_by_category(&self) -> ActionGroup {
        ActionGroup::from_rows(&self.rows)
    }

    /// Subscribe to summary changes under `key`; rebinding a key replaces its handler.
    pub fn on_change(&mut self, key: impl Into<String>, handler: impl Fn(&SelectionSummary) + 'static) {
        self.listeners.bind(key.into(), handler);
    }

    fn index_of(&self, category: &str, id: ItemId) -> Option<usize> {
        self.rows.iter().position(|row| row.is(category, id))
    }

    fn publish(&self) -> SelectionSummary {
        let summary = self.summary();
        self.listeners.emit(&summary);
        summary
    }
}

impl SelectionSource for SelectionModel {
    fn selected_group(&self) -> ActionGroup {
        self.selected_by_category()
    }
}
