//! DOM lookups and mutations for the server-rendered table.

use std::cell::RefCell;
use std::collections::HashMap;

use gloo::console;
use gloo::utils::document;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlButtonElement, HtmlElement, HtmlInputElement};

use crate::core::capabilities::TriggerControl;
use crate::core::config::DomSelectors;
use crate::features::mass_edit::ModeView;
use crate::features::row_actions::{RowSnapshot, RowView, Score};
use crate::features::selection::{ItemId, RowChange, RowHandle, SelectionSummary};

const HIDDEN: &str = "hidden";
const FAB_HIDDEN: [&str; 2] = ["translate-y-full", "opacity-0"];
const TOGGLE_ACTIVE: [&str; 3] = ["bg-blue-600", "text-white", "hover:bg-blue-700"];
const TOGGLE_IDLE: [&str; 2] = ["text-gray-300", "hover:bg-gray-700/50"];
const CURSOR_CLASS: &str = "row-cursor";

/// Elements matching `selector`, in document order.
pub(crate) fn query_all<T: JsCast>(selector: &str) -> Vec<T> {
    let Ok(list) = document().query_selector_all(selector) else {
        console::warn!("invalid selector", selector);
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect()
}

pub(crate) fn by_id<T: JsCast>(id: &str) -> Option<T> {
    document()
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<T>().ok())
}

pub(crate) fn closest(element: &Element, selector: &str) -> Option<Element> {
    element.closest(selector).ok().flatten()
}

const MEDIA_TYPE_ATTR: &str = "data-media-type";

fn checkbox_id(input: &HtmlInputElement) -> Option<ItemId> {
    input.value().trim().parse().ok()
}

fn checkbox_category(input: &HtmlInputElement) -> String {
    input.get_attribute(MEDIA_TYPE_ATTR).unwrap_or_default()
}

fn set_classes(element: &Element, classes: &[&str], present: bool) {
    let list = element.class_list();
    for class in classes {
        if let Err(err) = list.toggle_with_force(class, present) {
            console::warn!("class update failed", *class, err);
        }
    }
}

/// Row checkboxes of the current rendering.
pub(crate) fn checkboxes(selectors: &DomSelectors) -> Vec<HtmlInputElement> {
    query_all(&selectors.row_checkbox)
}

/// Snapshot of the live rows. Checkboxes without a numeric value are skipped.
pub(crate) fn collect_rows(selectors: &DomSelectors) -> Vec<RowHandle> {
    checkboxes(selectors)
        .iter()
        .filter_map(|input| {
            let Some(id) = checkbox_id(input) else {
                console::warn!("row checkbox without numeric value", input.value());
                return None;
            };
            Some(RowHandle::new(id, checkbox_category(input)).with_selected(input.checked()))
        })
        .collect()
}

/// Category and id carried by a row checkbox element.
pub(crate) fn row_key(input: &HtmlInputElement) -> Option<(String, ItemId)> {
    checkbox_id(input).map(|id| (checkbox_category(input), id))
}

/// Mirror selection changes onto the checkboxes.
pub(crate) fn apply_changes(selectors: &DomSelectors, changes: &[RowChange]) {
    if changes.is_empty() {
        return;
    }
    let wanted: HashMap<(&str, ItemId), bool> = changes
        .iter()
        .map(|change| ((change.category.as_str(), change.id), change.selected))
        .collect();
    for input in checkboxes(selectors) {
        let Some((category, id)) = row_key(&input) else {
            continue;
        };
        if let Some(selected) = wanted.get(&(category.as_str(), id)) {
            input.set_checked(*selected);
        }
    }
}

/// Toggle label, toggle styling, and checkbox visibility.
pub(crate) fn apply_mode(selectors: &DomSelectors, view: ModeView) {
    if let Some(toggle) = by_id::<Element>(&selectors.mass_edit_toggle) {
        toggle.set_text_content(Some(view.toggle_label));
        set_classes(&toggle, &["active"], view.active);
        set_classes(&toggle, &TOGGLE_ACTIVE, view.active);
        set_classes(&toggle, &TOGGLE_IDLE, !view.active);
    }
    for input in checkboxes(selectors) {
        set_classes(&input, &[HIDDEN], !view.affordances_visible());
    }
    if let Some(select_all) = by_id::<Element>(&selectors.select_all) {
        set_classes(&select_all, &[HIDDEN], !view.affordances_visible());
    }
}

/// Count label, floating action button, and the derived select-all box.
pub(crate) fn render_summary(selectors: &DomSelectors, summary: &SelectionSummary) {
    if let Some(count) = by_id::<Element>(&selectors.selected_count) {
        count.set_text_content(Some(&summary.count.to_string()));
    }
    if let Some(fab) = by_id::<Element>(&selectors.fab) {
        set_classes(&fab, &FAB_HIDDEN, !summary.fab_visible());
    }
    if let Some(select_all) = by_id::<HtmlInputElement>(&selectors.select_all) {
        select_all.set_checked(summary.select_all.checked());
        select_all.set_indeterminate(summary.select_all.indeterminate());
    }
}

/// Rows the keyboard cursor moves over.
pub(crate) fn cursor_rows(selectors: &DomSelectors) -> Vec<Element> {
    let mut rows: Vec<Element> = Vec::new();
    for badge in query_all::<Element>(&selectors.score_badge) {
        if let Some(row) = closest(&badge, &selectors.row_container) {
            if !rows.contains(&row) {
                rows.push(row);
            }
        }
    }
    rows
}

/// Move the cursor highlight to `index`.
pub(crate) fn highlight_row(rows: &[Element], index: usize) {
    for (position, row) in rows.iter().enumerate() {
        set_classes(row, &[CURSOR_CLASS], position == index);
    }
    if let Some(row) = rows.get(index) {
        row.scroll_into_view_with_bool(false);
    }
}

pub(crate) fn toggle_hidden(element: &Element) {
    if let Err(err) = element.class_list().toggle(HIDDEN) {
        console::warn!("class update failed", err);
    }
}

pub(crate) fn hide(element: &Element) {
    set_classes(element, &[HIDDEN], true);
}

/// A table row or poster card owned by one row action.
pub(crate) struct DomRow {
    row: HtmlElement,
    badge_selector: String,
}

impl DomRow {
    pub(crate) fn new(row: HtmlElement, badge_selector: impl Into<String>) -> Self {
        Self {
            row,
            badge_selector: badge_selector.into(),
        }
    }

    fn badge(&self) -> Option<Element> {
        self.row.query_selector(&self.badge_selector).ok().flatten()
    }

    fn set_style(&self, property: &str, value: &str) {
        if let Err(err) = self.row.style().set_property(property, value) {
            console::warn!("style update failed", property, err);
        }
    }
}

impl RowView for DomRow {
    fn snapshot(&self) -> RowSnapshot {
        self.badge().map_or_else(RowSnapshot::default, |badge| RowSnapshot {
            badge_label: badge.text_content(),
            badge_class: Some(badge.class_name()),
        })
    }

    fn apply_score(&self, score: Score) {
        if let Some(badge) = self.badge() {
            badge.set_class_name(&score.badge_class());
            badge.set_text_content(Some(score.label()));
        }
    }

    fn set_pending(&self, pending: bool) {
        if pending {
            self.set_style("opacity", "0.7");
            self.set_style("pointer-events", "none");
        } else {
            self.set_style("opacity", "1");
            self.set_style("pointer-events", "auto");
        }
    }

    fn restore(&self, snapshot: &RowSnapshot) {
        let Some(badge) = self.badge() else {
            return;
        };
        if let Some(class) = &snapshot.badge_class {
            badge.set_class_name(class);
        }
        badge.set_text_content(snapshot.badge_label.as_deref());
    }
}

/// Bulk action button put into its busy state during a dispatch.
pub(crate) struct ButtonControl {
    button: HtmlButtonElement,
    original: RefCell<Option<String>>,
}

impl ButtonControl {
    pub(crate) fn new(button: HtmlButtonElement) -> Self {
        Self {
            button,
            original: RefCell::new(None),
        }
    }
}

impl TriggerControl for ButtonControl {
    fn enter_loading(&self, label: &str) {
        *self.original.borrow_mut() = self.button.text_content();
        self.button.set_text_content(Some(label));
        self.button.set_disabled(true);
    }

    fn restore(&self) {
        let original = self.original.borrow_mut().take();
        if original.is_some() {
            self.button.set_text_content(original.as_deref());
        }
        self.button.set_disabled(false);
    }
}
