//! Keyboard shortcut interpretation, kept pure for non-wasm testing.

use curator_api_models::ActionName;

/// Semantic action behind a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    /// Focus the search input.
    FocusSearch,
    /// Toggle mass edit mode.
    ToggleMassEdit,
    /// Leave mass edit mode and close the help overlay.
    Dismiss,
    /// Blur the focused text input.
    BlurInput,
    /// Show or hide the shortcut help overlay.
    ToggleHelp,
    /// Move the row cursor down.
    NextRow,
    /// Move the row cursor up.
    PrevRow,
    /// Trigger a row action on the row under the cursor.
    RowAction(&'static str),
}

/// Map a key press to a shortcut.
///
/// Inside text inputs only `Escape` is honoured (it blurs the input).
#[must_use]
pub fn interpret_shortcut(key: &str, shift: bool, in_text_field: bool) -> Option<Shortcut> {
    if in_text_field {
        return (key == "Escape").then_some(Shortcut::BlurInput);
    }
    match key {
        "/" => Some(Shortcut::FocusSearch),
        "m" => Some(Shortcut::ToggleMassEdit),
        "Escape" => Some(Shortcut::Dismiss),
        "?" if shift => Some(Shortcut::ToggleHelp),
        "j" | "ArrowDown" => Some(Shortcut::NextRow),
        "k" | "ArrowUp" => Some(Shortcut::PrevRow),
        "K" if shift => Some(Shortcut::RowAction(ActionName::KEEP)),
        "D" if shift => Some(Shortcut::RowAction(ActionName::DELETE)),
        "S" if shift => Some(Shortcut::RowAction(ActionName::SEASONAL)),
        _ => None,
    }
}

/// Move the row cursor; returns the new index, or `None` when there are no rows.
#[must_use]
pub fn advance_cursor(shortcut: Shortcut, current: Option<usize>, total: usize) -> Option<usize> {
    if total == 0 {
        return None;
    }
    let last = total - 1;
    match (shortcut, current) {
        (Shortcut::NextRow, None) => Some(0),
        (Shortcut::PrevRow, None) => Some(last),
        (Shortcut::NextRow, Some(index)) => Some((index + 1).min(last)),
        (Shortcut::PrevRow, Some(index)) => Some(index.min(last).saturating_sub(1)),
        (_, current) => current.map(|index| index.min(last)),
    }
}
