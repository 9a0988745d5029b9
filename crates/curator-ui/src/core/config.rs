//! Runtime configuration for the triage UI.
//!
//! # Design
//! - Defaults mirror the dashboard templates so an empty override is valid.
//! - Pages may embed a JSON override; unknown fields are rejected so typos surface.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;
use crate::features::preferences::{PreferenceDefaults, PreferenceKey};

/// Element id of the optional JSON configuration block.
pub const CONFIG_ELEMENT_ID: &str = "curator-config";

/// Element ids, selectors, and event names the browser bindings look up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DomSelectors {
    /// Id of the mass-edit mode toggle button.
    pub mass_edit_toggle: String,
    /// Selector matching every row checkbox.
    pub row_checkbox: String,
    /// Id of the derived select-all checkbox.
    pub select_all: String,
    /// Id of the floating bulk-action container.
    pub fab: String,
    /// Id of the element showing the selected count.
    pub selected_count: String,
    /// Selector matching bulk action buttons (`data-action` carries the name).
    pub bulk_action: String,
    /// Selector matching per-row action links.
    pub row_action: String,
    /// Selector matching the row container of an action link.
    pub row_container: String,
    /// Selector matching the score badge inside a row.
    pub score_badge: String,
    /// Id of the search input.
    pub search: String,
    /// Id of the keyboard help overlay.
    pub help_overlay: String,
    /// Id of the toast mount point (created when missing).
    pub toast_root: String,
    /// Event fired once a partial re-render has settled.
    pub rerender_event: String,
    /// Event fired after a client-side history push.
    pub history_push_event: String,
}

impl Default for DomSelectors {
    fn default() -> Self {
        Self {
            mass_edit_toggle: "mass-edit-toggle".to_string(),
            row_checkbox: ".mass-edit-checkbox".to_string(),
            select_all: "mass-edit-select-all".to_string(),
            fab: "mass-edit-fab".to_string(),
            selected_count: "selected-count".to_string(),
            bulk_action: ".mass-edit-action".to_string(),
            row_action: "a[data-action]".to_string(),
            row_container: "tr, .group".to_string(),
            score_badge: ".score-badge".to_string(),
            search: "search".to_string(),
            help_overlay: "shortcuts-help-modal".to_string(),
            toast_root: "curator-toasts".to_string(),
            rerender_event: "htmx:afterSettle".to_string(),
            history_push_event: "htmx:pushedIntoHistory".to_string(),
        }
    }
}

/// Top-level UI configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UiConfig {
    /// Bulk action endpoint path.
    pub bulk_endpoint: String,
    /// Undo window for row actions.
    pub undo_window_ms: u32,
    /// Lifetime of the "Action undone" toast.
    pub undone_toast_ms: u32,
    /// Lifetime of error toasts.
    pub error_toast_ms: u32,
    /// Label shown on a bulk action button while it is busy.
    pub loading_label: String,
    /// Prefix for page-scoped preference storage keys.
    pub storage_prefix: String,
    /// Route segments of pages that persist view preferences.
    pub page_kinds: Vec<String>,
    /// Server-side default for each preference key.
    pub preference_defaults: BTreeMap<String, String>,
    /// DOM lookups used by the bindings.
    pub selectors: DomSelectors,
}

impl Default for UiConfig {
    fn default() -> Self {
        let preference_defaults = [
            ("view", "table"),
            ("sort_by", "title"),
            ("sort_order", "asc"),
            ("score_filter", "all"),
            ("per_page", "100"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
        Self {
            bulk_endpoint: "/media/bulk_action".to_string(),
            undo_window_ms: 5_000,
            undone_toast_ms: 2_000,
            error_toast_ms: 3_000,
            loading_label: "Processing...".to_string(),
            storage_prefix: "media_dashboard_prefs_".to_string(),
            page_kinds: vec!["radarr".to_string(), "sonarr".to_string()],
            preference_defaults,
            selectors: DomSelectors::default(),
        }
    }
}

impl UiConfig {
    /// Parse and validate a JSON override; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for undecodable input and any error from
    /// [`Self::validate`].
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|err| ConfigError::Parse {
            detail: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the controllers cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bulk_endpoint.trim().is_empty() {
            return Err(invalid("bulk_endpoint", "must not be empty"));
        }
        if self.undo_window_ms == 0 {
            return Err(invalid("undo_window_ms", "must be greater than zero"));
        }
        if self.page_kinds.iter().all(|kind| kind.trim().is_empty()) {
            return Err(invalid("page_kinds", "at least one page kind is required"));
        }
        if self.storage_prefix.is_empty() {
            return Err(invalid("storage_prefix", "must not be empty"));
        }
        self.preference_defaults()?;
        Ok(())
    }

    /// Typed view of [`Self::preference_defaults`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when a key is not one of the
    /// enumerated preference keys.
    pub fn preference_defaults(&self) -> Result<PreferenceDefaults, ConfigError> {
        let mut defaults = PreferenceDefaults::default();
        for (key, value) in &self.preference_defaults {
            let Some(key) = PreferenceKey::from_param(key) else {
                return Err(invalid(
                    "preference_defaults",
                    format!("unknown preference key `{key}`"),
                ));
            };
            defaults.set(key, value.clone());
        }
        Ok(defaults)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidField {
        field,
        reason: reason.into(),
    }
}
