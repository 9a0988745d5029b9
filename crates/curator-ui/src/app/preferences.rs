//! Persistence and environment helpers for the app shell.

use gloo::console;
use gloo::storage::{LocalStorage, Storage};
use gloo::utils::{document, window};
use url::Url;

use crate::core::config::{CONFIG_ELEMENT_ID, UiConfig};
use crate::core::error::StorageError;
use crate::features::preferences::PreferenceStorage;

/// `localStorage` holding raw JSON strings; records stay readable by other page scripts.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LocalPreferenceStorage;

impl PreferenceStorage for LocalPreferenceStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        LocalStorage::raw().get_item(key).map_err(|err| {
            let detail = format!("{err:?}");
            log_storage_error("read", key, &detail);
            StorageError::Unavailable { detail }
        })
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        LocalStorage::raw().set_item(key, value).map_err(|err| {
            let detail = format!("{err:?}");
            log_storage_error("write", key, &detail);
            StorageError::Unavailable { detail }
        })
    }
}

/// Configuration from the page's JSON block, or defaults when absent or invalid.
pub(crate) fn load_config() -> UiConfig {
    let Some(raw) = document()
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|element| element.text_content())
        .filter(|raw| !raw.trim().is_empty())
    else {
        return UiConfig::default();
    };
    match UiConfig::from_json(&raw) {
        Ok(config) => config,
        Err(err) => {
            console::error!("invalid ui configuration, using defaults", format!("{err:?}"));
            UiConfig::default()
        }
    }
}

/// Current page URL.
pub(crate) fn current_url() -> Option<Url> {
    let href = window().location().href().ok()?;
    Url::parse(&href).ok()
}

fn log_storage_error(operation: &'static str, key: &str, detail: &str) {
    console::error!("storage operation failed", operation, key, detail);
}
