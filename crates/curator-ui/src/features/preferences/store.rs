//! View-preference synchronization between the URL and durable storage.
//!
//! # Design
//! - Active only on pages whose last path segment is a configured page kind.
//! - The URL is the source of truth once it carries any enumerated key; stored
//!   values are only consulted on a clean load.
//! - A redirect happens at most once per load and only when a stored value
//!   differs from its server default.
//! - Storage failures are logged and read as "nothing stored".

use std::rc::Rc;

use tracing::{debug, warn};
use url::Url;

use crate::core::capabilities::Navigator;
use crate::core::config::UiConfig;
use crate::core::error::{ConfigError, StorageError};
use crate::features::preferences::record::{
    PreferenceDefaults, PreferenceRecord, with_preferences,
};

/// Durable string storage (last writer wins).
pub trait PreferenceStorage {
    /// Stored value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the backend refuses the read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the backend refuses the write.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Page kind a URL belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageIdentity {
    kind: String,
}

impl PageIdentity {
    /// Page kind (route segment).
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

/// What the store did on page load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadDecision {
    /// The page is not a preference page.
    Inactive,
    /// Stored preferences differ from defaults; navigated to this URL.
    Redirect(Url),
    /// The URL carried preferences; they were stored.
    Persisted(PreferenceRecord),
    /// Nothing to do.
    Keep,
}

/// Preference settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreferenceSettings {
    /// Storage key prefix.
    pub storage_prefix: String,
    /// Page kinds that persist preferences.
    pub page_kinds: Vec<String>,
    /// Server default per key.
    pub defaults: PreferenceDefaults,
}

impl TryFrom<&UiConfig> for PreferenceSettings {
    type Error = ConfigError;

    fn try_from(config: &UiConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            storage_prefix: config.storage_prefix.clone(),
            page_kinds: config.page_kinds.clone(),
            defaults: config.preference_defaults()?,
        })
    }
}

/// Preference store.
pub struct PreferenceStore {
    storage: Rc<dyn PreferenceStorage>,
    navigator: Rc<dyn Navigator>,
    settings: PreferenceSettings,
}

impl PreferenceStore {
    /// Build a store.
    #[must_use]
    pub fn new(
        storage: Rc<dyn PreferenceStorage>,
        navigator: Rc<dyn Navigator>,
        settings: PreferenceSettings,
    ) -> Self {
        Self {
            storage,
            navigator,
            settings,
        }
    }

    /// Page kind of `url`, when it is a preference page.
    #[must_use]
    pub fn page_for(&self, url: &Url) -> Option<PageIdentity> {
        let segment = url
            .path_segments()?
            .rfind(|segment| !segment.is_empty())?;
        self.settings
            .page_kinds
            .iter()
            .any(|kind| kind == segment)
            .then(|| PageIdentity {
                kind: segment.to_string(),
            })
    }

    /// Storage key for `page`.
    #[must_use]
    pub fn storage_key(&self, page: &PageIdentity) -> String {
        format!("{}{}", self.settings.storage_prefix, page.kind)
    }

    /// Page-load hook.
    pub fn on_load(&self, url: &Url) -> LoadDecision {
        let Some(page) = self.page_for(url) else {
            return LoadDecision::Inactive;
        };
        let present = PreferenceRecord::from_query(url);
        if !present.is_empty() {
            self.persist(&page, &present);
            return LoadDecision::Persisted(present);
        }

        let stored = self.load(&page);
        let changed: Vec<_> = stored
            .iter()
            .filter(|(key, value)| {
                !value.is_empty() && !self.settings.defaults.is_default(*key, value)
            })
            .collect();
        if changed.is_empty() {
            return LoadDecision::Keep;
        }

        let target = with_preferences(url, changed);
        debug!(page = page.kind(), target = %target, "restoring stored preferences");
        self.navigator.replace(target.as_str());
        LoadDecision::Redirect(target)
    }

    /// History-push hook: persist the enumerated keys of the new URL.
    /// Returns whether anything was written.
    pub fn on_history_push(&self, url: &Url) -> bool {
        let Some(page) = self.page_for(url) else {
            return false;
        };
        let present = PreferenceRecord::from_query(url);
        if present.is_empty() {
            return false;
        }
        self.persist(&page, &present)
    }

    /// Rewritten target for a link click, when the link qualifies.
    ///
    /// A link qualifies when it resolves to the same origin as `current`, lands
    /// on a preference page, carries no query string, and a stored record exists.
    #[must_use]
    pub fn rewrite_link(&self, current: &Url, href: &str) -> Option<Url> {
        let target = current.join(href).ok()?;
        if target.origin() != current.origin() || target.query().is_some() {
            return None;
        }
        let page = self.page_for(&target)?;
        let stored = self.load(&page);
        let entries: Vec<_> = stored.iter().filter(|(_, value)| !value.is_empty()).collect();
        if entries.is_empty() {
            return None;
        }
        Some(with_preferences(&target, entries))
    }

    /// Follow a qualifying link to its rewritten target. Returns `true` when the
    /// navigation was taken over and the default action must be prevented.
    pub fn follow_link(&self, current: &Url, href: &str) -> bool {
        match self.rewrite_link(current, href) {
            Some(target) => {
                debug!(target = %target, "link rewritten with stored preferences");
                self.navigator.assign(target.as_str());
                true
            }
            None => false,
        }
    }

    /// Stored record for `page`; empty when missing or unreadable.
    #[must_use]
    pub fn load(&self, page: &PageIdentity) -> PreferenceRecord {
        let key = self.storage_key(page);
        let raw = match self.storage.read(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return PreferenceRecord::new(),
            Err(err) => {
                log_storage_error(&key, &err);
                return PreferenceRecord::new();
            }
        };
        PreferenceRecord::from_json(&raw).unwrap_or_else(|err| {
            log_storage_error(&key, &err);
            PreferenceRecord::new()
        })
    }

    fn persist(&self, page: &PageIdentity, record: &PreferenceRecord) -> bool {
        let key = self.storage_key(page);
        let written = record
            .to_json()
            .and_then(|encoded| self.storage.write(&key, &encoded));
        match written {
            Ok(()) => {
                debug!(key = %key, entries = record.len(), "preferences stored");
                true
            }
            Err(err) => {
                log_storage_error(&key, &err);
                false
            }
        }
    }
}

fn log_storage_error(key: &str, err: &StorageError) {
    let detail = match err {
        StorageError::Unavailable { detail }
        | StorageError::Parse { detail }
        | StorageError::Encode { detail } => detail,
    };
    warn!(key, error = %err, detail = %detail, "preference storage failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::logging::subscriber;
    use tracing::level_filters::LevelFilter;
    use crate::core::testing::{MemoryStorage, RecordingLines, RecordingNavigator};
    use crate::features::preferences::PreferenceKey;

    struct Harness {
        store: PreferenceStore,
        storage: Rc<MemoryStorage>,
        navigator: Rc<RecordingNavigator>,
    }

    fn harness() -> Harness {
        let storage = Rc::new(MemoryStorage::default());
        let navigator = Rc::new(RecordingNavigator::default());
        let settings = PreferenceSettings::try_from(&UiConfig::default()).unwrap();
        Harness {
            store: PreferenceStore::new(storage.clone(), navigator.clone(), settings),
            storage,
            navigator,
        }
    }

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn non_default_stored_value_redirects_once() {
        let h = harness();
        h.storage
            .insert("media_dashboard_prefs_radarr", r#"{"sort_by":"year"}"#);
        let decision = h.store.on_load(&url("https://host/radarr"));
        let LoadDecision::Redirect(target) = decision else {
            panic!("expected redirect");
        };
        assert_eq!(target.query(), Some("sort_by=year"));
        assert_eq!(h.navigator.replaced(), vec![target.to_string()]);
        assert!(h.navigator.assigned().is_empty());
    }

    #[test]
    fn stored_defaults_do_not_navigate() {
        let h = harness();
        h.storage.insert(
            "media_dashboard_prefs_radarr",
            r#"{"sort_by":"title","view":"table"}"#,
        );
        assert_eq!(h.store.on_load(&url("https://host/radarr")), LoadDecision::Keep);
        assert!(h.navigator.replaced().is_empty());
    }

    #[test]
    fn url_params_are_persisted_on_load() {
        let h = harness();
        h.storage
            .insert("media_dashboard_prefs_sonarr", r#"{"sort_by":"year"}"#);
        let decision = h
            .store
            .on_load(&url("https://host/sonarr?per_page=50&page=2"));
        assert!(matches!(decision, LoadDecision::Persisted(_)));
        assert!(h.navigator.replaced().is_empty());
        let stored = PreferenceRecord::from_json(
            &h.storage.get("media_dashboard_prefs_sonarr").unwrap(),
        )
        .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored.get(PreferenceKey::PerPage), Some("50"));
    }

    #[test]
    fn other_pages_are_ignored() {
        let h = harness();
        assert_eq!(
            h.store.on_load(&url("https://host/settings?sort_by=year")),
            LoadDecision::Inactive
        );
        assert!(h.storage.is_empty());
        assert!(!h.store.on_history_push(&url("https://host/?view=poster")));
    }

    #[test]
    fn page_identity_uses_last_segment() {
        let h = harness();
        let page = h.store.page_for(&url("https://host/media/radarr/")).unwrap();
        assert_eq!(page.kind(), "radarr");
        assert_eq!(h.store.storage_key(&page), "media_dashboard_prefs_radarr");
        assert!(h.store.page_for(&url("https://host/radarr/42")).is_none());
    }

    #[test]
    fn history_push_overwrites_record() {
        let h = harness();
        h.storage
            .insert("media_dashboard_prefs_radarr", r#"{"sort_by":"year"}"#);
        assert!(
            h.store
                .on_history_push(&url("https://host/radarr?score_filter=delete"))
        );
        let stored = PreferenceRecord::from_json(
            &h.storage.get("media_dashboard_prefs_radarr").unwrap(),
        )
        .unwrap();
        assert_eq!(stored.get(PreferenceKey::SortBy), None);
        assert_eq!(stored.get(PreferenceKey::ScoreFilter), Some("delete"));
        assert!(!h.store.on_history_push(&url("https://host/radarr")));
    }

    #[test]
    fn unreadable_storage_is_treated_as_empty() {
        let h = harness();
        h.storage.insert("media_dashboard_prefs_radarr", "{broken");
        assert_eq!(h.store.on_load(&url("https://host/radarr")), LoadDecision::Keep);

        h.storage.fail_reads(true);
        assert_eq!(h.store.on_load(&url("https://host/radarr")), LoadDecision::Keep);
        assert!(h.navigator.replaced().is_empty());
    }

    #[test]
    fn corrupt_record_is_logged_and_ignored() {
        let h = harness();
        h.storage.insert("media_dashboard_prefs_radarr", "{broken");
        let lines = RecordingLines::default();
        let page = h.store.page_for(&url("https://host/radarr")).unwrap();

        let record = tracing::subscriber::with_default(
            subscriber(lines.clone(), LevelFilter::WARN),
            || h.store.load(&page),
        );
        assert!(record.is_empty());
        let logged = lines.lines();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].0, tracing::Level::WARN);
        assert!(logged[0].1.contains("preference storage failed"));
        assert!(logged[0].1.contains("media_dashboard_prefs_radarr"));
    }

    #[test]
    fn bare_links_are_rewritten_and_followed() {
        let h = harness();
        h.storage.insert(
            "media_dashboard_prefs_sonarr",
            r#"{"view":"poster","sort_by":"title"}"#,
        );
        let current = url("https://host/radarr?sort_by=year");

        assert!(h.store.follow_link(&current, "/sonarr"));
        let assigned = h.navigator.assigned();
        assert_eq!(assigned.len(), 1);
        let target = url(&assigned[0]);
        assert_eq!(target.path(), "/sonarr");
        let record = PreferenceRecord::from_query(&target);
        assert_eq!(record.get(PreferenceKey::View), Some("poster"));
        assert_eq!(record.get(PreferenceKey::SortBy), Some("title"));
    }

    #[test]
    fn links_with_query_or_without_record_are_untouched() {
        let h = harness();
        h.storage
            .insert("media_dashboard_prefs_sonarr", r#"{"view":"poster"}"#);
        let current = url("https://host/radarr");

        assert!(h.store.rewrite_link(&current, "/sonarr?view=table").is_none());
        assert!(h.store.rewrite_link(&current, "/radarr").is_none());
        assert!(h.store.rewrite_link(&current, "https://elsewhere/sonarr").is_none());
        assert!(h.store.rewrite_link(&current, "/logs").is_none());
        assert!(!h.store.follow_link(&current, "/sonarr?view=table"));
        assert!(h.navigator.assigned().is_empty());
    }
}
