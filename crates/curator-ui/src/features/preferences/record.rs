//! Preference keys and records.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};
use url::Url;

use crate::core::error::StorageError;

/// View-state parameters that persist across navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PreferenceKey {
    /// Table or poster layout.
    View,
    /// Sort column.
    SortBy,
    /// Sort direction.
    SortOrder,
    /// Page size.
    PerPage,
    /// Score filter.
    ScoreFilter,
}

impl PreferenceKey {
    /// Every key, in query order.
    pub const ALL: [Self; 5] = [
        Self::View,
        Self::SortBy,
        Self::SortOrder,
        Self::PerPage,
        Self::ScoreFilter,
    ];

    /// Query parameter name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::SortBy => "sort_by",
            Self::SortOrder => "sort_order",
            Self::PerPage => "per_page",
            Self::ScoreFilter => "score_filter",
        }
    }

    /// Parse a query parameter name.
    #[must_use]
    pub fn from_param(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-side default for each key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreferenceDefaults {
    values: BTreeMap<PreferenceKey, String>,
}

impl PreferenceDefaults {
    /// Set the default for `key`.
    pub fn set(&mut self, key: PreferenceKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    /// Default for `key`, when known.
    #[must_use]
    pub fn get(&self, key: PreferenceKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    /// Whether `value` equals the default for `key`.
    #[must_use]
    pub fn is_default(&self, key: PreferenceKey, value: &str) -> bool {
        self.get(key) == Some(value)
    }
}

/// Flat key/value record restricted to [`PreferenceKey`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreferenceRecord {
    values: BTreeMap<PreferenceKey, String>,
}

impl PreferenceRecord {
    /// Empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enumerated keys present in the query of `url`. The first occurrence of a
    /// repeated key wins; a present key with an empty value is still present.
    #[must_use]
    pub fn from_query(url: &Url) -> Self {
        let mut values = BTreeMap::new();
        for (name, value) in url.query_pairs() {
            if let Some(key) = PreferenceKey::from_param(&name) {
                values.entry(key).or_insert_with(|| value.into_owned());
            }
        }
        Self { values }
    }

    /// Decode a stored record. Unknown keys, non-string values, and empty
    /// strings are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Parse`] when `raw` is not a JSON object.
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        let object: Map<String, Value> =
            serde_json::from_str(raw).map_err(|err| StorageError::Parse {
                detail: err.to_string(),
            })?;
        let values = object
            .iter()
            .filter_map(|(name, value)| {
                let key = PreferenceKey::from_param(name)?;
                let text = value.as_str().filter(|text| !text.is_empty())?;
                Some((key, text.to_string()))
            })
            .collect();
        Ok(Self { values })
    }

    /// Encode for storage.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Encode`] if serialization fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        let object: Map<String, Value> = self
            .values
            .iter()
            .map(|(key, value)| (key.as_str().to_string(), Value::String(value.clone())))
            .collect();
        serde_json::to_string(&object).map_err(|err| StorageError::Encode {
            detail: err.to_string(),
        })
    }

    /// Set `key`.
    pub fn set(&mut self, key: PreferenceKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    /// Value for `key`.
    #[must_use]
    pub fn get(&self, key: PreferenceKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (PreferenceKey, &str)> {
        self.values.iter().map(|(key, value)| (*key, value.as_str()))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Copy of `url` with each entry set as a query parameter, replacing any
/// existing occurrences of the same name.
#[must_use]
pub fn with_preferences<'a>(
    url: &Url,
    entries: impl IntoIterator<Item = (PreferenceKey, &'a str)>,
) -> Url {
    let entries: Vec<(PreferenceKey, &str)> = entries.into_iter().collect();
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| !entries.iter().any(|(key, _)| key.as_str() == *name))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    let mut rewritten = url.clone();
    rewritten.set_query(None);
    if !kept.is_empty() || !entries.is_empty() {
        let mut pairs = rewritten.query_pairs_mut();
        for (name, value) in &kept {
            pairs.append_pair(name, value);
        }
        for (key, value) in &entries {
            pairs.append_pair(key.as_str(), value);
        }
    }
    rewritten
}
