//! Core types used throughout the project.

use std::collections::HashMap;

use serde::{
    Deserialize,
    Serialize,
};

/// A single leaf entry of a translation document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Translation {
    /// Flat key (e.g. `PAGE.LOADING`)
    #[serde(rename = "id")]
    pub key: String,
    /// Translated text. Placeholder syntax inside is left untouched.
    pub template: String,
}

impl Translation {
    /// Creates a translation for `key`.
    #[must_use]
    pub fn new(key: impl Into<String>, template: impl Into<String>) -> Self {
        Self { key: key.into(), template: template.into() }
    }
}

/// Flat key -> translation map of one language.
pub type Language = HashMap<String, Translation>;

/// Read-only view of a loaded language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageDescriptor {
    /// Language code (e.g. `en`)
    pub id: String,
    /// Translations sorted by key
    pub translations: Vec<Translation>,
}

impl LanguageDescriptor {
    /// Builds a descriptor from a language map, sorting entries by key.
    #[must_use]
    pub fn from_language(id: impl Into<String>, language: &Language) -> Self {
        let mut translations: Vec<Translation> = language.values().cloned().collect();
        translations.sort_by(|a, b| a.key.cmp(&b.key));
        Self { id: id.into(), translations }
    }

    /// Keys of all translations, in order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.translations.iter().map(|t| t.key.as_str()).collect()
    }
}
