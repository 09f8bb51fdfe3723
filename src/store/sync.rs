//! Reconciling languages against a base language.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{
    StoreError,
    TranslationStore,
};
use crate::types::Language;

/// Changes applied to one language by a sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncChanges {
    /// Keys copied from the base language
    pub added: usize,
    /// Orphan keys deleted
    pub removed: usize,
}

impl SyncChanges {
    /// Whether the sync left the language untouched.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// Outcome of [`TranslationStore::sync`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Base language code
    pub base: String,
    /// Changes per synchronized language
    pub languages: BTreeMap<String, SyncChanges>,
}

impl TranslationStore {
    /// Reconcile every other language with `base`.
    ///
    /// Keys missing from a language are copied from the base verbatim, so
    /// they carry the base text until translated. Keys both languages share
    /// keep their own values. With `orphan_removal`, keys the base does not
    /// have are deleted, leaving every language with exactly the base's key
    /// set. Running it twice gives the same state as running it once.
    ///
    /// The base is snapshotted once; each other language is then updated
    /// under its own short critical section.
    ///
    /// # Errors
    /// Returns [`StoreError::LanguageNotFound`] if `base` is not loaded.
    pub async fn sync(&self, base: &str, orphan_removal: bool) -> Result<SyncReport, StoreError> {
        let base_language =
            self.snapshot(base).await.ok_or_else(|| StoreError::LanguageNotFound(base.to_string()))?;

        let mut report = SyncReport { base: base.to_string(), languages: BTreeMap::new() };
        for code in self.language_codes().await {
            if code == base {
                continue;
            }

            let mut languages = self.languages.lock().await;
            let Some(language) = languages.get_mut(&code) else {
                continue;
            };
            let changes = reconcile(language, &base_language, orphan_removal);
            drop(languages);

            if !changes.is_empty() {
                tracing::debug!(language = %code, added = changes.added, removed = changes.removed, "Synchronized language");
            }
            report.languages.insert(code, changes);
        }

        tracing::info!(base = %base, orphan_removal, languages = report.languages.len(), "Synchronized translations");
        Ok(report)
    }
}

/// Bring `language` in line with `base`.
fn reconcile(language: &mut Language, base: &Language, orphan_removal: bool) -> SyncChanges {
    let mut changes = SyncChanges::default();

    if orphan_removal {
        let before = language.len();
        language.retain(|key, _| base.contains_key(key));
        changes.removed = before - language.len();
    }

    for (key, translation) in base {
        if !language.contains_key(key) {
            language.insert(key.clone(), translation.clone());
            changes.added += 1;
        }
    }

    changes
}
