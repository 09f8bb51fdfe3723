//! 翻訳ストア
//!
//! 読み込んだ言語をフラットなキーマップとして保持する。
//! 言語ファイルのパスと、最後に読み書きした内容もあわせて保持する。
//!
//! # ロック
//!
//! 共有状態は `languages` と `raw_documents` の 2 つのロックで守られる。
//! どちらも 1 回のマップ操作の間だけ保持し、ファイル I/O をまたいだり
//! 2 つを同時に保持したりしない。
//! そのため `sync` や `save` のような複数キーにまたがる操作はアトミックではなく、
//! 途中の状態が他の呼び出しから見えることがある。

mod discovery;
mod error;
mod persistence;
mod sync;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

pub use error::StoreError;
pub use sync::{
    SyncChanges,
    SyncReport,
};

use crate::config::StoreSettings;
use crate::keys;
use crate::types::{
    Language,
    LanguageDescriptor,
    Translation,
};

/// 言語に対応する翻訳ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawDocument {
    /// 読み込み元かつ書き込み先のパス
    path: PathBuf,
    /// 最後に読み込んだ、またはシリアライズした内容（ファイルが未作成なら `None`）
    bytes: Option<Vec<u8>>,
}

/// 共有される翻訳ストア
///
/// クローンは安価で、すべてのクローンが同じ言語データを操作する
#[derive(Clone)]
pub struct TranslationStore {
    /// 言語ファイルを置くディレクトリ
    directory: PathBuf,
    /// 適用中の設定
    settings: Arc<StoreSettings>,
    /// 言語コード -> フラットなキーマップ
    languages: Arc<Mutex<HashMap<String, Language>>>,
    /// 言語コード -> 翻訳ファイル
    raw_documents: Arc<Mutex<HashMap<String, RawDocument>>>,
}

impl std::fmt::Debug for TranslationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationStore")
            .field("directory", &self.directory)
            .field("settings", &self.settings)
            .field("languages", &"<HashMap<String, Language>>")
            .field("raw_documents", &"<HashMap<String, RawDocument>>")
            .finish()
    }
}

impl TranslationStore {
    /// 何も読み込まずに `directory` 用の空のストアを作成する
    ///
    /// # Errors
    /// `directory` が存在しない、またはディレクトリでない場合は [`StoreError::NotADirectory`]
    pub fn new(directory: impl Into<PathBuf>, settings: StoreSettings) -> Result<Self, StoreError> {
        let directory = directory.into();
        if !directory.is_dir() {
            return Err(StoreError::NotADirectory(directory));
        }

        Ok(Self {
            directory,
            settings: Arc::new(settings),
            languages: Arc::new(Mutex::new(HashMap::new())),
            raw_documents: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// `directory` 用のストアを作成し、すべての言語ファイルを読み込む
    ///
    /// # Errors
    /// [`Self::new`] と [`Self::load`] のエラーをそのまま返す
    pub async fn open(
        directory: impl Into<PathBuf>,
        settings: StoreSettings,
    ) -> Result<Self, StoreError> {
        let store = Self::new(directory, settings)?;
        store.load().await?;
        Ok(store)
    }

    /// ストア作成時の設定
    #[must_use]
    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// `lang` における `key` の翻訳テキストを取得する
    ///
    /// 言語またはキーが無い場合は `key` 自体を返す
    pub async fn get(&self, key: &str, lang: &str) -> String {
        let languages = self.languages.lock().await;
        languages
            .get(lang)
            .and_then(|language| language.get(key))
            .map_or_else(|| key.to_string(), |translation| translation.template.clone())
    }

    /// `lang` の `key` を追加または上書きする
    ///
    /// # Errors
    /// - [`StoreError::LanguageNotFound`]: `lang` が読み込まれていない
    /// - [`StoreError::InvalidKey`]: `key` が空、または空のセグメントを含む
    pub async fn set(&self, key: &str, value: &str, lang: &str) -> Result<(), StoreError> {
        let mut languages = self.languages.lock().await;
        let language =
            languages.get_mut(lang).ok_or_else(|| StoreError::LanguageNotFound(lang.to_string()))?;
        if !keys::is_valid_key(key, &self.settings.key_separator) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        language.insert(key.to_string(), Translation::new(key, value));
        drop(languages);

        tracing::debug!(language = %lang, key = %key, "Set translation");
        Ok(())
    }

    /// `lang` から `key` を削除する。存在しないキーは無視する
    ///
    /// # Errors
    /// `lang` が読み込まれていない場合は [`StoreError::LanguageNotFound`]
    pub async fn remove(&self, key: &str, lang: &str) -> Result<(), StoreError> {
        let mut languages = self.languages.lock().await;
        let language =
            languages.get_mut(lang).ok_or_else(|| StoreError::LanguageNotFound(lang.to_string()))?;
        let removed = language.remove(key).is_some();
        drop(languages);

        tracing::debug!(language = %lang, key = %key, removed, "Removed translation");
        Ok(())
    }

    /// `key` を持つすべての言語について、言語コード -> 翻訳テキストを返す
    pub async fn get_all(&self, key: &str) -> HashMap<String, String> {
        let languages = self.languages.lock().await;
        languages
            .iter()
            .filter_map(|(code, language)| {
                language.get(key).map(|translation| (code.clone(), translation.template.clone()))
            })
            .collect()
    }

    /// `base` の独立したコピーとして `lang` を登録する
    ///
    /// 新しい言語は次回の保存で `<directory>/<lang>.json` に書き込まれる
    ///
    /// # Errors
    /// - [`StoreError::InvalidLanguageCode`]: `lang` をファイル名に使えない
    /// - [`StoreError::LanguageNotFound`]: `base` が読み込まれていない
    /// - [`StoreError::LanguageAlreadyExists`]: `lang` が既に読み込まれている
    pub async fn add_language(
        &self,
        lang: &str,
        base: &str,
    ) -> Result<LanguageDescriptor, StoreError> {
        if !is_valid_language_code(lang) {
            return Err(StoreError::InvalidLanguageCode(lang.to_string()));
        }

        let mut languages = self.languages.lock().await;
        let copy = languages
            .get(base)
            .cloned()
            .ok_or_else(|| StoreError::LanguageNotFound(base.to_string()))?;
        if languages.contains_key(lang) {
            return Err(StoreError::LanguageAlreadyExists(lang.to_string()));
        }
        let descriptor = LanguageDescriptor::from_language(lang, &copy);
        languages.insert(lang.to_string(), copy);
        drop(languages);

        let path = self.default_document_path(lang);
        self.raw_documents
            .lock()
            .await
            .insert(lang.to_string(), RawDocument { path, bytes: None });

        tracing::info!(language = %lang, base = %base, keys = descriptor.translations.len(), "Added language");
        Ok(descriptor)
    }

    /// 1 言語分の [`LanguageDescriptor`] を返す
    ///
    /// # Errors
    /// `lang` が読み込まれていない場合は [`StoreError::LanguageNotFound`]
    pub async fn language(&self, lang: &str) -> Result<LanguageDescriptor, StoreError> {
        let languages = self.languages.lock().await;
        languages
            .get(lang)
            .map(|language| LanguageDescriptor::from_language(lang, language))
            .ok_or_else(|| StoreError::LanguageNotFound(lang.to_string()))
    }

    /// 読み込み済みの全言語を言語コード順で返す
    pub async fn languages(&self) -> Vec<LanguageDescriptor> {
        let languages = self.languages.lock().await;
        let mut descriptors: Vec<LanguageDescriptor> = languages
            .iter()
            .map(|(code, language)| LanguageDescriptor::from_language(code, language))
            .collect();
        drop(languages);
        descriptors.sort_by(|a, b| a.id.cmp(&b.id));
        descriptors
    }

    /// 読み込み済みの言語コード（ソート済み）
    pub async fn language_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.languages.lock().await.keys().cloned().collect();
        codes.sort();
        codes
    }

    /// `lang` のファイル内容のキャッシュ（読み込みまたは保存済みの場合のみ）
    pub async fn raw(&self, lang: &str) -> Option<Vec<u8>> {
        self.raw_documents.lock().await.get(lang).and_then(|raw| raw.bytes.clone())
    }

    /// `lang` のフラットなキーマップのコピー
    pub(crate) async fn snapshot(&self, lang: &str) -> Option<Language> {
        self.languages.lock().await.get(lang).cloned()
    }

    /// ディスクから読み込まれていない言語のファイルパス
    fn default_document_path(&self, lang: &str) -> PathBuf {
        self.directory.join(format!("{lang}.json"))
    }
}

/// `code` をファイル名として使えるか
fn is_valid_language_code(code: &str) -> bool {
    !code.is_empty() && code != "." && code != ".." && !code.contains(['/', '\\'])
}
