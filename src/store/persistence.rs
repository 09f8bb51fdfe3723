//! 言語ファイルの読み込みと保存

use std::path::Path;

use serde_json::Value;

use super::discovery::{
    LanguageFile,
    find_language_files,
};
use super::{
    RawDocument,
    StoreError,
    TranslationStore,
};
use crate::keys;

impl TranslationStore {
    /// ディレクトリ内のすべての言語ファイルを読み込む
    ///
    /// ファイルは並行して読み込み、パス順に登録する。
    /// 読めない、または不正なファイルがあるとそこで中断するが、それまでに登録した言語は残る。
    /// 同じ言語コードが複数ある場合は後のファイルを採用する。
    ///
    /// # Errors
    /// - [`StoreError::Io`]: ファイルを読めない
    /// - [`StoreError::Decode`] / [`StoreError::NotAnObject`]: ファイルの内容が不正
    pub async fn load(&self) -> Result<(), StoreError> {
        let files = find_language_files(&self.directory, &self.settings)?;
        let contents =
            futures::future::join_all(files.iter().map(|file| tokio::fs::read(&file.path))).await;

        for (file, content) in files.into_iter().zip(contents) {
            let bytes = content.map_err(|e| StoreError::io(&file.path, e))?;
            self.register_document(file, bytes).await?;
        }

        let language_count = self.languages.lock().await.len();
        tracing::info!(directory = %self.directory.display(), languages = language_count, "Loaded translations");
        Ok(())
    }

    /// 1 ファイルをデコードし、言語コードで登録する
    async fn register_document(&self, file: LanguageFile, bytes: Vec<u8>) -> Result<(), StoreError> {
        let json: Value = serde_json::from_slice(&bytes)
            .map_err(|source| StoreError::Decode { path: file.path.clone(), source })?;
        if !json.is_object() {
            return Err(StoreError::NotAnObject { path: file.path });
        }
        let language = keys::flatten(&json, &self.settings.key_separator, None);
        let key_count = language.len();

        let replaced = self.languages.lock().await.insert(file.code.clone(), language);
        if replaced.is_some() {
            tracing::warn!(language = %file.code, path = %file.path.display(), "Language loaded twice, keeping the later document");
        }

        tracing::debug!(language = %file.code, path = %file.path.display(), keys = key_count, "Loaded language");
        self.raw_documents
            .lock()
            .await
            .insert(file.code, RawDocument { path: file.path, bytes: Some(bytes) });
        Ok(())
    }

    /// 読み込み済みの全言語をそれぞれのファイルに書き戻す
    ///
    /// 言語コード順に 1 つずつ書き込む。失敗した時点で中断し、それまでに書いたファイルはそのまま残る。
    ///
    /// # Errors
    /// - [`StoreError::KeyConflict`]: キーをネストした JSON に戻せない
    /// - [`StoreError::Io`]: ファイルを書き込めない
    pub async fn save(&self, indent: bool) -> Result<(), StoreError> {
        for code in self.language_codes().await {
            let Some(bytes) = self.encode_language(&code, indent).await? else {
                continue;
            };

            let path = {
                let mut raw_documents = self.raw_documents.lock().await;
                let raw = raw_documents.entry(code.clone()).or_insert_with(|| RawDocument {
                    path: self.default_document_path(&code),
                    bytes: None,
                });
                raw.bytes = Some(bytes.clone());
                raw.path.clone()
            };

            write_document(&path, &bytes).await?;
            tracing::debug!(language = %code, path = %path.display(), "Saved language");
        }

        tracing::info!(directory = %self.directory.display(), "Saved translations");
        Ok(())
    }

    /// `code` の現在の状態をシリアライズする。途中で削除されていれば `None`
    async fn encode_language(&self, code: &str, indent: bool) -> Result<Option<Vec<u8>>, StoreError> {
        let Some(language) = self.snapshot(code).await else {
            return Ok(None);
        };

        let document = keys::unflatten(&language, &self.settings.key_separator)
            .map_err(|source| StoreError::KeyConflict { language: code.to_string(), source })?;
        let encoded = if indent {
            serde_json::to_vec_pretty(&document)
        } else {
            serde_json::to_vec(&document)
        };

        encoded
            .map(Some)
            .map_err(|source| StoreError::Encode { language: code.to_string(), source })
    }

    /// `lang` をストアから外し、そのファイルを削除する
    ///
    /// 追加したがまだ保存していない言語のように、ファイルが存在しなくてもエラーにしない
    ///
    /// # Errors
    /// - [`StoreError::LanguageNotFound`]: `lang` が読み込まれていない
    /// - [`StoreError::Io`]: ファイルを削除できない
    pub async fn remove_language(&self, lang: &str) -> Result<(), StoreError> {
        if self.languages.lock().await.remove(lang).is_none() {
            return Err(StoreError::LanguageNotFound(lang.to_string()));
        }

        let raw = self.raw_documents.lock().await.remove(lang);
        let path = raw.map_or_else(|| self.default_document_path(lang), |raw| raw.path);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(language = %lang, path = %path.display(), "Removed language");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(language = %lang, path = %path.display(), "Removed language without a document");
                Ok(())
            }
            Err(e) => Err(StoreError::io(path, e)),
        }
    }
}

/// `path` に `bytes` を書き込む。親ディレクトリが無ければ作成する
async fn write_document(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| StoreError::io(parent, e))?;
    }
    tokio::fs::write(path, bytes).await.map_err(|e| StoreError::io(path, e))
}
