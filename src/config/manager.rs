//! 翻訳ディレクトリの設定ファイル読み込み

use std::io::ErrorKind;
use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    StoreSettings,
};

/// 翻訳ディレクトリ直下の設定ファイル名
///
/// ドット始まりなので、言語ファイルの探索には含まれない
pub const CONFIG_FILE_NAME: &str = ".translation-store.json";

/// 1 つの翻訳ディレクトリに対応する設定ファイルを扱う
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// 設定ファイルのパス
    settings_path: PathBuf,
}

impl ConfigManager {
    /// `directory` 内の設定ファイルを対象にする
    #[must_use]
    pub fn for_directory(directory: &Path) -> Self {
        Self { settings_path: directory.join(CONFIG_FILE_NAME) }
    }

    /// 設定を読み込み、検証して返す
    ///
    /// 設定ファイルが無い場合はデフォルト設定を返す。
    /// ファイル内で省略された項目もデフォルト値で補われる。
    ///
    /// # Errors
    /// - [`ConfigError::IoError`]: ファイルの読み込みに失敗
    /// - [`ConfigError::ParseError`]: JSON として不正
    /// - [`ConfigError::ValidationErrors`]: 検証エラー
    pub async fn load(&self) -> Result<StoreSettings, ConfigError> {
        let settings = match tokio::fs::read(&self.settings_path).await {
            Ok(bytes) => {
                let settings: StoreSettings = serde_json::from_slice(&bytes)?;
                tracing::debug!(path = %self.settings_path.display(), ?settings, "Loaded settings file");
                settings
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.settings_path.display(), "No settings file, using defaults");
                StoreSettings::default()
            }
            Err(e) => return Err(e.into()),
        };

        settings.validate().map_err(ConfigError::ValidationErrors)?;
        Ok(settings)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use tempfile::TempDir;

    use super::*;

    fn directory_with_settings(content: &str) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), content).unwrap();
        temp_dir
    }

    #[tokio::test]
    async fn load_reads_settings_file() {
        let temp_dir =
            directory_with_settings(r#"{"keySeparator": "/", "baseLanguage": "en", "orphanRemoval": true}"#);

        let settings = ConfigManager::for_directory(temp_dir.path()).load().await.unwrap();

        assert_eq!(settings.key_separator, "/");
        assert_eq!(settings.base_language.as_deref(), Some("en"));
        assert!(settings.orphan_removal);
        assert!(settings.indent);
    }

    #[tokio::test]
    async fn load_without_settings_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();

        let settings = ConfigManager::for_directory(temp_dir.path()).load().await.unwrap();

        assert_eq!(settings.key_separator, ".");
        assert_eq!(settings.translation_files.file_pattern, "**/*.json");
        assert!(settings.indent);
        assert!(settings.base_language.is_none());
    }

    #[tokio::test]
    async fn load_rejects_malformed_json() {
        let temp_dir = directory_with_settings("invalid json");

        let result = ConfigManager::for_directory(temp_dir.path()).load().await;

        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[tokio::test]
    async fn load_rejects_invalid_settings() {
        let temp_dir = directory_with_settings(r#"{"keySeparator": ""}"#);

        let result = ConfigManager::for_directory(temp_dir.path()).load().await;

        assert_that!(
            result.map_err(|e| e.to_string()),
            err(contains_substring("keySeparator"))
        );
    }

    #[tokio::test]
    async fn load_surfaces_unreadable_settings() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join(CONFIG_FILE_NAME)).unwrap();

        let result = ConfigManager::for_directory(temp_dir.path()).load().await;

        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
