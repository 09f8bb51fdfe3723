//! コマンドラインインターフェース
//!
//! 1 回の実行で翻訳ディレクトリを読み込み、ストア操作を 1 つ行い、
//! 変更系の操作の後は保存して、結果を JSON で返す

use std::path::PathBuf;

use clap::{
    Parser,
    Subcommand,
};
use serde_json::{
    Value,
    json,
};
use thiserror::Error;

use crate::config::{
    ConfigError,
    ConfigManager,
    StoreSettings,
};
use crate::store::{
    StoreError,
    TranslationStore,
};

/// 言語が見つからない場合の終了コード
pub const EXIT_NOT_FOUND: u8 = 2;
/// それ以外の失敗時の終了コード
pub const EXIT_FAILURE: u8 = 1;

/// Inspect, edit and synchronize JSON translation files
#[derive(Debug, Parser)]
#[command(name = "translation-store", version)]
pub struct Cli {
    /// Directory holding the language documents
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Write documents without indentation
    #[arg(long)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Store operations
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print the text of a key (the key itself if missing)
    Get { key: String, lang: String },
    /// Print the text of a key in every language
    GetAll { key: String },
    /// Set the text of a key
    Set { key: String, value: String, lang: String },
    /// Delete a key from a language
    Remove { key: String, lang: String },
    /// List all languages with their translations
    Languages,
    /// Show one language with its translations
    Language { code: String },
    /// Create a language as a copy of another
    AddLanguage { code: String, base: String },
    /// Delete a language and its document
    RemoveLanguage { code: String },
    /// Copy missing keys from the base language into every other language
    Sync {
        /// Base language (defaults to `baseLanguage` from the settings)
        base: Option<String>,
        /// Also delete keys the base language does not have
        #[arg(long)]
        remove_orphans: bool,
    },
}

impl Command {
    /// ストアを変更し、実行後に保存が必要なコマンドか
    #[must_use]
    pub const fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::Set { .. } | Self::Remove { .. } | Self::AddLanguage { .. } | Self::Sync { .. }
        )
    }
}

/// CLI 実行時のエラー
#[derive(Error, Debug)]
pub enum CliError {
    /// 設定ファイルのエラー
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// ストア操作のエラー
    #[error(transparent)]
    Store(#[from] StoreError),

    /// `sync` の基準言語が引数にも設定にも無い
    #[error("No base language given and 'baseLanguage' is not set")]
    MissingBaseLanguage,

    /// 出力の JSON 変換に失敗
    #[error("Failed to format output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// エラーに対応するプロセスの終了コード
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Store(error) if error.is_not_found() => EXIT_NOT_FOUND,
            _ => EXIT_FAILURE,
        }
    }
}

/// `cli.dir` から設定と言語を読み込み、`cli.command` を実行する
///
/// # Errors
/// 設定、ストア操作、出力のいずれかで最初に発生したエラー
pub async fn run(cli: Cli) -> Result<Value, CliError> {
    let settings = ConfigManager::for_directory(&cli.dir).load().await?;

    let store = TranslationStore::open(&cli.dir, settings).await?;
    let indent = store.settings().indent && !cli.compact;
    execute(&store, cli.command, indent).await
}

/// 読み込み済みのストアに対してコマンドを 1 つ実行する
///
/// # Errors
/// 操作自体、またはその後の保存で発生したストアのエラー
pub async fn execute(
    store: &TranslationStore,
    command: Command,
    indent: bool,
) -> Result<Value, CliError> {
    tracing::debug!(?command, "Executing command");
    let mutating = command.is_mutating();

    let output = match command {
        Command::Get { key, lang } => Value::String(store.get(&key, &lang).await),
        Command::GetAll { key } => serde_json::to_value(store.get_all(&key).await)?,
        Command::Set { key, value, lang } => {
            store.set(&key, &value, &lang).await?;
            json!({ "id": key, "template": value })
        }
        Command::Remove { key, lang } => {
            store.remove(&key, &lang).await?;
            Value::Null
        }
        Command::Languages => serde_json::to_value(store.languages().await)?,
        Command::Language { code } => serde_json::to_value(store.language(&code).await?)?,
        Command::AddLanguage { code, base } => {
            serde_json::to_value(store.add_language(&code, &base).await?)?
        }
        Command::RemoveLanguage { code } => {
            store.remove_language(&code).await?;
            Value::Null
        }
        Command::Sync { base, remove_orphans } => {
            let settings: &StoreSettings = store.settings();
            let base = base
                .or_else(|| settings.base_language.clone())
                .ok_or(CliError::MissingBaseLanguage)?;
            let orphan_removal = remove_orphans || settings.orphan_removal;
            serde_json::to_value(store.sync(&base, orphan_removal).await?)?
        }
    };

    if mutating {
        store.save(indent).await?;
    }
    Ok(output)
}
