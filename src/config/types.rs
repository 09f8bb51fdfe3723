//! Settings types and their validation.

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

/// A single problem found by [`StoreSettings::validate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "excludePatterns[0]")
    pub field_path: String,
    /// Human-readable explanation
    pub message: String,
}

impl ValidationError {
    /// Creates an error for `field_path`.
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

/// Errors raised while loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// One or more settings are invalid
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    /// The settings file could not be read
    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// The settings file is not valid JSON
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Renders validation errors as a numbered list.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Settings of one translation directory (`.translation-store.json`).
///
/// Every field is optional in the file; missing ones take their defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSettings {
    /// Which files are language documents
    pub translation_files: TranslationFilesConfig,

    /// Globs (relative to the translation directory) never loaded as languages.
    pub exclude_patterns: Vec<String>,

    /// Separator joining nested keys into flat keys
    pub key_separator: String,

    /// Pretty-print documents on save.
    pub indent: bool,

    /// Language used by `sync` when none is given explicitly.
    pub base_language: Option<String>,

    /// Whether `sync` drops keys missing from the base language by default.
    pub orphan_removal: bool,
}

/// Discovery settings for language documents.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationFilesConfig {
    /// Glob (relative to the translation directory) matching language documents
    pub file_pattern: String,
}

impl StoreSettings {
    /// Checks every setting and collects all problems found.
    ///
    /// # Errors
    /// - Required field is empty
    /// - Invalid glob pattern
    /// - Invalid separator
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.key_separator.is_empty() {
            errors.push(ValidationError::new(
                "keySeparator",
                "The separator cannot be empty. Please specify a separator, for example: \".\" (dot)",
            ));
        }

        if self.translation_files.file_pattern.is_empty() {
            errors.push(ValidationError::new(
                "translationFiles.filePattern",
                "The pattern cannot be empty. Example: \"**/*.json\"",
            ));
        } else if let Err(e) = globset::Glob::new(&self.translation_files.file_pattern) {
            errors.push(ValidationError::new(
                "translationFiles.filePattern",
                format!("Invalid glob pattern '{}': {e}", self.translation_files.file_pattern),
            ));
        }

        for (index, pattern) in self.exclude_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("excludePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        if let Some(base) = &self.base_language
            && base.is_empty()
        {
            errors.push(ValidationError::new(
                "baseLanguage",
                "The base language cannot be empty. Please specify a language code (e.g., \"en\"), or remove this field",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for TranslationFilesConfig {
    fn default() -> Self {
        Self { file_pattern: "**/*.json".to_string() }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            translation_files: TranslationFilesConfig::default(),
            exclude_patterns: Vec::new(),
            key_separator: ".".to_string(),
            indent: true,
            base_language: None,
            orphan_removal: false,
        }
    }
}
