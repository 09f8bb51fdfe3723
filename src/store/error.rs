//! Error type of the translation store.

use std::path::PathBuf;

use thiserror::Error;

use crate::keys::UnflattenError;

/// Errors raised by [`TranslationStore`](super::TranslationStore) operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The referenced language code is not loaded
    #[error("Language is not loaded: {0}")]
    LanguageNotFound(String),
    /// A language with this code is already loaded
    #[error("Language already exists: {0}")]
    LanguageAlreadyExists(String),
    /// The language code cannot name a document
    #[error("Invalid language code: '{0}'")]
    InvalidLanguageCode(String),
    /// The key is empty or has an empty segment
    #[error("Invalid translation key: '{0}'")]
    InvalidKey(String),
    /// A document is not valid JSON
    #[error("Failed to parse {}: {source}", .path.display())]
    Decode {
        /// Document path
        path: PathBuf,
        /// Parser error
        source: serde_json::Error,
    },
    /// A document is valid JSON but its root is not an object
    #[error("{} does not contain a JSON object", .path.display())]
    NotAnObject {
        /// Document path
        path: PathBuf,
    },
    /// The keys of a language cannot be nested into one document
    #[error("Cannot build document for language '{language}': {source}")]
    KeyConflict {
        /// Language code
        language: String,
        /// Conflicting key
        source: UnflattenError,
    },
    /// Serializing a document failed
    #[error("Failed to encode language '{language}': {source}")]
    Encode {
        /// Language code
        language: String,
        /// Serializer error
        source: serde_json::Error,
    },
    /// The translation directory is missing or is a file
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    /// Reading, writing or deleting a file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// A discovery glob could not be compiled
    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] globset::Error),
}

impl StoreError {
    /// Whether the error means "no such language", as opposed to a failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::LanguageNotFound(_))
    }

    /// Wraps an I/O error with the path it happened on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
