//! translation-store
//!
//! ネストした JSON 翻訳ファイルをフラットなキーで扱い、言語間で同期する

pub mod cli;
pub mod config;
pub mod keys;
pub mod store;
pub mod types;

pub use store::{
    StoreError,
    TranslationStore,
};
