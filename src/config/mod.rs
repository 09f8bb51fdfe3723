//! Settings for a translation directory.
mod manager;
mod types;

pub use manager::{
    CONFIG_FILE_NAME,
    ConfigManager,
};
pub use types::{
    ConfigError,
    StoreSettings,
    TranslationFilesConfig,
    ValidationError,
};
