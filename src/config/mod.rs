//! Configuration: parser-preference keywords and import options.
//!
//! Every import receives its [`ParserKeywords`] and [`ImportOptions`] by
//! value. The process-wide store in [`store`] only exists for the settings
//! component that persists them.

pub mod keywords;
mod options;
pub mod store;

use thiserror::Error;

pub use keywords::{KeywordKey, KeywordSnapshot, ParserKeywords};
pub use options::ImportOptions;
pub use store::keyword_store;

/// Errors while loading or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParserKeywords {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl ImportOptions {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}
