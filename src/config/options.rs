//! Import options
//!
//! Switches the user sets once for all source imports.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Options for source-code import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportOptions {
    /// Attach source comments to the generated elements.
    pub import_comments: bool,
    /// Insert optional structure keywords (e.g. `postWhile`) into element text.
    pub insert_opt_keywords: bool,
    /// Turn mere variable declarations into instructions.
    pub import_var_decl: bool,
    /// Break element text lines longer than this (0 = never).
    pub max_line_length: usize,
    /// Directory for per-file import logs.
    pub log_dir: Option<PathBuf>,
    /// Encoding label of the source files.
    pub encoding: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            import_comments: false,
            insert_opt_keywords: false,
            import_var_decl: false,
            max_line_length: 0,
            log_dir: None,
            encoding: "UTF-8".to_string(),
        }
    }
}

impl ImportOptions {
    /// Options with comment import enabled.
    pub fn with_comments() -> Self {
        Self {
            import_comments: true,
            ..Self::default()
        }
    }
}
