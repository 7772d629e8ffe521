//! Error types for source imports.
//!
//! Only [`ImportError::Cancelled`] ever leaves [`import_file`](super::import_file)
//! as an `Err`; every other variant is rendered into
//! [`ImportOutcome::error`](super::ImportOutcome::error).

use thiserror::Error;

use crate::parser::EngineError;

/// Failure of the preprocessing step.
#[derive(Debug, Error)]
pub enum PreparationError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The file content could not be decoded.
    #[error("Cannot decode file content as {label}")]
    Encoding { label: String },

    /// A preprocessor rejected the file content.
    #[error("{0}")]
    Rejected(String),
}

impl PreparationError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// Failure while turning a reduction tree into diagrams.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    /// The cancellation token fired during the build.
    #[error("build cancelled")]
    Cancelled,

    /// A reduction did not have the shape its rule promises.
    #[error("Malformed reduction for {rule}: {message}")]
    Malformed { rule: String, message: String },

    /// A construct the importer does not support.
    #[error("Unsupported construct: {0}")]
    Unsupported(String),
}

impl BuildError {
    pub fn malformed(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            rule: rule.into(),
            message: message.into(),
        }
    }

    pub fn unsupported(construct: impl Into<String>) -> Self {
        Self::Unsupported(construct.into())
    }
}

/// Errors of one source import.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("**FILE PREPARATION ERROR** on file \"{file}\":\n{source}")]
    Preparation {
        file: String,
        #[source]
        source: PreparationError,
    },

    /// The engine rejected the token stream; `context` is the rendered
    /// source excerpt (see `error_context`).
    #[error("{message} in file \"{file}\"{context}")]
    Syntax {
        file: String,
        message: String,
        context: String,
    },

    #[error("**PARSER ERROR** with file \"{file}\":\n{source}")]
    Engine {
        file: String,
        #[source]
        source: EngineError,
    },

    #[error("**IO ERROR** on importing file \"{file}\":\n{source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("**Severe error on importing file \"{file}\":\n{source}")]
    Build {
        file: String,
        #[source]
        source: BuildError,
    },

    #[error("Problems in postprocess:\n{0}")]
    PostProcess(String),

    #[error("{importer} CANCELLED!")]
    Cancelled { importer: String },
}

impl ImportError {
    pub fn cancelled(importer: impl Into<String>) -> Self {
        Self::Cancelled {
            importer: importer.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_file() {
        let error = ImportError::Preparation {
            file: "a.pas".into(),
            source: PreparationError::rejected("empty"),
        };
        assert_eq!(error.to_string(), "**FILE PREPARATION ERROR** on file \"a.pas\":\nempty");

        let error = ImportError::Syntax {
            file: "a.pas".into(),
            message: "Syntax error at line 1, column 4: unexpected then".into(),
            context: String::new(),
        };
        assert_eq!(
            error.to_string(),
            "Syntax error at line 1, column 4: unexpected then in file \"a.pas\""
        );
    }

    #[test]
    fn test_cancellation_is_distinct() {
        let error = ImportError::cancelled("PasImporter");
        assert!(error.is_cancelled());
        assert_eq!(error.to_string(), "PasImporter CANCELLED!");
        let build = ImportError::Build {
            file: "x".into(),
            source: BuildError::unsupported("goto"),
        };
        assert!(!build.is_cancelled());
    }
}
