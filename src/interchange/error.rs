//! Error types for reading stored diagrams.

use thiserror::Error;

/// Errors that can occur while reading a stored diagram.
#[derive(Debug, Error)]
pub enum InterchangeError {
    /// XML parsing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// IO error while reading the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Text that cannot be decoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Missing required element or attribute.
    #[error("Missing required {kind}: {name}")]
    Missing { kind: &'static str, name: String },

    /// Invalid element type or attribute value.
    #[error("Invalid {kind}: {message}")]
    Invalid { kind: &'static str, message: String },

    /// Structure that does not nest the way the format requires.
    #[error("Malformed diagram at <{tag}>: {message}")]
    Malformed { tag: String, message: String },

    /// Unsupported file kind or format variant.
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl InterchangeError {
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding(message.into())
    }

    pub fn missing_element(name: impl Into<String>) -> Self {
        Self::Missing {
            kind: "element",
            name: name.into(),
        }
    }

    pub fn invalid_attribute(message: impl Into<String>) -> Self {
        Self::Invalid {
            kind: "attribute",
            message: message.into(),
        }
    }

    pub fn invalid_element(message: impl Into<String>) -> Self {
        Self::Invalid {
            kind: "element",
            message: message.into(),
        }
    }

    /// Create a structural error for `tag`.
    pub fn malformed(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            tag: tag.into(),
            message: message.into(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}
