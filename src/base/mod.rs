//! Foundation types for the import front end.
//!
//! - [`Position`], [`LineIndex`] - 1-based line/column positions
//! - [`split_lexically`] - lexical splitting of element text
//!
//! This module has NO dependencies on other nassi modules.

pub mod lexical;
mod position;

pub use lexical::{is_identifier, split_lexically};
pub use position::{LineIndex, Position};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
