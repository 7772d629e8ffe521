//! # nassi-import
//!
//! Import front end for Nassi-Shneiderman diagrams: source code and stored
//! diagram files in, diagram trees out.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! grammars     → Language engines and tree synthesis (Pascal, ANSI C)
//!   ↓
//! import       → Import driver, preprocessing, error context, session log
//!   ↓
//! interchange  → Stored diagram readers (NSD, SBD, STJ)
//!   ↓
//! parser       → Engine contract, reductions, token/comment mapping
//!   ↓
//! diagram      → Root, Element, Subqueue, keyword refactoring
//!   ↓
//! config       → Parser keywords and import options
//!   ↓
//! base         → Positions and lexical splitting of element text
//! ```

// ============================================================================
// MODULES (dependency order: base → config → diagram → parser → interchange → import → grammars)
// ============================================================================

/// Foundation types: Position, LineIndex, lexical splitting
pub mod base;

/// Parser-preference keywords and import options
pub mod config;

/// Diagram tree model and keyword refactoring
pub mod diagram;

/// Parse engine contract and token/comment mapping
pub mod parser;

/// Stored diagram formats: NSD, SBD, STJ
#[cfg(feature = "interchange")]
pub mod interchange;

/// Source import pipeline shared by all language importers
pub mod import;

/// Language engines: Pascal and ANSI C
pub mod grammars;

// Re-export the types most callers need
pub use config::{ImportOptions, KeywordKey, ParserKeywords};
pub use diagram::{Element, ElementKind, Root, Subqueue};
pub use grammars::{CImporter, PascalImporter};
pub use import::{CodeImporter, ImportError, ImportOutcome, import_file};

// Re-export foundation types
pub use base::{LineIndex, Position, TextRange, TextSize};
