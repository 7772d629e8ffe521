//! ANSI C import.
//!
//! Preprocessor directives are ignored and `typedef` names are substituted
//! before parsing. `main` fills the main diagram, every other function
//! becomes a subroutine diagram and file-level variables are gathered in
//! an includable globals diagram.

pub mod grammar;
mod importer;
mod lexer;
pub mod preprocess;

pub use grammar::{C, RuleKind};
pub use importer::CImporter;
pub use preprocess::CPreprocessor;
