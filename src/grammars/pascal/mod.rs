//! Pascal / Delphi import.
//!
//! Programs, units and bare statement sequences are accepted. Routines
//! become subroutine diagrams; a unit's implementation variables and
//! initialization part form an includable diagram.

pub mod grammar;
mod importer;
mod lexer;

pub use grammar::{Pascal, RuleKind};
pub use importer::PascalImporter;
