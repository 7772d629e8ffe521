//! The contract between importers and a parse engine.
//!
//! An engine owns its [`GrammarTables`], reports every token it reads
//! (noise included) to a [`TokenSink`], and on success leaves the top
//! reduction for the caller to take.

use thiserror::Error;

use super::grammar::{GrammarTables, Symbol};
use super::token::{Reduction, Token};
use crate::base::Position;

/// Receives tokens in stream order as the engine reads them.
pub trait TokenSink {
    fn token_read(&mut self, token: &Token, tables: &GrammarTables);
}

/// Engine failures that are not plain syntax errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Lexical error at line {}, column {}: cannot recognize token {text:?}", position.line, position.column)]
    Lexical { position: Position, text: String },

    #[error("Internal error at line {}, column {}: {message}", position.line, position.column)]
    Internal { position: Position, message: String },

    #[error("No token available")]
    NoToken,
}

pub trait ParseEngine {
    fn tables(&self) -> &GrammarTables;

    fn tables_mut(&mut self) -> &mut GrammarTables;

    /// Parse `source`; `Ok(false)` means a syntax error was recorded.
    fn parse_source_statements(&mut self, source: &str, sink: &mut dyn TokenSink) -> Result<bool, EngineError>;

    fn current_reduction(&self) -> Option<&Reduction>;

    fn take_reduction(&mut self) -> Option<Reduction>;

    /// The token the engine stopped at. `Ok(None)` at end of input.
    fn current_token(&self) -> Result<Option<&Token>, EngineError>;

    fn current_position(&self) -> Position;

    /// Symbols acceptable at the failure point.
    fn expected_symbols(&self) -> Vec<Symbol>;

    fn error_message(&self) -> String;
}
