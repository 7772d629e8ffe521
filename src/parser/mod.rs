//! Parse engine contract and token/comment mapping.
//!
//! ```text
//! AuParser<E>
//!   ├── E: ParseEngine      (grammar tables, tokens, reductions)
//!   └── CommentMapper       (token → comment text, fed through TokenSink)
//! ```
//!
//! The engines themselves live in `grammars`; this module only defines
//! what an importer may ask of them.

mod au;
pub mod comments;
mod engine;
pub mod grammar;
mod token;

pub use au::AuParser;
pub use comments::CommentMapper;
pub use engine::{EngineError, ParseEngine, TokenSink};
pub use grammar::{AdvanceMode, EndingMode, GrammarTables, Group, Rule, Symbol, SymbolKind, TableVersion};
pub use token::{Reduction, Token, TokenData, TokenId};
