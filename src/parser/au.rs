//! Engine wrapper adding comment mapping.

use rustc_hash::FxHashMap;

use super::comments::CommentMapper;
use super::engine::{EngineError, ParseEngine, TokenSink};
use super::grammar::{GrammarTables, Symbol};
use super::token::{Reduction, Token, TokenId};
use crate::base::Position;

/// Feeds every token to the comment mapper and then to an optional
/// observer (the session log).
struct Tee<'m, 'o> {
    mapper: &'m mut CommentMapper,
    observer: Option<&'o mut dyn TokenSink>,
}

impl TokenSink for Tee<'_, '_> {
    fn token_read(&mut self, token: &Token, tables: &GrammarTables) {
        self.mapper.token_read(token, tables);
        if let Some(observer) = self.observer.as_deref_mut() {
            observer.token_read(token, tables);
        }
    }
}

/// A parse engine plus the token/comment mapper.
pub struct AuParser<E: ParseEngine> {
    engine: E,
    mapper: CommentMapper,
}

impl<E: ParseEngine> AuParser<E> {
    /// Wrap `engine`, repairing legacy comment groups once.
    pub fn new(mut engine: E) -> Self {
        engine.tables_mut().repair_legacy_comment_groups();
        Self {
            engine,
            mapper: CommentMapper::new(),
        }
    }

    pub fn tables(&self) -> &GrammarTables {
        self.engine.tables()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn parse_source_statements(
        &mut self,
        source: &str,
        observer: Option<&mut dyn TokenSink>,
    ) -> Result<bool, EngineError> {
        self.mapper = CommentMapper::new();
        let mut tee = Tee {
            mapper: &mut self.mapper,
            observer,
        };
        self.engine.parse_source_statements(source, &mut tee)
    }

    /// The current token; engine errors are logged and yield `None`.
    pub fn current_token(&self) -> Option<&Token> {
        match self.engine.current_token() {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(grammar = %self.engine.tables().name, %err, "could not get current token");
                None
            }
        }
    }

    pub fn current_position(&self) -> Position {
        self.engine.current_position()
    }

    pub fn expected_symbols(&self) -> Vec<Symbol> {
        self.engine.expected_symbols()
    }

    pub fn error_message(&self) -> String {
        self.engine.error_message()
    }

    pub fn take_reduction(&mut self) -> Option<Reduction> {
        self.engine.take_reduction()
    }

    pub fn comment_for(&self, token: TokenId) -> Option<&str> {
        self.mapper.comment_for(token)
    }

    pub fn take_comment_map(&mut self) -> FxHashMap<TokenId, String> {
        std::mem::take(&mut self.mapper).into_map()
    }
}
