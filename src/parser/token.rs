//! Tokens and reductions produced by a parse engine.

use smol_str::SmolStr;

use super::grammar::{GrammarTables, SymbolKind};
use crate::base::Position;

/// Stream-order identity of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub u32);

/// Payload of a token: lexeme text or, for nonterminals, the reduction.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenData {
    Lexeme(String),
    Reduction(Box<Reduction>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub id: TokenId,
    pub symbol: usize,
    pub kind: SymbolKind,
    pub name: SmolStr,
    pub position: Position,
    /// Name of the lexer group this token was assembled by.
    pub group: Option<SmolStr>,
    pub data: TokenData,
}

impl Token {
    pub fn text(&self) -> &str {
        match &self.data {
            TokenData::Lexeme(text) => text,
            TokenData::Reduction(_) => "",
        }
    }

    pub fn as_reduction(&self) -> Option<&Reduction> {
        match &self.data {
            TokenData::Reduction(reduction) => Some(reduction),
            TokenData::Lexeme(_) => None,
        }
    }

    pub fn is_nonterminal(&self) -> bool {
        self.kind == SymbolKind::Nonterminal
    }

    pub fn is_terminal(&self) -> bool {
        self.kind == SymbolKind::Terminal
    }

    pub fn is_comment(&self) -> bool {
        self.group.as_ref().is_some_and(|group| group.starts_with("Comment"))
    }

    pub fn is_newline(&self) -> bool {
        self.name == "NewLine"
    }

    pub fn is_whitespace(&self) -> bool {
        self.name == "Whitespace"
    }

    /// How the token is named in messages: `'if'`, `Id`, `<Expr>`.
    pub fn describe(&self, tables: &GrammarTables) -> String {
        tables
            .symbol(self.symbol)
            .map(ToString::to_string)
            .unwrap_or_else(|| self.name.to_string())
    }
}

/// A completed rule application.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub rule: usize,
    pub tokens: Vec<Token>,
}

impl Reduction {
    pub fn new(rule: usize, tokens: Vec<Token>) -> Self {
        Self { rule, tokens }
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// The reduction held by child `index`, if that child is a nonterminal.
    pub fn child(&self, index: usize) -> Option<&Reduction> {
        self.tokens.get(index).and_then(Token::as_reduction)
    }

    /// The lexeme of child `index`, if that child is a terminal.
    pub fn lexeme(&self, index: usize) -> Option<&str> {
        match &self.tokens.get(index)?.data {
            TokenData::Lexeme(text) => Some(text),
            TokenData::Reduction(_) => None,
        }
    }

    /// Child reductions in order.
    pub fn children(&self) -> impl Iterator<Item = &Reduction> {
        self.tokens.iter().filter_map(Token::as_reduction)
    }

    /// Visit all terminal tokens below this reduction, in order.
    pub fn for_each_terminal(&self, visit: &mut dyn FnMut(&Token)) {
        for token in &self.tokens {
            match &token.data {
                TokenData::Lexeme(_) => visit(token),
                TokenData::Reduction(child) => child.for_each_terminal(visit),
            }
        }
    }

    /// Indented dump of the tree, one symbol per line.
    pub fn dump(&self, tables: &GrammarTables) -> String {
        let mut out = String::new();
        self.dump_into(tables, 0, &mut out);
        out
    }

    fn dump_into(&self, tables: &GrammarTables, depth: usize, out: &mut String) {
        out.push_str(&"| ".repeat(depth));
        out.push_str(&tables.rule_text(self.rule));
        out.push('\n');
        for token in &self.tokens {
            match &token.data {
                TokenData::Reduction(child) => child.dump_into(tables, depth + 1, out),
                TokenData::Lexeme(text) => {
                    out.push_str(&"| ".repeat(depth + 1));
                    out.push_str(text);
                    out.push('\n');
                }
            }
        }
    }
}
