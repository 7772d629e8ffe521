//! Shared engine machinery for the built-in grammars.
//!
//! ```text
//! logos lexemes ──► group resolution ──► Cursor ──► recursive descent ──► Reduction
//!                     (comments)           │
//!                                          └──► TokenSink (every token, in order)
//! ```
//!
//! A grammar supplies its tables, a lexer and a goal function through
//! [`Grammar`]; [`Engine`] turns that into a [`ParseEngine`]. Reductions are
//! trimmed the way table-driven engines trim them: a rule whose only child
//! is a nonterminal yields that child directly.

use std::collections::VecDeque;
use std::marker::PhantomData;

use logos::Logos;
use smol_str::SmolStr;
use text_size::TextSize;

use crate::base::{LineIndex, Position};
use crate::parser::{
    AdvanceMode, EndingMode, EngineError, GrammarTables, ParseEngine, Reduction, Symbol, SymbolKind, Token,
    TokenData, TokenId, TokenSink,
};

/// Statement nesting beyond this depth aborts the parse.
const MAX_DEPTH: usize = 400;

/// A raw lexeme as produced by a grammar's logos lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'s> {
    /// Symbol name in the grammar tables.
    pub name: &'static str,
    pub text: &'s str,
    pub offset: TextSize,
}

pub type LexFn = fn(&str) -> Vec<Lexeme<'_>>;

/// Drive a logos lexer over `source`, naming each lexeme through `symbol`.
///
/// Unrecognized input becomes one-character `Error` lexemes. When a literal
/// breaks off midway (an apostrophe that never closes), only its first
/// character is given up and lexing resumes right behind it.
pub fn lex_with<'s, T>(source: &'s str, symbol: fn(T) -> &'static str) -> Vec<Lexeme<'s>>
where
    T: Logos<'s, Source = str>,
    T::Extras: Default,
{
    let mut lexemes = Vec::new();
    let mut base = 0;
    'relex: loop {
        let mut lexer = T::lexer(&source[base..]);
        while let Some(result) = lexer.next() {
            let start = base + lexer.span().start;
            let text: &'s str = lexer.slice();
            let first = text.chars().next().map_or(0, char::len_utf8);
            if result.is_err() && text.len() > first {
                lexemes.push(Lexeme {
                    name: "Error",
                    text: &source[start..start + first],
                    offset: TextSize::new(start as u32),
                });
                base = start + first;
                continue 'relex;
            }
            lexemes.push(Lexeme {
                name: result.map_or("Error", symbol),
                text,
                offset: TextSize::new(start as u32),
            });
        }
        return lexemes;
    }
}

/// Why a descent stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    Syntax,
    Lexical,
    TooDeep,
}

pub type Parse<T> = Result<T, Stop>;

/// Everything needed to describe a failed parse.
#[derive(Debug, Clone)]
pub struct Failure {
    pub token: Token,
    pub expected: Vec<Symbol>,
    pub message: String,
}

// ============================================================================
// Group resolution
// ============================================================================

struct Span {
    symbol: usize,
    group: Option<SmolStr>,
    start: usize,
    end: usize,
}

fn symbol_of(tables: &GrammarTables, name: &str) -> usize {
    tables.symbol_index(name).unwrap_or(1)
}

fn end_delimiter(tables: &GrammarTables, symbol: usize) -> &str {
    match tables.symbol(symbol).map(|symbol| symbol.name.as_str()) {
        Some("NewLine") | None => "\n",
        Some(name) => name,
    }
}

fn shifted(lexemes: Vec<Lexeme<'_>>, by: usize) -> impl Iterator<Item = Lexeme<'_>> {
    lexemes.into_iter().map(move |lexeme| Lexeme {
        offset: lexeme.offset + TextSize::new(by as u32),
        ..lexeme
    })
}

/// Merge group members (comments) into single container tokens.
fn resolve_groups(tables: &GrammarTables, source: &str, lex: LexFn) -> Vec<Span> {
    let mut lexemes = lex(source);
    let mut spans = Vec::with_capacity(lexemes.len());
    let mut index = 0;
    while index < lexemes.len() {
        let lexeme = lexemes[index];
        let start = usize::from(lexeme.offset);
        let symbol = symbol_of(tables, lexeme.name);
        let Some(group) = tables.group_started_by(symbol) else {
            // lexers may hand over whole comments of the container symbol
            let container = tables.groups().iter().find(|group| group.container == symbol);
            spans.push(Span {
                symbol,
                group: container.map(|group| group.name.clone()),
                start,
                end: start + lexeme.text.len(),
            });
            index += 1;
            continue;
        };
        let unclosed = Span {
            symbol: symbol_of(tables, "Error"),
            group: None,
            start,
            end: start + lexeme.text.len(),
        };
        let (end, next) = match group.advance {
            AdvanceMode::Token => {
                let close = (index + 1..lexemes.len()).find(|&at| symbol_of(tables, lexemes[at].name) == group.end);
                match close {
                    None if group.ending == EndingMode::Closed => {
                        // the group start stays behind as a lexical error
                        tracing::debug!(group = %group.name, offset = start, "unclosed group");
                        spans.push(unclosed);
                        index += 1;
                        continue;
                    }
                    None => (source.len(), lexemes.len()),
                    Some(at) if group.ending == EndingMode::Closed => {
                        (usize::from(lexemes[at].offset) + lexemes[at].text.len(), at + 1)
                    }
                    Some(at) => (usize::from(lexemes[at].offset), at),
                }
            }
            AdvanceMode::Character => {
                let from = start + lexeme.text.len();
                let delimiter = end_delimiter(tables, group.end);
                let end = match source[from..].find(delimiter) {
                    Some(found) if group.ending == EndingMode::Closed => from + found + delimiter.len(),
                    Some(found) => from + found,
                    None if group.ending == EndingMode::Closed => {
                        tracing::debug!(group = %group.name, offset = start, "unclosed group");
                        spans.push(unclosed);
                        index += 1;
                        continue;
                    }
                    None => source.len(),
                };
                let mut next = index + 1;
                while next < lexemes.len() && usize::from(lexemes[next].offset) < end {
                    next += 1;
                }
                let straddles = next > index + 1 && {
                    let last = lexemes[next - 1];
                    usize::from(last.offset) + last.text.len() > end
                };
                if straddles {
                    // a lexeme ran across the group end; lex the rest again
                    lexemes.truncate(next - 1);
                    lexemes.extend(shifted(lex(&source[end..]), end));
                    next -= 1;
                }
                (end, next)
            }
        };
        spans.push(Span {
            symbol: group.container,
            group: Some(group.name.clone()),
            start,
            end,
        });
        index = next.max(index + 1);
    }
    spans
}

// ============================================================================
// Cursor
// ============================================================================

/// Token cursor for recursive descent.
///
/// Noise is skipped by every look-ahead but still handed to the sink, in
/// stream order, as the cursor moves past it.
pub struct Cursor<'t, 's> {
    tables: &'t GrammarTables,
    sink: &'s mut dyn TokenSink,
    tokens: VecDeque<Token>,
    expected: Vec<usize>,
    next_id: u32,
    depth: usize,
}

impl<'t, 's> Cursor<'t, 's> {
    pub fn new(tables: &'t GrammarTables, source: &str, lex: LexFn, sink: &'s mut dyn TokenSink) -> Self {
        let lines = LineIndex::new(source);
        let spans = resolve_groups(tables, source, lex);
        let mut tokens = VecDeque::with_capacity(spans.len() + 1);
        let mut next_id = 0;
        for span in spans {
            let symbol = tables.symbol(span.symbol);
            tokens.push_back(Token {
                id: TokenId(next_id),
                symbol: span.symbol,
                kind: symbol.map_or(SymbolKind::Error, |symbol| symbol.kind),
                name: symbol.map_or_else(|| SmolStr::new("Error"), |symbol| symbol.name.clone()),
                position: lines.position(TextSize::new(span.start as u32)),
                group: span.group,
                data: TokenData::Lexeme(source[span.start..span.end].to_string()),
            });
            next_id += 1;
        }
        tokens.push_back(Token {
            id: TokenId(next_id),
            symbol: 0,
            kind: SymbolKind::End,
            name: SmolStr::new("EOF"),
            position: lines.position(TextSize::new(source.len() as u32)),
            group: None,
            data: TokenData::Lexeme(String::new()),
        });
        Self {
            tables,
            sink,
            tokens,
            expected: Vec::new(),
            next_id: next_id + 1,
            depth: 0,
        }
    }

    pub fn tables(&self) -> &GrammarTables {
        self.tables
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn significant_index(&self, n: usize) -> usize {
        let mut seen = 0;
        for (index, token) in self.tokens.iter().enumerate() {
            if token.kind == SymbolKind::Noise {
                continue;
            }
            if seen == n {
                return index;
            }
            seen += 1;
        }
        self.tokens.len() - 1
    }

    /// The next significant token (end of input is a token too).
    pub fn current(&self) -> &Token {
        &self.tokens[self.significant_index(0)]
    }

    pub fn nth(&self, n: usize) -> &Token {
        &self.tokens[self.significant_index(n)]
    }

    /// Whether the next token is `name`; `name` is remembered as expected.
    pub fn at(&mut self, name: &str) -> bool {
        if let Some(symbol) = self.tables.symbol_index(name) {
            if !self.expected.contains(&symbol) {
                self.expected.push(symbol);
            }
        }
        self.current().name == name
    }

    pub fn at_any(&mut self, names: &[&str]) -> bool {
        let mut found = false;
        for name in names {
            found |= self.at(name);
        }
        found
    }

    /// Look ahead without recording an expectation.
    pub fn nth_is(&self, n: usize, name: &str) -> bool {
        self.nth(n).name == name
    }

    pub fn at_eof(&mut self) -> bool {
        self.at("EOF")
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    pub fn bump(&mut self) -> Token {
        let index = self.significant_index(0);
        if index == self.tokens.len() - 1 {
            return self.tokens[index].clone();
        }
        for _ in 0..index {
            if let Some(noise) = self.tokens.pop_front() {
                self.sink.token_read(&noise, self.tables);
            }
        }
        self.expected.clear();
        match self.tokens.pop_front() {
            Some(token) => {
                self.sink.token_read(&token, self.tables);
                token
            }
            None => self.current().clone(),
        }
    }

    pub fn eat(&mut self, name: &str) -> Option<Token> {
        self.at(name).then(|| self.bump())
    }

    pub fn expect(&mut self, name: &str) -> Parse<Token> {
        if self.at(name) {
            Ok(self.bump())
        } else {
            self.unexpected()
        }
    }

    pub fn unexpected<T>(&self) -> Parse<T> {
        if self.current().kind == SymbolKind::Error {
            Err(Stop::Lexical)
        } else {
            Err(Stop::Syntax)
        }
    }

    /// Run `parse` one nesting level deeper.
    pub fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Parse<T>) -> Parse<T> {
        if self.depth >= MAX_DEPTH {
            return Err(Stop::TooDeep);
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // =========================================================================
    // Reductions
    // =========================================================================

    /// Apply `rule` to `tokens`, trimming single-nonterminal reductions.
    pub fn reduce(&mut self, rule: usize, mut tokens: Vec<Token>) -> Token {
        if tokens.len() == 1 && tokens[0].is_nonterminal() {
            if let Some(only) = tokens.pop() {
                return only;
            }
        }
        let head = self.tables.rule(rule).map_or(1, |rule| rule.head);
        let position = tokens
            .first()
            .map_or_else(|| self.current().position, |token| token.position);
        let id = TokenId(self.next_id);
        self.next_id += 1;
        Token {
            id,
            symbol: head,
            kind: SymbolKind::Nonterminal,
            name: SmolStr::new(self.tables.rule_head_name(rule)),
            position,
            group: None,
            data: TokenData::Reduction(Box::new(Reduction::new(rule, tokens))),
        }
    }

    // =========================================================================
    // Outcome
    // =========================================================================

    /// Hand the rest of the stream, end marker included, to the sink.
    pub fn finish(mut self) {
        while let Some(token) = self.tokens.pop_front() {
            self.sink.token_read(&token, self.tables);
        }
    }

    pub fn failure(&self, stop: Stop) -> Failure {
        let token = self.current().clone();
        let mut expected: Vec<Symbol> = Vec::new();
        for &index in &self.expected {
            if let Some(symbol) = self.tables.symbol(index) {
                if !expected.contains(symbol) {
                    expected.push(symbol.clone());
                }
            }
        }
        let position = token.position;
        let message = match stop {
            Stop::Lexical => EngineError::Lexical {
                position,
                text: token.text().to_string(),
            }
            .to_string(),
            Stop::Syntax | Stop::TooDeep => format!(
                "Syntax error at line {}, column {}: unexpected {}",
                position.line,
                position.column,
                token.describe(self.tables)
            ),
        };
        Failure {
            token,
            expected,
            message,
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// What a built-in grammar provides.
pub trait Grammar {
    fn tables() -> GrammarTables;

    fn lex(source: &str) -> Vec<Lexeme<'_>>;

    /// Parse the goal symbol; the caller checks for end of input.
    fn goal(cursor: &mut Cursor<'_, '_>) -> Parse<Token>;
}

/// A [`ParseEngine`] over a [`Grammar`].
pub struct Engine<G: Grammar> {
    tables: GrammarTables,
    parsed: bool,
    reduction: Option<Reduction>,
    failure: Option<Failure>,
    position: Position,
    grammar: PhantomData<G>,
}

impl<G: Grammar> Engine<G> {
    pub fn new() -> Self {
        Self {
            tables: G::tables(),
            parsed: false,
            reduction: None,
            failure: None,
            position: Position::start(),
            grammar: PhantomData,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }
}

impl<G: Grammar> Default for Engine<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Grammar> ParseEngine for Engine<G> {
    fn tables(&self) -> &GrammarTables {
        &self.tables
    }

    fn tables_mut(&mut self) -> &mut GrammarTables {
        &mut self.tables
    }

    fn parse_source_statements(&mut self, source: &str, sink: &mut dyn TokenSink) -> Result<bool, EngineError> {
        self.parsed = true;
        self.reduction = None;
        self.failure = None;
        let mut cursor = Cursor::new(&self.tables, source, G::lex, sink);
        let outcome = G::goal(&mut cursor).and_then(|goal| {
            if cursor.at_eof() {
                Ok(goal)
            } else {
                cursor.unexpected()
            }
        });
        match outcome {
            Ok(goal) => {
                self.position = cursor.current().position;
                cursor.finish();
                match goal.data {
                    TokenData::Reduction(reduction) => {
                        self.reduction = Some(*reduction);
                        Ok(true)
                    }
                    TokenData::Lexeme(_) => Err(EngineError::Internal {
                        position: goal.position,
                        message: format!("goal yielded terminal {}", goal.name),
                    }),
                }
            }
            Err(Stop::TooDeep) => {
                let position = cursor.current().position;
                self.position = position;
                Err(EngineError::Internal {
                    position,
                    message: format!("statements nested deeper than {MAX_DEPTH} levels"),
                })
            }
            Err(stop) => {
                let failure = cursor.failure(stop);
                tracing::debug!(grammar = %self.tables.name, message = %failure.message, "parse failed");
                self.position = failure.token.position;
                self.failure = Some(failure);
                Ok(false)
            }
        }
    }

    fn current_reduction(&self) -> Option<&Reduction> {
        self.reduction.as_ref()
    }

    fn take_reduction(&mut self) -> Option<Reduction> {
        self.reduction.take()
    }

    fn current_token(&self) -> Result<Option<&Token>, EngineError> {
        if !self.parsed {
            return Err(EngineError::NoToken);
        }
        Ok(self
            .failure
            .as_ref()
            .map(|failure| &failure.token)
            .filter(|token| token.kind != SymbolKind::End))
    }

    fn current_position(&self) -> Position {
        self.position
    }

    fn expected_symbols(&self) -> Vec<Symbol> {
        self.failure
            .as_ref()
            .map(|failure| failure.expected.clone())
            .unwrap_or_default()
    }

    fn error_message(&self) -> String {
        self.failure
            .as_ref()
            .map(|failure| failure.message.clone())
            .unwrap_or_default()
    }
}

// ============================================================================
// Rule kinds
// ============================================================================

/// Declare a grammar's productions as a closed `RuleKind` enum.
///
/// ```ignore
/// rule_kinds! {
///     IfThen: "<IfStmt>" => ["if", "<Expr>", "then", "<Stmt>"],
/// }
/// ```
///
/// Tables built from `RuleKind::ALL` have rule index == `kind as usize`;
/// `RuleKind::resolve` maps any table back to kinds by rule shape.
macro_rules! rule_kinds {
    ($( $kind:ident : $head:literal => [ $($symbol:literal),* ] ),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum RuleKind {
            $($kind),*
        }

        impl RuleKind {
            pub const ALL: &'static [RuleKind] = &[$(RuleKind::$kind),*];

            pub fn head(self) -> &'static str {
                match self {
                    $(RuleKind::$kind => $head),*
                }
            }

            pub fn body(self) -> &'static [&'static str] {
                match self {
                    $(RuleKind::$kind => &[$($symbol),*]),*
                }
            }

            pub fn index(self) -> usize {
                self as usize
            }

            /// Kind of every rule in `tables`, by rule index.
            pub fn resolve(tables: &$crate::parser::GrammarTables) -> Vec<Option<RuleKind>> {
                $crate::grammars::kit::resolve_rule_kinds(tables, RuleKind::ALL, |kind| (kind.head(), kind.body()))
            }
        }
    };
}

pub(crate) use rule_kinds;

fn bare(name: &str) -> &str {
    if name.len() > 2 && name.starts_with('<') && name.ends_with('>') {
        &name[1..name.len() - 1]
    } else {
        name
    }
}

/// Match each table rule against the declared productions by head and body.
pub fn resolve_rule_kinds<K: Copy>(
    tables: &GrammarTables,
    kinds: &[K],
    shape: impl Fn(K) -> (&'static str, &'static [&'static str]),
) -> Vec<Option<K>> {
    let name_of = |index: usize| tables.symbol(index).map_or("", |symbol| symbol.name.as_str());
    tables
        .rules()
        .iter()
        .map(|rule| {
            kinds.iter().copied().find(|&kind| {
                let (head, body) = shape(kind);
                bare(head) == name_of(rule.head)
                    && body.len() == rule.symbols.len()
                    && body
                        .iter()
                        .zip(&rule.symbols)
                        .all(|(expected, &actual)| bare(expected) == name_of(actual))
            })
        })
        .collect()
}

/// Build tables: noise and delimiter symbols, then terminals, then rules.
pub fn build_tables(
    name: &str,
    version: crate::parser::TableVersion,
    special: &[(&str, SymbolKind)],
    terminals: &[&str],
    rules: impl IntoIterator<Item = (&'static str, &'static [&'static str])>,
) -> GrammarTables {
    let mut tables = GrammarTables::new(name, version);
    for (symbol, kind) in special {
        tables.add_symbol(symbol, *kind);
    }
    for terminal in terminals {
        tables.add_symbol(terminal, SymbolKind::Terminal);
    }
    for (head, body) in rules {
        tables.add_rule(head, body);
    }
    tables
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TableVersion;
    use rstest::rstest;

    #[derive(Logos, Debug, Clone, Copy, PartialEq)]
    enum Tiny {
        #[regex(r"[ \t]+")]
        Whitespace,
        #[regex(r"\r?\n")]
        NewLine,
        #[regex(r"[a-z]+")]
        Id,
        #[token(";")]
        Semi,
        #[token("/*")]
        Open,
        #[token("*/")]
        Close,
        #[regex(r#""[^"\n]*""#)]
        Text,
    }

    fn tiny_symbol(token: Tiny) -> &'static str {
        match token {
            Tiny::Whitespace => "Whitespace",
            Tiny::NewLine => "NewLine",
            Tiny::Id => "Id",
            Tiny::Semi => ";",
            Tiny::Open => "/*",
            Tiny::Close => "*/",
            Tiny::Text => "Text",
        }
    }

    fn lex(source: &str) -> Vec<Lexeme<'_>> {
        lex_with(source, tiny_symbol)
    }

    fn tables(advance: AdvanceMode) -> GrammarTables {
        let mut tables = build_tables(
            "tiny",
            TableVersion::V5,
            &[
                ("Whitespace", SymbolKind::Noise),
                ("NewLine", SymbolKind::Noise),
                ("Comment", SymbolKind::Noise),
                ("/*", SymbolKind::GroupStart),
                ("*/", SymbolKind::GroupEnd),
            ],
            &["Id", ";", "Text"],
            [("<List>", &["Id", ";"][..])],
        );
        let comment = tables.symbol_index("Comment").unwrap();
        let open = tables.symbol_index("/*").unwrap();
        let close = tables.symbol_index("*/").unwrap();
        tables.add_group("Comment Block", comment, open, close, advance, EndingMode::Closed);
        tables
    }

    #[derive(Default)]
    struct Collect(Vec<(String, String)>);

    impl TokenSink for Collect {
        fn token_read(&mut self, token: &Token, _tables: &GrammarTables) {
            self.0.push((token.name.to_string(), token.text().to_string()));
        }
    }

    #[test]
    fn test_groups_become_single_tokens() {
        let tables = tables(AdvanceMode::Token);
        let mut sink = Collect::default();
        let mut cursor = Cursor::new(&tables, "a /* b ; c */ ;", lex, &mut sink);
        assert!(cursor.at("Id"));
        cursor.bump();
        assert!(cursor.at(";"));
        cursor.bump();
        cursor.finish();
        let names: Vec<&str> = sink.0.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["Id", "Whitespace", "Comment", "Whitespace", ";", "EOF"]);
        assert_eq!(sink.0[2].1, "/* b ; c */");
    }

    #[test]
    fn test_character_groups_relex_after_straddling_lexeme() {
        let tables = tables(AdvanceMode::Character);
        let mut sink = Collect::default();
        let cursor = Cursor::new(&tables, "/* \"x */ y\" */", lex, &mut sink);
        cursor.finish();
        assert_eq!(sink.0[0], ("Comment".to_string(), "/* \"x */".to_string()));
        assert!(sink.0.iter().any(|(name, text)| name == "Id" && text == "y"));
    }

    #[test]
    fn test_reduce_trims_single_nonterminal() {
        let tables = tables(AdvanceMode::Token);
        let mut sink = Collect::default();
        let mut cursor = Cursor::new(&tables, "a;", lex, &mut sink);
        let id = cursor.bump();
        let semi = cursor.bump();
        let list = cursor.reduce(0, vec![id, semi]);
        assert!(list.is_nonterminal());
        let trimmed = cursor.reduce(0, vec![list.clone()]);
        assert_eq!(trimmed, list);
    }

    #[test]
    fn test_failure_lists_expected_symbols() {
        let tables = tables(AdvanceMode::Token);
        let mut sink = Collect::default();
        let mut cursor = Cursor::new(&tables, "a a", lex, &mut sink);
        cursor.expect("Id").unwrap();
        let stop = cursor.expect(";").unwrap_err();
        let failure = cursor.failure(stop);
        assert_eq!(failure.token.text(), "a");
        assert_eq!(failure.expected.len(), 1);
        assert_eq!(failure.expected[0].name, ";");
        assert_eq!(failure.message, "Syntax error at line 1, column 3: unexpected Id");
    }

    #[rstest]
    #[case::token(AdvanceMode::Token)]
    #[case::character(AdvanceMode::Character)]
    fn test_unclosed_group_is_lexical(#[case] advance: AdvanceMode) {
        let tables = tables(advance);
        let mut sink = Collect::default();
        let mut cursor = Cursor::new(&tables, "a; /* b ;", lex, &mut sink);
        cursor.expect("Id").unwrap();
        cursor.expect(";").unwrap();
        let stop = cursor.expect("Id").unwrap_err();
        assert_eq!(stop, Stop::Lexical);
        let failure = cursor.failure(stop);
        assert_eq!(failure.token.text(), "/*");
        assert_eq!(
            failure.message,
            "Lexical error at line 1, column 4: cannot recognize token \"/*\""
        );
        cursor.bump();
        assert!(cursor.at("Id"));
    }

    #[test]
    fn test_lex_with_splits_broken_literal() {
        let lexemes = lex_with("a \"b\nc", tiny_symbol);
        let names: Vec<&str> = lexemes.iter().map(|lexeme| lexeme.name).collect();
        assert_eq!(names, ["Id", "Whitespace", "Error", "Id", "NewLine", "Id"]);
        assert_eq!(lexemes[2].text, "\"");
        assert_eq!(usize::from(lexemes[3].offset), 3);
    }

    #[test]
    fn test_unknown_character_is_lexical() {
        let tables = tables(AdvanceMode::Token);
        let mut sink = Collect::default();
        let cursor = Cursor::new(&tables, "?", lex, &mut sink);
        assert_eq!(cursor.unexpected::<()>(), Err(Stop::Lexical));
    }
}
