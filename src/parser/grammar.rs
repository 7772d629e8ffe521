//! Grammar tables: symbols, rules and lexer groups.
//!
//! Tables come in two generations. [`TableVersion::V5`] tables declare their
//! lexer groups (comments) explicitly; [`TableVersion::V1`] tables only mark
//! the delimiter symbols, and [`GrammarTables::repair_legacy_comment_groups`]
//! turns those into groups once, before the first parse.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// Symbol classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Nonterminal,
    Terminal,
    /// Whitespace, newlines and comments.
    Noise,
    End,
    GroupStart,
    GroupEnd,
    /// Start of a line comment (legacy tables only).
    CommentLine,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub index: usize,
    pub name: SmolStr,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, SymbolKind::Terminal | SymbolKind::End)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            SymbolKind::Nonterminal => write!(f, "<{}>", self.name),
            SymbolKind::End => f.write_str("(EOF)"),
            SymbolKind::Error => f.write_str("(Error)"),
            _ if self
                .name
                .chars()
                .all(|ch| ch.is_alphanumeric() || ch == '_' || ch == ' ') =>
            {
                f.write_str(&self.name)
            }
            _ => write!(f, "'{}'", self.name),
        }
    }
}

/// A production `head ::= symbols`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub index: usize,
    pub head: usize,
    pub symbols: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceMode {
    Token,
    Character,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndingMode {
    /// The end symbol stays in the input (line comments end before the newline).
    Open,
    /// The end symbol belongs to the group.
    Closed,
}

/// A lexer group: everything from `start` to `end` becomes one token of
/// the `container` symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub index: usize,
    pub name: SmolStr,
    pub container: usize,
    pub start: usize,
    pub end: usize,
    pub advance: AdvanceMode,
    pub ending: EndingMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableVersion {
    V1,
    V5,
}

/// Symbol, rule and group tables of one grammar.
#[derive(Debug, Clone)]
pub struct GrammarTables {
    pub name: SmolStr,
    pub version: TableVersion,
    symbols: Vec<Symbol>,
    by_name: FxHashMap<SmolStr, usize>,
    rules: Vec<Rule>,
    groups: Vec<Group>,
}

impl GrammarTables {
    pub fn new(name: &str, version: TableVersion) -> Self {
        let mut tables = Self {
            name: SmolStr::new(name),
            version,
            symbols: Vec::new(),
            by_name: FxHashMap::default(),
            rules: Vec::new(),
            groups: Vec::new(),
        };
        tables.add_symbol("EOF", SymbolKind::End);
        tables.add_symbol("Error", SymbolKind::Error);
        tables
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Add a symbol, or return the index of an existing one with that name.
    pub fn add_symbol(&mut self, name: &str, kind: SymbolKind) -> usize {
        if let Some(existing) = self.symbol_index(name) {
            return existing;
        }
        let index = self.symbols.len();
        self.symbols.push(Symbol {
            index,
            name: SmolStr::new(name),
            kind,
        });
        self.by_name.insert(SmolStr::new(name), index);
        index
    }

    /// Add a rule. Names in angle brackets are nonterminals; any other
    /// name must already be a symbol or becomes a terminal.
    pub fn add_rule(&mut self, head: &str, body: &[&str]) -> usize {
        let head = self.add_symbol(head.trim_matches(|ch| ch == '<' || ch == '>'), SymbolKind::Nonterminal);
        let symbols = body
            .iter()
            .map(|name| {
                if name.starts_with('<') && name.ends_with('>') && name.len() > 2 {
                    self.add_symbol(&name[1..name.len() - 1], SymbolKind::Nonterminal)
                } else {
                    self.add_symbol(name, SymbolKind::Terminal)
                }
            })
            .collect();
        let index = self.rules.len();
        self.rules.push(Rule { index, head, symbols });
        index
    }

    pub fn add_group(
        &mut self,
        name: &str,
        container: usize,
        start: usize,
        end: usize,
        advance: AdvanceMode,
        ending: EndingMode,
    ) -> usize {
        let index = self.groups.len();
        self.groups.push(Group {
            index,
            name: SmolStr::new(name),
            container,
            start,
            end,
            advance,
            ending,
        });
        index
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn symbol(&self, index: usize) -> Option<&Symbol> {
        self.symbols.get(index)
    }

    pub fn symbol_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn rule(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    /// The group opened by `symbol`, if any.
    pub fn group_started_by(&self, symbol: usize) -> Option<&Group> {
        self.groups.iter().find(|group| group.start == symbol)
    }

    /// `<Head> ::= a b c`
    pub fn rule_text(&self, index: usize) -> String {
        let Some(rule) = self.rule(index) else {
            return String::new();
        };
        let name = |index: usize| {
            self.symbol(index)
                .map(ToString::to_string)
                .unwrap_or_default()
        };
        let body: Vec<String> = rule.symbols.iter().map(|&symbol| name(symbol)).collect();
        format!("{} ::= {}", name(rule.head), body.join(" "))
    }

    /// Head symbol name of a rule (without angle brackets).
    pub fn rule_head_name(&self, index: usize) -> &str {
        self.rule(index)
            .and_then(|rule| self.symbol(rule.head))
            .map(|symbol| symbol.name.as_str())
            .unwrap_or("")
    }

    // =========================================================================
    // Legacy repair
    // =========================================================================

    /// Synthesize comment groups for legacy tables.
    ///
    /// A line-comment group runs from the first `CommentLine` symbol to the
    /// `NewLine` symbol (open ending); a block-comment group runs from the
    /// first `GroupStart` to the first `GroupEnd` (closed ending). Both are
    /// contained in the `Comment` symbol, which is created as noise if
    /// missing. Returns the number of groups added.
    pub fn repair_legacy_comment_groups(&mut self) -> usize {
        if self.version != TableVersion::V1 || !self.groups.is_empty() {
            return 0;
        }
        let first_of = |kind: SymbolKind, symbols: &[Symbol]| {
            symbols.iter().find(|symbol| symbol.kind == kind).map(|symbol| symbol.index)
        };
        let line_start = first_of(SymbolKind::CommentLine, &self.symbols);
        let new_line = self.symbol_index("NewLine");
        let block_start = first_of(SymbolKind::GroupStart, &self.symbols);
        let block_end = first_of(SymbolKind::GroupEnd, &self.symbols);
        let has_line = line_start.is_some() && new_line.is_some();
        let has_block = block_start.is_some() && block_end.is_some();
        if !has_line && !has_block {
            return 0;
        }
        let container = self.add_symbol("Comment", SymbolKind::Noise);
        let mut added = 0;
        if let (Some(start), Some(end)) = (line_start, new_line) {
            self.add_group("Comment Line", container, start, end, AdvanceMode::Token, EndingMode::Open);
            added += 1;
        }
        if let (Some(start), Some(end)) = (block_start, block_end) {
            self.add_group("Comment Block", container, start, end, AdvanceMode::Token, EndingMode::Closed);
            added += 1;
        }
        tracing::debug!(grammar = %self.name, added, "repaired legacy comment groups");
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_tables() -> GrammarTables {
        let mut tables = GrammarTables::new("legacy", TableVersion::V1);
        tables.add_symbol("Whitespace", SymbolKind::Noise);
        tables.add_symbol("NewLine", SymbolKind::Noise);
        tables.add_symbol("//", SymbolKind::CommentLine);
        tables.add_symbol("{", SymbolKind::GroupStart);
        tables.add_symbol("}", SymbolKind::GroupEnd);
        tables.add_rule("<Program>", &["begin", "end"]);
        tables
    }

    #[test]
    fn test_repair_adds_both_groups() {
        let mut tables = legacy_tables();
        assert_eq!(tables.repair_legacy_comment_groups(), 2);
        let comment = tables.symbol_index("Comment").unwrap();
        assert_eq!(tables.symbol(comment).unwrap().kind, SymbolKind::Noise);

        let line = tables.group_started_by(tables.symbol_index("//").unwrap()).unwrap();
        assert_eq!(line.name, "Comment Line");
        assert_eq!(line.end, tables.symbol_index("NewLine").unwrap());
        assert_eq!(line.ending, EndingMode::Open);
        assert_eq!(line.container, comment);

        let block = tables.group_started_by(tables.symbol_index("{").unwrap()).unwrap();
        assert_eq!(block.ending, EndingMode::Closed);
    }

    #[test]
    fn test_repair_runs_once() {
        let mut tables = legacy_tables();
        tables.repair_legacy_comment_groups();
        assert_eq!(tables.repair_legacy_comment_groups(), 0);
        assert_eq!(tables.groups().len(), 2);
    }

    #[test]
    fn test_repair_reuses_existing_comment_symbol() {
        let mut tables = legacy_tables();
        let existing = tables.add_symbol("Comment", SymbolKind::Noise);
        tables.repair_legacy_comment_groups();
        assert!(tables.groups().iter().all(|group| group.container == existing));
    }

    #[test]
    fn test_modern_tables_are_left_alone() {
        let mut tables = GrammarTables::new("modern", TableVersion::V5);
        tables.add_symbol("NewLine", SymbolKind::Noise);
        tables.add_symbol("//", SymbolKind::CommentLine);
        assert_eq!(tables.repair_legacy_comment_groups(), 0);
    }

    #[test]
    fn test_rule_text() {
        let tables = legacy_tables();
        assert_eq!(tables.rule_text(0), "<Program> ::= begin end");
        assert_eq!(tables.rule_head_name(0), "Program");
    }

    #[test]
    fn test_symbol_display() {
        let mut tables = GrammarTables::new("t", TableVersion::V5);
        let semi = tables.add_symbol(";", SymbolKind::Terminal);
        let id = tables.add_symbol("Id", SymbolKind::Terminal);
        assert_eq!(tables.symbol(semi).unwrap().to_string(), "';'");
        assert_eq!(tables.symbol(id).unwrap().to_string(), "Id");
    }
}
