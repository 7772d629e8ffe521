//! Source excerpt appended to syntax error messages.
//!
//! ```text
//! Preceding source context:
//!     3:   x := 1;
//!     4:   if x » then y
//!
//! Found token then
//!
//! Expected: '=' | '<>' | '<' | ...
//! ```

use indexmap::IndexSet;

use super::preprocess::IdReplacements;
use crate::base::Position;
use crate::parser::{GrammarTables, Symbol, Token};

/// Line width of the report; longer lines are continued.
pub const REPORT_WIDTH: usize = 100;

/// Number of non-blank lines shown before the failing line.
pub const CONTEXT_LINES: usize = 10;

/// What went wrong, as reported by the engine.
#[derive(Debug, Clone, Copy)]
pub struct FailurePoint<'a> {
    pub position: Position,
    pub token: Option<&'a Token>,
    pub expected: &'a [Symbol],
}

fn push_line(out: &mut String, number: usize, line: &str) {
    let chars: Vec<char> = line.chars().collect();
    let mut chunks = chars.chunks(REPORT_WIDTH);
    let first: String = chunks.next().map(|chunk| chunk.iter().collect()).unwrap_or_default();
    out.push_str(&format!("\n{number:5}:   {first}"));
    for chunk in chunks {
        let rest: String = chunk.iter().collect();
        out.push_str(&format!("\n{:5}+   {rest}", ""));
    }
}

fn expand_tabs(line: &str) -> String {
    line.replace('\t', "    ")
}

/// Render the context block for a failure in `source`.
///
/// `translations` maps a symbol's display form to one or more
/// ` | `-separated alternatives shown instead.
pub fn describe(
    source: &str,
    failure: FailurePoint<'_>,
    tables: &GrammarTables,
    translations: &[(&str, &str)],
    replacements: &IdReplacements,
) -> String {
    let mut out = String::from("\n\nPreceding source context:");
    let lines: Vec<&str> = source.split('\n').collect();
    let line_index = failure.position.line.saturating_sub(1).min(lines.len().saturating_sub(1));
    let column = failure.position.column.saturating_sub(1);

    let mut preceding: Vec<usize> = (0..line_index)
        .rev()
        .filter(|&index| !lines[index].trim().is_empty())
        .take(CONTEXT_LINES)
        .collect();
    preceding.reverse();
    for index in preceding {
        push_line(&mut out, index + 1, &replacements.undo(&expand_tabs(lines[index])));
    }

    let line = lines.get(line_index).copied().unwrap_or("");
    let marked = match line.char_indices().nth(column) {
        Some((at, _)) => format!("{}» {}", &line[..at], &line[at..]),
        None if line.chars().count() == column => format!("{line}» "),
        None => line.to_string(),
    };
    push_line(&mut out, line_index + 1, &expand_tabs(&replacements.undo(&marked)));

    match failure.token {
        None => out.push_str("\n\nFound token ε (END OF TEXT)"),
        Some(token) => {
            let shown = token.describe(tables);
            out.push_str(&format!("\n\nFound token {shown}"));
            let text = replacements.undo(token.text().trim());
            if shown != text && shown != format!("'{text}'") {
                out.push_str(&format!(" ({text})"));
            }
        }
    }

    out.push_str("\n\nExpected: ");
    let mut listed: IndexSet<String> = IndexSet::new();
    let mut pending = String::new();
    let mut separator = "";
    for symbol in failure.expected {
        let shown = symbol.to_string();
        let alternatives: Vec<String> = match translations.iter().find(|(name, _)| *name == shown) {
            Some((_, translated)) => translated.split(" | ").map(str::to_string).collect(),
            None => vec![shown],
        };
        for alternative in alternatives {
            if listed.insert(alternative.clone()) {
                pending.push_str(separator);
                pending.push_str(&alternative);
                separator = " | ";
            }
        }
        if pending.len() > REPORT_WIDTH {
            out.push_str(&pending);
            pending.clear();
            separator = "\n        | ";
        }
    }
    out.push_str(&pending);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{SymbolKind, TableVersion, TokenData, TokenId};
    use smol_str::SmolStr;

    fn tables() -> GrammarTables {
        let mut tables = GrammarTables::new("test", TableVersion::V5);
        tables.add_symbol("then", SymbolKind::Terminal);
        tables.add_symbol("Id", SymbolKind::Terminal);
        tables.add_symbol(";", SymbolKind::Terminal);
        tables.add_symbol("=", SymbolKind::Terminal);
        tables
    }

    fn symbol(tables: &GrammarTables, name: &str) -> Symbol {
        tables.symbol(tables.symbol_index(name).unwrap()).unwrap().clone()
    }

    fn token(tables: &GrammarTables, name: &str, text: &str, position: Position) -> Token {
        let index = tables.symbol_index(name).unwrap();
        Token {
            id: TokenId(0),
            symbol: index,
            kind: SymbolKind::Terminal,
            name: SmolStr::new(name),
            position,
            group: None,
            data: TokenData::Lexeme(text.to_string()),
        }
    }

    #[test]
    fn test_marks_failing_column_and_skips_blank_lines() {
        let tables = tables();
        let source = "a := 1;\n\n\nif x then y";
        let position = Position::new(4, 6);
        let found = token(&tables, "then", "then", position);
        let expected = [symbol(&tables, "="), symbol(&tables, ";")];
        let report = describe(
            source,
            FailurePoint {
                position,
                token: Some(&found),
                expected: &expected,
            },
            &tables,
            &[],
            &IdReplacements::new(),
        );
        assert_eq!(
            report,
            "\n\nPreceding source context:\n    1:   a := 1;\n    4:   if x » then y\n\nFound token then\n\nExpected: '=' | ';'"
        );
    }

    #[test]
    fn test_identifier_token_shows_text_and_original_name() {
        let tables = tables();
        let mut replacements = IdReplacements::new();
        replacements.insert("type_0", "myint");
        let position = Position::new(1, 1);
        let found = token(&tables, "Id", "type_0", position);
        let report = describe(
            "type_0 x",
            FailurePoint {
                position,
                token: Some(&found),
                expected: &[],
            },
            &tables,
            &[],
            &replacements,
        );
        assert!(report.contains("\n    1:   » myint x"));
        assert!(report.contains("Found token Id (myint)"));
    }

    #[test]
    fn test_end_of_text_and_translated_expectations() {
        let tables = tables();
        let expected = [symbol(&tables, "Id"), symbol(&tables, ";")];
        let report = describe(
            "x",
            FailurePoint {
                position: Position::new(1, 2),
                token: None,
                expected: &expected,
            },
            &tables,
            &[("Id", "identifier | name"), ("';'", "name")],
            &IdReplacements::new(),
        );
        assert!(report.contains("    1:   x» "));
        assert!(report.ends_with("Found token ε (END OF TEXT)\n\nExpected: identifier | name"));
    }

    #[test]
    fn test_long_lines_are_continued() {
        let tables = tables();
        let long = "x".repeat(150);
        let report = describe(
            &format!("{long}\ny"),
            FailurePoint {
                position: Position::new(2, 1),
                token: None,
                expected: &[],
            },
            &tables,
            &[],
            &IdReplacements::new(),
        );
        assert!(report.contains(&format!("\n    1:   {}\n     +   {}", "x".repeat(100), "x".repeat(50))));
    }
}
