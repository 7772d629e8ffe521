//! Comment retrieval for built elements.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::parser::{Reduction, TokenData, TokenId};

/// Comment delimiters of a language: line comments have no end.
pub type CommentDelimiters = &'static [(&'static str, Option<&'static str>)];

/// Collect the comments attached to the tokens of `reduction`, not
/// descending into nested statements.
pub fn retrieve_comment(
    reduction: &Reduction,
    comments: &FxHashMap<TokenId, String>,
    statement_rules: &FxHashSet<usize>,
) -> Option<String> {
    let mut found: Vec<&str> = Vec::new();
    collect(reduction, comments, statement_rules, &mut found);
    (!found.is_empty()).then(|| found.join("\n"))
}

fn collect<'c>(
    reduction: &Reduction,
    comments: &'c FxHashMap<TokenId, String>,
    statement_rules: &FxHashSet<usize>,
    found: &mut Vec<&'c str>,
) {
    for token in &reduction.tokens {
        match &token.data {
            TokenData::Reduction(child) => {
                if statement_rules.contains(&child.rule) {
                    continue;
                }
                if let Some(comment) = comments.get(&token.id) {
                    found.push(comment);
                }
                collect(child, comments, statement_rules, found);
            }
            TokenData::Lexeme(_) => {
                if let Some(comment) = comments.get(&token.id) {
                    found.push(comment);
                }
            }
        }
    }
}

/// Strip comment delimiters, drop blank lines and remove common indentation.
pub fn clean_comment(raw: &str, delimiters: CommentDelimiters) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut open_end: Option<&str> = None;
    for raw_line in raw.split('\n') {
        let mut line = raw_line.trim_end_matches('\r').to_string();
        if open_end.is_none() {
            line = line.trim().to_string();
            if let Some((start, end)) = delimiters.iter().find(|(start, _)| line.starts_with(start)) {
                line = line[start.len()..].to_string();
                open_end = *end;
            }
        } else if let Some(rest) = line.trim_start().strip_prefix('*') {
            if !rest.starts_with('/') {
                line = rest.to_string();
            }
        }
        if let Some(end) = open_end {
            if let Some(stripped) = line.trim_end().strip_suffix(end) {
                line = stripped.to_string();
                open_end = None;
            }
        }
        if !line.trim().is_empty() {
            lines.push(line.trim_end().to_string());
        }
    }
    let indent = lines
        .iter()
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}
