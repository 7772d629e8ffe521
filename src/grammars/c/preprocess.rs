//! C source preparation.
//!
//! Preprocessor directives are blanked out (line numbers stay intact) and
//! every type name the grammar cannot know, `typedef` names and common
//! library types, is replaced by a reserved identifier the lexer reads as
//! a type.

use std::path::Path;

use indexmap::IndexSet;

use crate::base::lexical::{LexicalClass, pieces};
use crate::import::preprocess::read_source;
use crate::import::{IdReplacements, PreparationError, PreparedSource, Preprocessor};

/// Library type names treated as declared types.
const STANDARD_TYPES: &[&str] = &[
    "FILE", "bool", "size_t", "ssize_t", "ptrdiff_t", "wchar_t", "time_t", "clock_t", "intptr_t",
    "uintptr_t", "int8_t", "int16_t", "int32_t", "int64_t", "uint8_t", "uint16_t", "uint32_t", "uint64_t",
];

/// Directive stripping and type name substitution.
#[derive(Debug, Clone, Copy, Default)]
pub struct CPreprocessor;

impl Preprocessor for CPreprocessor {
    fn prepare(&self, path: &Path, encoding: &str) -> Result<PreparedSource, PreparationError> {
        let text = read_source(path, encoding)?;
        let (text, replacements) = prepare_text(&text);
        tracing::debug!(types = replacements.len(), "type names substituted");
        PreparedSource::from_text(&text, replacements)
    }
}

/// The substitute of the `index`th type name.
pub fn type_substitute(index: usize) -> String {
    format!("__nassi_type_{index}__")
}

pub fn prepare_text(text: &str) -> (String, IdReplacements) {
    let text = strip_directives(text);
    let mut types: IndexSet<&str> = IndexSet::new();
    types.extend(typedef_names(&text));
    types.extend(STANDARD_TYPES.iter().copied());

    let mut replacements = IdReplacements::new();
    let mut out = String::with_capacity(text.len());
    for (class, piece) in pieces(&text) {
        match types.get_index_of(piece) {
            Some(index) if class == LexicalClass::Word => {
                let substitute = type_substitute(index);
                replacements.insert(substitute.clone(), piece);
                out.push_str(&substitute);
            }
            _ => out.push_str(piece),
        }
    }
    (out, replacements)
}

/// Blank out `#` lines and their backslash continuations.
fn strip_directives(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut continued = false;
    for line in text.split('\n') {
        let directive = continued || line.trim_start().starts_with('#');
        continued = directive && line.trim_end().ends_with('\\');
        if !directive {
            out.push_str(line);
        }
        out.push('\n');
    }
    out.pop();
    out
}

/// Names introduced by `typedef` declarations, in source order.
fn typedef_names(text: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut words = pieces(text).filter(|(class, _)| *class != LexicalClass::Blank);
    while let Some((_, piece)) = words.next() {
        if piece != "typedef" {
            continue;
        }
        let mut depth = 0usize;
        let mut last_word: Option<&str> = None;
        // `typedef int (*name)(...)` names the pointer inside the parentheses
        let mut pointer_name: Option<&str> = None;
        let mut previous = "";
        for (class, piece) in words.by_ref() {
            match piece {
                "{" | "(" | "[" => depth += 1,
                "}" | ")" | "]" => depth = depth.saturating_sub(1),
                ";" if depth == 0 => break,
                _ if class == LexicalClass::Word => {
                    if depth == 0 {
                        last_word = Some(piece);
                    } else if previous == "*" && pointer_name.is_none() {
                        pointer_name = Some(piece);
                    }
                }
                _ => {}
            }
            previous = piece;
        }
        if let Some(name) = pointer_name.or(last_word) {
            names.push(name);
        }
    }
    names
}
