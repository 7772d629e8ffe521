//! Content composition: flatten a reduction back into display text.

use crate::base::lexical::{LexicalClass, ends_with_word_char, pieces, starts_with_word_char};
use crate::parser::{Reduction, Token, TokenData};

/// How an operator terminal is spaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pad {
    /// A blank on both sides, unless the operator opens its reduction
    /// (unary use). Word operators are always padded.
    Both,
    /// A blank after the operator only (list separators).
    After,
}

/// Per-grammar composition settings.
#[derive(Debug, Clone, Copy)]
pub struct Composer<'a> {
    pub pads: &'a [(&'a str, Pad)],
    /// Terminal symbol name → replacement text.
    pub translations: &'a [(&'a str, &'a str)],
}

impl Composer<'_> {
    pub fn compose(&self, reduction: &Reduction) -> String {
        let mut out = String::new();
        self.compose_into(reduction, &mut out);
        collapse_blanks(&out)
    }

    /// Compose a single token, terminal or not.
    pub fn compose_token(&self, token: &Token) -> String {
        match &token.data {
            TokenData::Reduction(reduction) => self.compose(reduction),
            TokenData::Lexeme(_) => {
                let mut out = String::new();
                self.push_terminal(token, false, &mut out);
                collapse_blanks(&out)
            }
        }
    }

    /// Compose the child at `index` of `reduction`; empty when absent.
    pub fn compose_child(&self, reduction: &Reduction, index: usize) -> String {
        reduction
            .token(index)
            .map(|token| self.compose_token(token))
            .unwrap_or_default()
    }

    fn compose_into(&self, reduction: &Reduction, out: &mut String) {
        for (index, token) in reduction.tokens.iter().enumerate() {
            match &token.data {
                TokenData::Reduction(child) => self.compose_into(child, out),
                TokenData::Lexeme(_) => self.push_terminal(token, index == 0, out),
            }
        }
    }

    fn push_terminal(&self, token: &Token, opens_reduction: bool, out: &mut String) {
        let name = token.name.as_str();
        let text = self
            .translations
            .iter()
            .find(|(symbol, _)| *symbol == name)
            .map_or(token.text(), |(_, replacement)| replacement);
        let pad = self.pads.iter().find(|(symbol, _)| *symbol == name).map(|(_, pad)| *pad);
        let word = starts_with_word_char(text);
        match pad {
            Some(Pad::Both) if word || !opens_reduction => {
                out.push(' ');
                out.push_str(text);
                out.push(' ');
            }
            Some(Pad::After) => {
                out.push_str(text);
                out.push(' ');
            }
            _ => {
                if word && ends_with_word_char(out) {
                    out.push(' ');
                }
                out.push_str(text);
            }
        }
    }
}

/// Collapse blank runs outside literals and trim.
pub fn collapse_blanks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (class, piece) in pieces(text) {
        if class == LexicalClass::Blank {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
        } else {
            out.push_str(piece);
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("  a   +  b ", "a + b")]
    #[case("x  <-  'a  b'", "x <- 'a  b'")]
    #[case("", "")]
    fn test_collapse_blanks(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(collapse_blanks(input), expected);
    }
}
