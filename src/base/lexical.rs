//! Lexical splitting of diagram element text.
//!
//! Element text is not parsed by any grammar; keyword refactoring, call
//! detection and the brace-token reader only need it cut into words,
//! literals, operators and blanks. Joining the pieces of
//! [`split_lexically`] with `keep_blanks = true` gives back the input.

use logos::Logos;

/// Coarse class of a lexical piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexicalClass {
    Blank,
    Literal,
    Word,
    Number,
    Operator,
    Other,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Lexeme {
    #[regex(r"[ \t\r\n\f]+")]
    Blank,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    Literal,

    #[regex(r"[\p{XID_Start}_][\p{XID_Continue}]*")]
    Word,

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    #[regex(r"0[xX][0-9a-fA-F]+")]
    Number,

    #[token("<-")]
    #[token(":=")]
    #[token("<=")]
    #[token(">=")]
    #[token("<>")]
    #[token("==")]
    #[token("!=")]
    #[token("&&")]
    #[token("||")]
    #[token("<<")]
    #[token(">>")]
    #[token("..")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("++")]
    #[token("--")]
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token("=")]
    #[token("<")]
    #[token(">")]
    #[token("!")]
    #[token("&")]
    #[token("|")]
    #[token("^")]
    #[token("(")]
    #[token(")")]
    #[token("[")]
    #[token("]")]
    #[token("{")]
    #[token("}")]
    #[token(",")]
    #[token(";")]
    #[token(":")]
    #[token(".")]
    Operator,

    #[regex(r".", priority = 0)]
    Other,
}

impl From<Lexeme> for LexicalClass {
    fn from(lexeme: Lexeme) -> Self {
        match lexeme {
            Lexeme::Blank => LexicalClass::Blank,
            Lexeme::Literal => LexicalClass::Literal,
            Lexeme::Word => LexicalClass::Word,
            Lexeme::Number => LexicalClass::Number,
            Lexeme::Operator => LexicalClass::Operator,
            Lexeme::Other => LexicalClass::Other,
        }
    }
}

/// Iterate over the classified pieces of `text`.
pub fn pieces(text: &str) -> impl Iterator<Item = (LexicalClass, &str)> {
    let mut lexer = Lexeme::lexer(text);
    std::iter::from_fn(move || {
        let lexeme = lexer.next()?;
        let class = lexeme.map(LexicalClass::from).unwrap_or(LexicalClass::Other);
        Some((class, lexer.slice()))
    })
}

/// Split `text` into lexical pieces, optionally keeping the blank runs.
pub fn split_lexically(text: &str, keep_blanks: bool) -> Vec<String> {
    pieces(text)
        .filter(|(class, _)| keep_blanks || *class != LexicalClass::Blank)
        .map(|(_, piece)| piece.to_string())
        .collect()
}

/// Whether `text` is a single identifier.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first == '_' || unicode_ident::is_xid_start(first) => {
            chars.all(unicode_ident::is_xid_continue)
        }
        _ => false,
    }
}

/// Whether the last char of `text` may continue an identifier.
pub fn ends_with_word_char(text: &str) -> bool {
    text.chars()
        .next_back()
        .is_some_and(|ch| ch == '_' || unicode_ident::is_xid_continue(ch))
}

/// Whether the first char of `text` may start or continue an identifier.
pub fn starts_with_word_char(text: &str) -> bool {
    text.chars()
        .next()
        .is_some_and(|ch| ch == '_' || unicode_ident::is_xid_continue(ch))
}

/// Whether two pieces are equal, optionally ignoring case.
pub fn pieces_equal(a: &str, b: &str, ignore_case: bool) -> bool {
    if ignore_case {
        a.to_lowercase() == b.to_lowercase()
    } else {
        a == b
    }
}

/// A line of element text cut into pieces, with an index of its
/// non-blank pieces ("words").
///
/// Matching works on words; slicing and replacing keep the blanks, so
/// untouched parts of the line stay byte-identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLine {
    pieces: Vec<String>,
    words: Vec<usize>,
}

impl TokenLine {
    pub fn new(text: &str) -> Self {
        let pieces = split_lexically(text, true);
        let words = pieces
            .iter()
            .enumerate()
            .filter(|(_, piece)| !piece.trim().is_empty())
            .map(|(index, _)| index)
            .collect();
        Self { pieces, words }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn word(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(|&piece| self.pieces[piece].as_str())
    }

    /// Whether `needle` occurs starting at word `at`.
    pub fn matches_at(&self, at: usize, needle: &[String], ignore_case: bool) -> bool {
        !needle.is_empty()
            && needle.iter().enumerate().all(|(offset, expected)| {
                self.word(at + offset)
                    .is_some_and(|word| pieces_equal(word, expected, ignore_case))
            })
    }

    /// First word index at or after `from` where `needle` starts.
    pub fn find(&self, needle: &[String], from: usize, ignore_case: bool) -> Option<usize> {
        (from..self.word_count()).find(|&at| self.matches_at(at, needle, ignore_case))
    }

    /// Text from word `from` up to (excluding) word `to`, trimmed.
    pub fn text_between(&self, from: usize, to: usize) -> String {
        let Some(&start) = self.words.get(from) else {
            return String::new();
        };
        let end = self.words.get(to).copied().unwrap_or(self.pieces.len());
        if end <= start {
            return String::new();
        }
        self.pieces[start..end].concat().trim().to_string()
    }

    /// Replace `count` words starting at word `at` (and the blanks between
    /// them) with `replacement`.
    pub fn replace_words(&mut self, at: usize, count: usize, replacement: &str) {
        let (Some(&start), Some(&last)) = (self.words.get(at), self.words.get(at + count - 1)) else {
            return;
        };
        let mut end = last + 1;
        if replacement.is_empty() && end < self.pieces.len() && self.pieces[end].trim().is_empty() {
            // swallow one blank so no double blank is left behind
            end += 1;
        }
        let tail: Vec<String> = self.pieces.split_off(end);
        self.pieces.truncate(start);
        if !replacement.is_empty() {
            self.pieces.push(replacement.to_string());
        }
        self.pieces.extend(tail);
        *self = Self::new(&self.pieces.concat());
    }

    pub fn text(&self) -> String {
        self.pieces.concat()
    }
}

/// The words of a keyword, for matching against a [`TokenLine`].
pub fn keyword_words(keyword: &str) -> Vec<String> {
    split_lexically(keyword, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_split_keeps_text_with_blanks() {
        let text = "x <- foo(a, \"b, c\") + 1.5";
        assert_eq!(split_lexically(text, true).concat(), text);
    }

    #[test]
    fn test_split_drops_blanks() {
        assert_eq!(
            split_lexically("for i <- 1 to 10", false),
            vec!["for", "i", "<-", "1", "to", "10"]
        );
    }

    #[test]
    fn test_split_range_operator() {
        assert_eq!(split_lexically("0..99", false), vec!["0", "..", "99"]);
    }

    #[test]
    fn test_unknown_chars_become_pieces() {
        assert_eq!(split_lexically("a ∧ b", false), vec!["a", "∧", "b"]);
    }

    #[test]
    fn test_token_line_find_and_slice() {
        let line = TokenLine::new("FOR i <- 1 TO  n");
        let to = keyword_words("to");
        assert_eq!(line.find(&to, 0, true), Some(4));
        assert_eq!(line.find(&to, 0, false), None);
        assert_eq!(line.text_between(3, 4), "1");
        assert_eq!(line.text_between(5, 6), "n");
    }

    #[test]
    fn test_token_line_replace_keeps_blanks() {
        let mut line = TokenLine::new("until  x > 0");
        line.replace_words(0, 1, "bis");
        assert_eq!(line.text(), "bis  x > 0");
        line.replace_words(0, 1, "");
        assert_eq!(line.text(), "x > 0");
    }

    #[rstest]
    #[case("foo", true)]
    #[case("_x1", true)]
    #[case("größe", true)]
    #[case("1a", false)]
    #[case("a-b", false)]
    #[case("", false)]
    fn test_is_identifier(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(is_identifier(text), expected);
    }
}
