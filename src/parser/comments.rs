//! Token/comment association.
//!
//! Grammars drop comments, so the mapper watches the token stream and
//! remembers which significant token a comment belongs to:
//!
//! ```text
//! x := 1;  // trailing       -> attaches to the last token before it (";")
//! // leading                 -> pending, attaches to the next token ("y")
//! y := 2;
//! ```
//!
//! A line break ends the chance of a trailing comment, so a comment on the
//! next line always attaches forward.

use rustc_hash::FxHashMap;

use super::engine::TokenSink;
use super::grammar::GrammarTables;
use super::token::{Token, TokenId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenClass {
    Comment,
    LineBreak,
    Blank,
    Significant,
}

fn classify(token: &Token) -> TokenClass {
    if token.is_comment() {
        TokenClass::Comment
    } else if token.is_newline() || (token.is_whitespace() && token.text().contains('\n')) {
        TokenClass::LineBreak
    } else if token.is_whitespace() || token.text().trim().is_empty() && !token.is_nonterminal() {
        TokenClass::Blank
    } else {
        TokenClass::Significant
    }
}

/// Maps significant tokens to adjacent comment text.
#[derive(Debug, Default)]
pub struct CommentMapper {
    last_token: Option<TokenId>,
    last_comment: Option<String>,
    map: FxHashMap<TokenId, String>,
}

impl CommentMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one token, in stream order.
    pub fn accept(&mut self, token: &Token) {
        match classify(token) {
            TokenClass::Comment => {
                let text = token.text();
                if let Some(owner) = self.last_token.take() {
                    if !text.trim().is_empty() {
                        self.map.insert(owner, text.to_string());
                    }
                } else if let Some(pending) = self.last_comment.as_mut() {
                    pending.push('\n');
                    pending.push_str(text);
                } else if !text.trim().is_empty() {
                    self.last_comment = Some(text.to_string());
                }
            }
            TokenClass::LineBreak => {
                self.last_token = None;
            }
            TokenClass::Blank => {}
            TokenClass::Significant => {
                if let Some(pending) = self.last_comment.take() {
                    self.map.insert(token.id, pending.trim().to_string());
                    self.last_token = None;
                } else {
                    self.last_token = Some(token.id);
                }
            }
        }
    }

    pub fn comment_for(&self, token: TokenId) -> Option<&str> {
        self.map.get(&token).map(String::as_str)
    }

    /// Comment text not (yet) attached to any token.
    pub fn pending_comment(&self) -> Option<&str> {
        self.last_comment.as_deref()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn into_map(self) -> FxHashMap<TokenId, String> {
        self.map
    }
}

impl TokenSink for CommentMapper {
    fn token_read(&mut self, token: &Token, _tables: &GrammarTables) {
        self.accept(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Position;
    use crate::parser::grammar::SymbolKind;
    use crate::parser::token::TokenData;
    use smol_str::SmolStr;

    fn token(id: u32, name: &str, text: &str, group: Option<&str>) -> Token {
        Token {
            id: TokenId(id),
            symbol: 0,
            kind: if group.is_some() || name == "Whitespace" || name == "NewLine" {
                SymbolKind::Noise
            } else {
                SymbolKind::Terminal
            },
            name: SmolStr::new(name),
            position: Position::start(),
            group: group.map(SmolStr::new),
            data: TokenData::Lexeme(text.to_string()),
        }
    }

    fn run(stream: &[Token]) -> CommentMapper {
        let mut mapper = CommentMapper::new();
        for token in stream {
            mapper.accept(token);
        }
        mapper
    }

    #[test]
    fn test_trailing_comment_attaches_backward() {
        let mapper = run(&[
            token(0, "Id", "x", None),
            token(1, "Whitespace", " ", None),
            token(2, "Comment", "// note", Some("Comment Line")),
            token(3, "NewLine", "\n", None),
            token(4, "Id", "y", None),
        ]);
        assert_eq!(mapper.comment_for(TokenId(0)), Some("// note"));
        assert_eq!(mapper.comment_for(TokenId(4)), None);
    }

    #[test]
    fn test_comment_after_newline_attaches_forward() {
        let mapper = run(&[
            token(0, "Id", "x", None),
            token(1, "NewLine", "\n", None),
            token(2, "Comment", "(* lead *)", Some("Comment Block")),
            token(3, "Whitespace", "\n  ", None),
            token(4, "Id", "y", None),
        ]);
        assert_eq!(mapper.comment_for(TokenId(0)), None);
        assert_eq!(mapper.comment_for(TokenId(4)), Some("(* lead *)"));
    }

    #[test]
    fn test_split_comments_are_joined() {
        let mapper = run(&[
            token(0, "Comment", "// one", Some("Comment Line")),
            token(1, "NewLine", "\n", None),
            token(2, "Comment", "// two", Some("Comment Line")),
            token(3, "NewLine", "\n", None),
            token(4, "Id", "z", None),
        ]);
        assert_eq!(mapper.comment_for(TokenId(4)), Some("// one\n// two"));
        assert_eq!(mapper.pending_comment(), None);
    }

    #[test]
    fn test_trailing_pending_comment_is_kept() {
        let mapper = run(&[
            token(0, "NewLine", "\n", None),
            token(1, "Comment", "// end", Some("Comment Line")),
        ]);
        assert!(mapper.is_empty());
        assert_eq!(mapper.pending_comment(), Some("// end"));
    }

    #[test]
    fn test_no_comment_is_used_twice() {
        let stream = [
            token(0, "Id", "a", None),
            token(1, "Comment", "{c1}", Some("Comment Block")),
            token(2, "Comment", "{c2}", Some("Comment Block")),
            token(3, "Id", "b", None),
            token(4, "Comment", "{c3}", Some("Comment Block")),
            token(5, "NewLine", "\n", None),
            token(6, "Comment", "{c4}", Some("Comment Block")),
            token(7, "Id", "c", None),
            token(8, "Id", "d", None),
        ];
        let mapper = run(&stream);
        let map = mapper.into_map();
        let mut texts: Vec<&String> = map.values().collect();
        texts.sort();
        // c1 trails "a"; c2 leads "b"; "b" is then no longer open for a
        // trailing comment, so c3 joins c4 and both lead "c"
        assert_eq!(map.get(&TokenId(0)).map(String::as_str), Some("{c1}"));
        assert_eq!(map.get(&TokenId(3)).map(String::as_str), Some("{c2}"));
        assert_eq!(map.get(&TokenId(7)).map(String::as_str), Some("{c3}\n{c4}"));
        let total: usize = texts.iter().map(|text| text.matches('{').count()).sum();
        assert!(total <= 4);
        for (index, text) in texts.iter().enumerate() {
            assert!(!texts[index + 1..].contains(text));
        }
    }
}
