//! Brace-token diagram format (`.sbd`).
//!
//! A file is a header group naming the program followed by one group per
//! element:
//!
//! ```text
//! { name }
//! {1 instruction text}
//! {2 condition {{..true..}} {{..false..}}}
//! {4 condition {..body..}}          while
//! {5 condition {..body..}}          repeat (negated into "not (...)")
//! {vint numbers 10}                 declaration record
//! ```
//!
//! Blanks separate the fields of a group. A comma directly after the type
//! code, or between the fields of a declaration record, counts as a blank.

use indexmap::IndexSet;

use super::format::decode_text;
use super::frames::{SlotKind, TreeBuilder};
use super::{DiagramFormat, InterchangeError};
use crate::base::lexical::{is_identifier, split_lexically};
use crate::config::{KeywordKey, ParserKeywords};
use crate::diagram::{Element, Root, Subqueue};

const SBIDE_TYPES: [&str; 6] = ["int", "float", "char", "vint", "vfloat", "vchar"];
const ARRAY_INDEX_WARNING: &str = "Caution: array index base was adapted!";
const DEFAULT_MAX_INDEX: &str = "99";

/// Brace-token format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sbd;

impl DiagramFormat for Sbd {
    fn name(&self) -> &'static str {
        "sbide"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["sbd"]
    }

    fn read(&self, input: &[u8], keywords: &ParserKeywords) -> Result<Root, InterchangeError> {
        SbdReader::new(&decode_text(input), keywords).read()
    }

    fn validate(&self, input: &[u8]) -> Result<(), InterchangeError> {
        let text = decode_text(input);
        match text.trim_start().chars().next() {
            Some('{') => Ok(()),
            Some(c) => Err(inconsistent(&c.to_string())),
            None => Err(inconsistent("EOF")),
        }
    }
}

fn inconsistent(token: &str) -> InterchangeError {
    InterchangeError::malformed(
        token,
        format!("Inconsistent file content (\"{token}\" instead of expected '{{')."),
    )
}

fn is_blank(token: &str) -> bool {
    token.chars().all(char::is_whitespace)
}

fn is_separator(token: &str) -> bool {
    token == "," || is_blank(token)
}

/// Token cursor over one file.
///
/// Group parsers return `Ok(Some(token))` for the first token that breaks
/// the brace grammar, `"EOF"` if the input ended early.
struct SbdReader<'k> {
    tokens: Vec<String>,
    pos: usize,
    keywords: &'k ParserKeywords,
    /// Names declared as vectors.
    arrays: IndexSet<String>,
}

impl<'k> SbdReader<'k> {
    fn new(text: &str, keywords: &'k ParserKeywords) -> Self {
        Self {
            tokens: split_lexically(text, true),
            pos: 0,
            keywords,
            arrays: IndexSet::new(),
        }
    }

    fn read(mut self) -> Result<Root, InterchangeError> {
        match self.peek() {
            Some("{") => self.pos += 1,
            other => return Err(inconsistent(other.unwrap_or("EOF"))),
        }
        let name = self.take_until(&["}"]).ok_or_else(|| inconsistent("EOF"))?;
        self.pos += 1;
        let mut builder = TreeBuilder::new(Root::program(name.concat().trim()));
        builder.open_slot(SlotKind::Children)?;
        while self.peek() == Some("{") {
            if let Some(unexpected) = self.element(&mut builder)? {
                return Err(inconsistent(&unexpected));
            }
        }
        if let Some(rest) = self.peek() {
            return Err(inconsistent(rest));
        }
        builder.close_slot(SlotKind::Children)?;
        let root = builder.finish()?;
        tracing::debug!(elements = root.element_count(), arrays = self.arrays.len(), "brace diagram read");
        Ok(root)
    }

    /// The next token that is not a separator.
    fn peek(&mut self) -> Option<&str> {
        self.skip_separators();
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn skip_separators(&mut self) {
        while self.tokens.get(self.pos).is_some_and(|token| is_separator(token)) {
            self.pos += 1;
        }
    }

    /// Raw tokens up to (not including) the first of `stops`.
    fn take_until(&mut self, stops: &[&str]) -> Option<Vec<String>> {
        self.skip_separators();
        let start = self.pos;
        let length = self.tokens[start..]
            .iter()
            .position(|token| stops.contains(&token.as_str()))?;
        self.pos = start + length;
        Some(self.tokens[start..self.pos].to_vec())
    }

    fn eof() -> Result<Option<String>, InterchangeError> {
        Ok(Some("EOF".to_string()))
    }

    /// One `{..}` group, the cursor on its `{`.
    fn element(&mut self, builder: &mut TreeBuilder) -> Result<Option<String>, InterchangeError> {
        self.pos += 1;
        let Some(type_token) = self.peek().map(str::to_string) else {
            return Self::eof();
        };
        self.pos += 1;
        if type_token == "}" {
            return Ok(None);
        }
        match type_token.parse::<u32>() {
            Ok(1) => self.instruction(builder),
            Ok(2) => self.alternative(builder),
            Ok(4) => self.condition_loop(false, builder),
            Ok(5) => self.condition_loop(true, builder),
            Ok(3) => {
                tracing::warn!("case elements are not supported, element skipped");
                self.skip_group()
            }
            Ok(code) => {
                tracing::warn!(code, "unknown element type, element skipped");
                self.skip_group()
            }
            Err(_) => self.declaration(&type_token, builder),
        }
    }

    fn skip_group(&mut self) -> Result<Option<String>, InterchangeError> {
        let mut depth = 1usize;
        while let Some(token) = self.tokens.get(self.pos) {
            self.pos += 1;
            match token.as_str() {
                "{" => depth += 1,
                "}" => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(None);
                    }
                }
                _ => {}
            }
        }
        Self::eof()
    }

    fn instruction(&mut self, builder: &mut TreeBuilder) -> Result<Option<String>, InterchangeError> {
        let Some(payload) = self.take_until(&["}"]) else {
            return Self::eof();
        };
        self.pos += 1;
        let element = match inline_declaration(&payload) {
            Some(declaration) => Element::instruction(&declaration),
            None => self.payload_element(&payload, Element::instruction),
        };
        leaf(builder, "instruction", element)?;
        Ok(None)
    }

    fn alternative(&mut self, builder: &mut TreeBuilder) -> Result<Option<String>, InterchangeError> {
        let Some(condition) = self.take_until(&["{", "}"]) else {
            return Self::eof();
        };
        if self.tokens[self.pos] != "{" {
            return Ok(Some(self.tokens[self.pos].clone()));
        }
        self.pos += 1;
        let element = self.payload_element(&condition, |text| {
            Element::alternative(text, Subqueue::new(), Subqueue::new())
        });
        builder.open_element("alternative", element)?;
        if let Some(unexpected) = self.queue(SlotKind::True, builder)? {
            return Ok(Some(unexpected));
        }
        if self.peek() == Some("{") {
            self.pos += 1;
            if let Some(unexpected) = self.queue(SlotKind::False, builder)? {
                return Ok(Some(unexpected));
            }
        }
        match self.peek() {
            Some("}") => self.pos += 1,
            Some(other) => return Ok(Some(other.to_string())),
            None => return Self::eof(),
        }
        builder.close_element("alternative")?;
        Ok(None)
    }

    /// While (`repeat == false`) or repeat loop; the body groups follow the
    /// condition directly and the loop's `}` ends the body.
    fn condition_loop(&mut self, repeat: bool, builder: &mut TreeBuilder) -> Result<Option<String>, InterchangeError> {
        let Some(condition) = self.take_until(&["{", "}"]) else {
            return Self::eof();
        };
        let (tag, slot) = if repeat {
            let element = self.payload_element(&condition, |text| Element::repeat(&negate(text), Subqueue::new()));
            builder.open_element("repeat", element)?;
            ("repeat", SlotKind::Repeat)
        } else {
            let element = self.payload_element(&condition, |text| Element::while_loop(text, Subqueue::new()));
            builder.open_element("while", element)?;
            ("while", SlotKind::While)
        };
        if let Some(unexpected) = self.queue(slot, builder)? {
            return Ok(Some(unexpected));
        }
        builder.close_element(tag)?;
        Ok(None)
    }

    /// Element groups up to and including the closing `}`.
    fn queue(&mut self, slot: SlotKind, builder: &mut TreeBuilder) -> Result<Option<String>, InterchangeError> {
        builder.open_slot(slot)?;
        while self.peek() == Some("{") {
            if let Some(unexpected) = self.element(builder)? {
                return Ok(Some(unexpected));
            }
        }
        match self.peek() {
            Some("}") => self.pos += 1,
            Some(other) => return Ok(Some(other.to_string())),
            None => return Self::eof(),
        }
        builder.close_slot(slot)?;
        Ok(None)
    }

    /// A `{<type> <name> <size>}` record.
    fn declaration(&mut self, type_name: &str, builder: &mut TreeBuilder) -> Result<Option<String>, InterchangeError> {
        let separated = self.tokens.get(self.pos).is_some_and(|token| is_separator(token));
        let Some(fields) = self.take_until(&["}"]) else {
            return Self::eof();
        };
        self.pos += 1;

        let mut fields = fields.iter().map(String::as_str);
        let name = fields.next().filter(|name| is_identifier(name));
        let gap = fields.next().is_some_and(is_separator);
        let mut size: Vec<&str> = fields.skip_while(|token| is_separator(token)).collect();
        while size.last().is_some_and(|token| is_separator(token)) {
            size.pop();
        }
        let Some(name) = name.filter(|_| separated && gap && !size.is_empty()) else {
            tracing::warn!(type_name, "unrecognized record skipped");
            return Ok(None);
        };

        let mut comment = Vec::new();
        let type_text = match SBIDE_TYPES.iter().position(|known| *known == type_name) {
            Some(index) if index >= SBIDE_TYPES.len() / 2 => {
                comment.push(ARRAY_INDEX_WARNING.to_string());
                let max_index = match evaluate(&size).and_then(|size| size.checked_sub(1)) {
                    Some(max_index) => max_index.to_string(),
                    None => {
                        comment.push(format!("Default size for not evaluable value {}", size.concat()));
                        DEFAULT_MAX_INDEX.to_string()
                    }
                };
                self.arrays.insert(name.to_string());
                format!("array[0 .. {max_index}] of {}", &type_name[1..])
            }
            _ => type_name.to_string(),
        };
        let mut element = Element::instruction(&format!("var {name}: {type_text}"));
        element.comment = comment;
        leaf(builder, "instruction", element)?;
        Ok(None)
    }

    /// Build an element from converted payload text, flagging array access.
    fn payload_element(&self, payload: &[String], make: impl FnOnce(&str) -> Element) -> Element {
        let element = make(&self.convert(payload));
        if self.refers_to_array(payload) {
            element.with_comment(ARRAY_INDEX_WARNING)
        } else {
            element
        }
    }

    fn convert(&self, payload: &[String]) -> String {
        let first = payload.iter().position(|token| !is_blank(token));
        let mut text = String::new();
        for (index, token) in payload.iter().enumerate() {
            match token.as_str() {
                "∧" | "∨" => {
                    if !text.is_empty() && !text.ends_with(char::is_whitespace) {
                        text.push(' ');
                    }
                    text.push_str(if token == "∧" { "and" } else { "or" });
                    if payload.get(index + 1).is_some_and(|next| !is_blank(next)) {
                        text.push(' ');
                    }
                }
                "[" => text.push_str("[("),
                "]" => text.push_str(")-1]"),
                "output" | "Ausgabe" if first == Some(index) => {
                    text.push_str(self.keywords.get(KeywordKey::Output));
                }
                "input" | "Eingabe" if first == Some(index) => {
                    text.push_str(self.keywords.get(KeywordKey::Input));
                }
                other => text.push_str(&other.replace('↵', "\\n")),
            }
        }
        text.trim().to_string()
    }

    fn refers_to_array(&self, payload: &[String]) -> bool {
        payload.iter().any(|token| token == "[")
            && payload.iter().any(|token| token == "]")
            && payload.iter().any(|token| self.arrays.contains(token))
    }
}

fn leaf(builder: &mut TreeBuilder, tag: &str, element: Element) -> Result<(), InterchangeError> {
    builder.open_element(tag, element)?;
    builder.close_element(tag)
}

/// `var = name = literal` as a typed declaration.
fn inline_declaration(payload: &[String]) -> Option<String> {
    let words: Vec<&str> = payload
        .iter()
        .map(String::as_str)
        .filter(|token| !is_separator(token))
        .collect();
    let ["var", "=", name, "=", literal] = words.as_slice() else {
        return None;
    };
    if !is_identifier(name) {
        return None;
    }
    let type_name = if literal.starts_with('"') {
        "string"
    } else if literal.starts_with('\'') {
        "char"
    } else if literal.parse::<i64>().is_ok() {
        "int"
    } else if literal.parse::<f64>().is_ok() {
        "float"
    } else {
        return None;
    };
    Some(format!("var {name}: {type_name}"))
}

/// Negate a loop condition; a leading `not` is dropped instead.
fn negate(condition: &str) -> String {
    match condition.strip_prefix("not") {
        Some(rest) if rest.starts_with([' ', '(']) => strip_parentheses(rest.trim()).to_string(),
        _ => format!("not ({condition})"),
    }
}

fn strip_parentheses(text: &str) -> &str {
    let Some(inner) = text.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) else {
        return text;
    };
    let mut depth = 0i32;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return text;
        }
    }
    if depth == 0 { inner.trim() } else { text }
}

/// Evaluate an integer constant expression over `+ - * / mod` and parentheses.
fn evaluate(tokens: &[&str]) -> Option<i64> {
    let tokens: Vec<&str> = tokens.iter().copied().filter(|token| !is_blank(token)).collect();
    let mut parser = ConstExpr { tokens: &tokens, pos: 0 };
    let value = parser.sum()?;
    (parser.pos == tokens.len()).then_some(value)
}

struct ConstExpr<'t> {
    tokens: &'t [&'t str],
    pos: usize,
}

impl ConstExpr<'_> {
    fn next_if(&mut self, expected: &[&str]) -> Option<&str> {
        let token = *self.tokens.get(self.pos)?;
        if expected.contains(&token) {
            self.pos += 1;
            Some(token)
        } else {
            None
        }
    }

    fn sum(&mut self) -> Option<i64> {
        let mut value = self.product()?;
        while let Some(op) = self.next_if(&["+", "-"]) {
            let op = op == "+";
            let rhs = self.product()?;
            value = if op { value.checked_add(rhs)? } else { value.checked_sub(rhs)? };
        }
        Some(value)
    }

    fn product(&mut self) -> Option<i64> {
        let mut value = self.factor()?;
        while let Some(op) = self.next_if(&["*", "/", "mod", "%"]) {
            let op = op.to_string();
            let rhs = self.factor()?;
            value = match op.as_str() {
                "*" => value.checked_mul(rhs)?,
                "/" => value.checked_div(rhs)?,
                _ => value.checked_rem(rhs)?,
            };
        }
        Some(value)
    }

    fn factor(&mut self) -> Option<i64> {
        if self.next_if(&["-"]).is_some() {
            return self.factor()?.checked_neg();
        }
        if self.next_if(&["("]).is_some() {
            let value = self.sum()?;
            self.next_if(&[")"])?;
            return Some(value);
        }
        let token = *self.tokens.get(self.pos)?;
        let value = token.parse().ok()?;
        self.pos += 1;
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::ElementKind;
    use rstest::rstest;

    fn read(text: &str) -> Result<Root, InterchangeError> {
        Sbd.read(text.as_bytes(), &ParserKeywords::default())
    }

    fn texts(queue: &Subqueue) -> Vec<String> {
        queue.iter().map(Element::text_string).collect()
    }

    #[test]
    fn test_inline_declaration_with_commas() {
        let root = read("{ main }{1, var, =, a, =, 10}").unwrap();
        assert_eq!(root.text_string(), "main");
        assert_eq!(texts(&root.children), ["var a: int"]);
        assert!(root.children.elements()[0].is_instruction());
    }

    #[test]
    fn test_nested_structure() {
        let text = "{prog}\n{1 x <- 0}\n{4 x < 10 {1 x <- x + 1}}\n{5 x = 0 {1 x <- x - 1}}\n\
                    {2 x > 5 {{1 output x}}{{1 Eingabe y}}}";
        let root = read(text).unwrap();
        assert_eq!(root.text_string(), "prog");
        assert_eq!(texts(&root.children), ["x <- 0", "x < 10", "not (x = 0)", "x > 5"]);

        let elements = root.children.elements();
        assert_eq!(texts(elements[1].subqueues()[0]), ["x <- x + 1"]);
        assert!(matches!(elements[2].kind, ElementKind::Repeat { .. }));
        let ElementKind::Alternative { on_true, on_false } = &elements[3].kind else {
            panic!("expected alternative");
        };
        assert_eq!(texts(on_true), ["OUTPUT x"]);
        assert_eq!(texts(on_false), ["INPUT y"]);
    }

    #[test]
    fn test_alternative_without_false_branch() {
        let root = read("{p}{2 ok {{1 go}}}").unwrap();
        let ElementKind::Alternative { on_true, on_false } = &root.children.elements()[0].kind else {
            panic!("expected alternative");
        };
        assert_eq!(texts(on_true), ["go"]);
        assert!(on_false.is_empty());
    }

    #[test]
    fn test_declaration_records() {
        let text = "{p}{vint arr 10}{int n 0}{vchar s 2*(3+1)}{vfloat f size}{1 arr[i] <- n}";
        let root = read(text).unwrap();
        assert_eq!(
            texts(&root.children),
            [
                "var arr: array[0 .. 9] of int",
                "var n: int",
                "var s: array[0 .. 7] of char",
                "var f: array[0 .. 99] of float",
                "arr[(i)-1] <- n",
            ]
        );
        let elements = root.children.elements();
        assert_eq!(elements[0].comment, [ARRAY_INDEX_WARNING]);
        assert!(elements[1].comment.is_empty());
        assert_eq!(
            elements[3].comment,
            [ARRAY_INDEX_WARNING, "Default size for not evaluable value size"]
        );
        assert_eq!(elements[4].comment, [ARRAY_INDEX_WARNING]);
    }

    #[rstest]
    #[case("4", "array[0 .. 3] of int", None)]
    #[case("0", "array[0 .. -1] of int", None)]
    #[case("n+1", "array[0 .. 99] of int", Some("n+1"))]
    #[case("-9223372036854775807-1", "array[0 .. 99] of int", Some("-9223372036854775807-1"))]
    fn test_vector_sizes(#[case] size: &str, #[case] type_text: &str, #[case] not_evaluable: Option<&str>) {
        let root = read(&format!("{{p}}{{vint a {size}}}")).unwrap();
        let element = &root.children.elements()[0];
        assert_eq!(element.text_string(), format!("var a: {type_text}"));
        let mut expected = vec![ARRAY_INDEX_WARNING.to_string()];
        expected.extend(not_evaluable.map(|size| format!("Default size for not evaluable value {size}")));
        assert_eq!(element.comment, expected);
    }

    #[test]
    fn test_brackets_without_declared_array_get_no_warning() {
        let root = read("{p}{1 v[2] <- 1}").unwrap();
        assert_eq!(texts(&root.children), ["v[(2)-1] <- 1"]);
        assert!(root.children.elements()[0].comment.is_empty());
    }

    #[rstest]
    #[case("{p}{4 a ∧ b ∨ c}", "a and b or c")]
    #[case("{p}{4 a∧b}", "a and b")]
    #[case("{p}{1 output \"a↵b\"}", "OUTPUT \"a\\nb\"")]
    #[case("{p}{1 x <- max(a, b)}", "x <- max(a, b)")]
    fn test_payload_conversion(#[case] text: &str, #[case] expected: &str) {
        let root = read(text).unwrap();
        assert_eq!(root.children.elements()[0].text_string(), expected);
    }

    #[test]
    fn test_unknown_and_empty_groups_are_skipped() {
        let root = read("{p}{}{9 what {1 x}}{3 n {1 a}{1 b}}{1 y}").unwrap();
        assert_eq!(texts(&root.children), ["y"]);
    }

    #[rstest]
    #[case("{p}{1 x}x", "x")]
    #[case("{p}{4 c {1 x}", "EOF")]
    #[case("{p}{2 c }", "}")]
    #[case("p}", "p")]
    fn test_inconsistent_content(#[case] text: &str, #[case] token: &str) {
        match read(text).unwrap_err() {
            InterchangeError::Malformed { tag, message } => {
                assert_eq!(tag, token);
                assert_eq!(message, format!("Inconsistent file content (\"{token}\" instead of expected '{{')."));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[rstest]
    #[case("not (a > b)", "a > b")]
    #[case("not done", "done")]
    #[case("(a) or (b)", "not ((a) or (b))")]
    #[case("nothing", "not (nothing)")]
    fn test_negate(#[case] condition: &str, #[case] expected: &str) {
        assert_eq!(negate(condition), expected);
    }

    #[rstest]
    #[case(&["10"], Some(10))]
    #[case(&["2", "*", "(", "3", "+", "1", ")"], Some(8))]
    #[case(&["17", " ", "mod", " ", "5"], Some(2))]
    #[case(&["4", "/", "0"], None)]
    #[case(&["size"], None)]
    fn test_evaluate(#[case] tokens: &[&str], #[case] expected: Option<i64>) {
        assert_eq!(evaluate(tokens), expected);
    }
}
