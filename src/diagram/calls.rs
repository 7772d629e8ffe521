//! Signature resolution: turning call-shaped instructions into calls.
//!
//! Once every routine of an imported file is known, an instruction
//! `foo(1, 2)` or `x <- foo(1, 2)` whose `foo#2` is among the collected
//! signatures is promoted to a [`Call`](super::ElementKind::Call).

use indexmap::IndexSet;

use super::element::{Element, ElementKind};
use super::root::{Root, split_top_level};
use crate::base::is_identifier;
use crate::config::{KeywordKey, ParserKeywords};

/// A routine invocation found in element text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn signature(&self) -> String {
        format!("{}#{}", self.name, self.args.len())
    }

    /// Parse `name(args)` spanning the whole of `text`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let open = text.find('(')?;
        let name = text[..open].trim();
        if !is_identifier(name) || !text.ends_with(')') {
            return None;
        }
        let inner = &text[open + 1..text.len() - 1];
        // the opening parenthesis must close at the very end
        let mut depth = 0i32;
        for ch in inner.chars() {
            match ch {
                '(' | '[' => depth += 1,
                ')' | ']' => {
                    depth -= 1;
                    if depth < 0 {
                        return None;
                    }
                }
                _ => {}
            }
        }
        if depth != 0 {
            return None;
        }
        let args = if inner.trim().is_empty() {
            Vec::new()
        } else {
            split_top_level(inner, ',')
                .into_iter()
                .map(|arg| arg.trim().to_string())
                .collect()
        };
        Some(Self {
            name: name.to_string(),
            args,
        })
    }
}

fn is_reserved_start(line: &str, keywords: &ParserKeywords) -> bool {
    [
        KeywordKey::Input,
        KeywordKey::Output,
        KeywordKey::PreReturn,
        KeywordKey::PreLeave,
        KeywordKey::PreExit,
        KeywordKey::PreThrow,
    ]
    .into_iter()
    .any(|key| super::element::starts_with_keyword(line, keywords.get(key), keywords.ignore_case))
}

/// The invocation if `element` is a single-line procedure call.
pub fn procedure_call(element: &Element, keywords: &ParserKeywords) -> Option<Invocation> {
    let [line] = element.text.as_slice() else {
        return None;
    };
    if is_reserved_start(line.trim(), keywords) {
        return None;
    }
    Invocation::parse(line)
}

/// The invocation if `element` is a single-line `target <- name(args)`.
pub fn function_call(element: &Element, keywords: &ParserKeywords) -> Option<Invocation> {
    let [line] = element.text.as_slice() else {
        return None;
    };
    if is_reserved_start(line.trim(), keywords) {
        return None;
    }
    let (target, value) = line.split_once("<-").or_else(|| line.split_once(":="))?;
    if target.trim().is_empty() {
        return None;
    }
    Invocation::parse(value)
}

impl Root {
    /// Convert call-shaped instructions matching `signatures` into calls.
    ///
    /// Returns the number of converted elements.
    pub fn convert_to_calls(&mut self, signatures: &IndexSet<String>, keywords: &ParserKeywords) -> usize {
        if signatures.is_empty() {
            return 0;
        }
        let mut converted = 0;
        self.walk_mut(&mut |element| {
            if !element.is_instruction() || element.disabled {
                return;
            }
            let invocation = procedure_call(element, keywords).or_else(|| function_call(element, keywords));
            if invocation.is_some_and(|call| signatures.contains(&call.signature())) {
                element.kind = ElementKind::Call;
                converted += 1;
            }
        });
        if converted > 0 {
            tracing::debug!(root = %self.method_name(), converted, "converted instructions to calls");
        }
        converted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("foo(1, 2)", Some("foo#2"))]
    #[case("foo()", Some("foo#0"))]
    #[case("foo(g(1, 2), [3, 4])", Some("foo#2"))]
    #[case("foo(1) + bar(2)", None)]
    #[case("(a)", None)]
    #[case("x <- 1", None)]
    fn test_invocation_signature(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(Invocation::parse(text).map(|call| call.signature()).as_deref(), expected);
    }

    #[test]
    fn test_output_is_never_a_call() {
        let keywords = ParserKeywords::default();
        assert_eq!(procedure_call(&Element::instruction("OUTPUT(x)"), &keywords), None);
    }

    #[test]
    fn test_function_call_shape() {
        let keywords = ParserKeywords::default();
        let call = function_call(&Element::instruction("r <- max(a, b)"), &keywords);
        assert_eq!(call.map(|c| c.signature()), Some("max#2".to_string()));
        assert_eq!(function_call(&Element::instruction("a\nb <- f(1)"), &keywords), None);
    }

    #[test]
    fn test_disabled_instructions_are_not_converted() {
        let mut root = Root::program("main");
        let mut disabled = Element::instruction("foo(1, 2)");
        disabled.disabled = true;
        root.push(disabled);
        root.push(Element::instruction("foo(3, 4)"));
        let signatures: IndexSet<String> = ["foo#2".to_string()].into_iter().collect();

        assert_eq!(root.convert_to_calls(&signatures, &ParserKeywords::default()), 1);
        let elements = root.children.elements();
        assert_eq!(elements[0].kind, ElementKind::Instruction);
        assert_eq!(elements[1].kind, ElementKind::Call);
    }
}
