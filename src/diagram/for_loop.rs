//! FOR loops: counting, traversing, or free text.

use super::subqueue::Subqueue;
use crate::base::is_identifier;
use crate::base::lexical::{TokenLine, keyword_words};
use crate::config::{KeywordKey, ParserKeywords};

/// How a FOR loop's header is to be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ForStyle {
    #[default]
    Counter,
    Traversal,
    FreeText,
}

impl ForStyle {
    pub fn name(self) -> &'static str {
        match self {
            ForStyle::Counter => "COUNTER",
            ForStyle::Traversal => "TRAVERSAL",
            ForStyle::FreeText => "FREETEXT",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "COUNTER" => Some(ForStyle::Counter),
            "TRAVERSAL" => Some(ForStyle::Traversal),
            "FREETEXT" => Some(ForStyle::FreeText),
            _ => None,
        }
    }
}

/// Loop parameters and body of a FOR element.
#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    pub style: ForStyle,
    pub counter_var: String,
    pub start: String,
    pub end: String,
    pub step: i64,
    pub value_list: String,
    pub body: Subqueue,
}

impl Default for ForLoop {
    fn default() -> Self {
        Self {
            style: ForStyle::Counter,
            counter_var: String::new(),
            start: String::new(),
            end: String::new(),
            step: 1,
            value_list: String::new(),
            body: Subqueue::new(),
        }
    }
}

impl ForLoop {
    pub fn counter(var: &str, start: &str, end: &str, step: i64, body: Subqueue) -> Self {
        Self {
            style: ForStyle::Counter,
            counter_var: var.trim().to_string(),
            start: start.trim().to_string(),
            end: end.trim().to_string(),
            step,
            body,
            ..Self::default()
        }
    }

    pub fn traversal(var: &str, value_list: &str, body: Subqueue) -> Self {
        Self {
            style: ForStyle::Traversal,
            counter_var: var.trim().to_string(),
            value_list: value_list.trim().to_string(),
            body,
            ..Self::default()
        }
    }

    pub fn free_text(body: Subqueue) -> Self {
        Self {
            style: ForStyle::FreeText,
            body,
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: Subqueue) -> Self {
        self.body = body;
        self
    }

    /// Compose the header text from the structured parameters.
    pub fn compose_text(&self, keywords: &ParserKeywords) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut push = |part: &str| {
            if !part.trim().is_empty() {
                parts.push(part.trim().to_string());
            }
        };
        match self.style {
            ForStyle::Counter => {
                push(keywords.get(KeywordKey::PreFor));
                push(&self.counter_var);
                push("<-");
                push(&self.start);
                push(keywords.get(KeywordKey::PostFor));
                push(&self.end);
                if self.step != 1 {
                    push(keywords.get(KeywordKey::StepFor));
                    push(&self.step.to_string());
                }
            }
            ForStyle::Traversal => {
                push(keywords.get(KeywordKey::PreForIn));
                push(&self.counter_var);
                push(keywords.get(KeywordKey::PostForIn));
                push(&self.value_list);
            }
            ForStyle::FreeText => {}
        }
        parts.join(" ")
    }

    /// Classify a loop header by its text: counting pattern first, then
    /// traversal pattern, otherwise free text. The body is left empty.
    pub fn classify(text: &str, keywords: &ParserKeywords) -> Self {
        let line = TokenLine::new(text.lines().next().unwrap_or(""));
        Self::match_counter(&line, keywords)
            .or_else(|| Self::match_traversal(&line, keywords))
            .unwrap_or_else(|| Self::free_text(Subqueue::new()))
    }

    fn match_counter(line: &TokenLine, keywords: &ParserKeywords) -> Option<Self> {
        let ignore_case = keywords.ignore_case;
        let pre = keyword_words(keywords.get(KeywordKey::PreFor));
        let post = keyword_words(keywords.get(KeywordKey::PostFor));
        let step_kw = keyword_words(keywords.get(KeywordKey::StepFor));
        if pre.is_empty() || post.is_empty() || !line.matches_at(0, &pre, ignore_case) {
            return None;
        }
        let var_at = pre.len();
        let var = line.word(var_at).filter(|word| is_identifier(word))?;
        if !matches!(line.word(var_at + 1), Some("<-") | Some(":=")) {
            return None;
        }
        let start_at = var_at + 2;
        let post_at = line.find(&post, start_at + 1, ignore_case)?;
        let end_at = post_at + post.len();
        let step_at = if step_kw.is_empty() {
            None
        } else {
            line.find(&step_kw, end_at + 1, ignore_case)
        };
        let end = line.text_between(end_at, step_at.unwrap_or(line.word_count()));
        if end.is_empty() {
            return None;
        }
        let step = match step_at {
            Some(at) => {
                let raw: String = line
                    .text_between(at + step_kw.len(), line.word_count())
                    .split_whitespace()
                    .collect();
                raw.parse::<i64>().ok()?
            }
            None => 1,
        };
        Some(Self::counter(
            var,
            &line.text_between(start_at, post_at),
            &end,
            step,
            Subqueue::new(),
        ))
    }

    fn match_traversal(line: &TokenLine, keywords: &ParserKeywords) -> Option<Self> {
        let ignore_case = keywords.ignore_case;
        let pre = keyword_words(keywords.get(KeywordKey::PreForIn));
        let post = keyword_words(keywords.get(KeywordKey::PostForIn));
        if pre.is_empty() || post.is_empty() || !line.matches_at(0, &pre, ignore_case) {
            return None;
        }
        let var_at = pre.len();
        let var = line.word(var_at).filter(|word| is_identifier(word))?;
        if !line.matches_at(var_at + 1, &post, ignore_case) {
            return None;
        }
        let list = line.text_between(var_at + 1 + post.len(), line.word_count());
        if list.is_empty() {
            return None;
        }
        Some(Self::traversal(var, &list, Subqueue::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("for i <- 1 to 10", ForStyle::Counter)]
    #[case("FOR i := a + 1 TO n - 1 BY -2", ForStyle::Counter)]
    #[case("foreach x in list", ForStyle::Traversal)]
    #[case("foreach x in {1, 2, 3}", ForStyle::Traversal)]
    #[case("for i <- 1 to 10 by k", ForStyle::FreeText)]
    #[case("loop over everything", ForStyle::FreeText)]
    fn test_classify(#[case] text: &str, #[case] style: ForStyle) {
        assert_eq!(ForLoop::classify(text, &ParserKeywords::default()).style, style);
    }

    #[test]
    fn test_classify_counter_parts() {
        let keywords = ParserKeywords::default();
        let parsed = ForLoop::classify("for i <- a + 1 to n - 1 by - 2", &keywords);
        assert_eq!(parsed.counter_var, "i");
        assert_eq!(parsed.start, "a + 1");
        assert_eq!(parsed.end, "n - 1");
        assert_eq!(parsed.step, -2);
        assert_eq!(parsed.compose_text(&keywords), "for i <- a + 1 to n - 1 by -2");
    }

    #[test]
    fn test_traversal_text() {
        let keywords = ParserKeywords::default();
        let parsed = ForLoop::traversal("x", "values", Subqueue::new());
        assert_eq!(parsed.compose_text(&keywords), "foreach x in values");
    }

    #[test]
    fn test_case_sensitive_keywords() {
        let mut keywords = ParserKeywords::default();
        keywords.ignore_case = false;
        assert_eq!(ForLoop::classify("FOR i <- 1 TO 3", &keywords).style, ForStyle::FreeText);
    }
}
