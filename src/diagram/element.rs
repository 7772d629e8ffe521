//! Diagram elements.
//!
//! [`Element`] holds what every element has (text, comment, color,
//! disabled flag); [`ElementKind`] is the closed set of variants and owns
//! the nested [`Subqueue`]s of structured elements.

use super::color::Color;
use super::for_loop::ForLoop;
use super::subqueue::Subqueue;
use crate::config::{KeywordKey, ParserKeywords};

/// A diagram element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub text: Vec<String>,
    pub comment: Vec<String>,
    pub color: Option<Color>,
    pub disabled: bool,
    pub kind: ElementKind,
}

/// Element variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Instruction,
    Jump,
    Call,
    Alternative { on_true: Subqueue, on_false: Subqueue },
    While { body: Subqueue },
    Repeat { body: Subqueue },
    Forever { body: Subqueue },
    For(ForLoop),
    Case(CaseBranches),
    Parallel { threads: Vec<Subqueue> },
}

/// Selector lines and branches of a case element.
///
/// Selectors and branches are only ever added in pairs, so both lists have
/// the same length. A last selector of `%` means "no default branch".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseBranches {
    selectors: Vec<String>,
    branches: Vec<Subqueue>,
}

impl CaseBranches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, selector: impl Into<String>, branch: Subqueue) {
        self.selectors.push(selector.into());
        self.branches.push(branch);
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    pub fn branches(&self) -> &[Subqueue] {
        &self.branches
    }

    pub fn branches_mut(&mut self) -> &mut [Subqueue] {
        &mut self.branches
    }

    pub fn selector_mut(&mut self, index: usize) -> Option<&mut String> {
        self.selectors.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Subqueue)> {
        self.selectors
            .iter()
            .map(String::as_str)
            .zip(self.branches.iter())
    }

    /// Whether the last branch is a real default branch.
    pub fn has_default(&self) -> bool {
        self.selectors.last().is_some_and(|last| last.trim() != "%")
    }

    /// Remove a (selector, branch) pair.
    pub fn remove(&mut self, index: usize) -> (String, Subqueue) {
        (self.selectors.remove(index), self.branches.remove(index))
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Subqueue>) {
        (self.selectors, self.branches)
    }
}

fn lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').map(|line| line.trim_end_matches('\r').to_string()).collect()
}

impl Element {
    pub fn new(kind: ElementKind, text: &str) -> Self {
        Self {
            text: lines(text),
            comment: Vec::new(),
            color: None,
            disabled: false,
            kind,
        }
    }

    pub fn instruction(text: &str) -> Self {
        Self::new(ElementKind::Instruction, text)
    }

    pub fn jump(text: &str) -> Self {
        Self::new(ElementKind::Jump, text)
    }

    pub fn call(text: &str) -> Self {
        Self::new(ElementKind::Call, text)
    }

    pub fn alternative(condition: &str, on_true: Subqueue, on_false: Subqueue) -> Self {
        Self::new(ElementKind::Alternative { on_true, on_false }, condition)
    }

    pub fn while_loop(condition: &str, body: Subqueue) -> Self {
        Self::new(ElementKind::While { body }, condition)
    }

    pub fn repeat(condition: &str, body: Subqueue) -> Self {
        Self::new(ElementKind::Repeat { body }, condition)
    }

    pub fn forever(body: Subqueue) -> Self {
        Self::new(ElementKind::Forever { body }, "")
    }

    pub fn for_loop(text: &str, for_loop: ForLoop) -> Self {
        Self::new(ElementKind::For(for_loop), text)
    }

    /// A case element with `discriminator` and (selector, branch) pairs.
    pub fn case(discriminator: &str, branches: CaseBranches) -> Self {
        Self::new(ElementKind::Case(branches), discriminator)
    }

    /// A parallel section; its text is the thread count.
    pub fn parallel(threads: Vec<Subqueue>) -> Self {
        let count = threads.len().to_string();
        Self::new(ElementKind::Parallel { threads }, &count)
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.set_comment(comment);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = lines(text);
    }

    pub fn set_comment(&mut self, comment: &str) {
        self.comment = lines(comment);
    }

    /// The text lines joined with newlines.
    pub fn text_string(&self) -> String {
        self.text.join("\n")
    }

    pub fn comment_string(&self) -> String {
        self.comment.join("\n")
    }

    /// Text as shown in the diagram; a case adds its selector lines.
    pub fn display_text(&self) -> Vec<String> {
        match &self.kind {
            ElementKind::Case(branches) => self
                .text
                .iter()
                .cloned()
                .chain(branches.selectors().iter().cloned())
                .collect(),
            _ => self.text.clone(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ElementKind::Instruction => "Instruction",
            ElementKind::Jump => "Jump",
            ElementKind::Call => "Call",
            ElementKind::Alternative { .. } => "Alternative",
            ElementKind::While { .. } => "While",
            ElementKind::Repeat { .. } => "Repeat",
            ElementKind::Forever { .. } => "Forever",
            ElementKind::For(_) => "For",
            ElementKind::Case(_) => "Case",
            ElementKind::Parallel { .. } => "Parallel",
        }
    }

    pub fn is_instruction(&self) -> bool {
        matches!(self.kind, ElementKind::Instruction)
    }

    /// Owned queues in display order.
    pub fn subqueues(&self) -> Vec<&Subqueue> {
        match &self.kind {
            ElementKind::Instruction | ElementKind::Jump | ElementKind::Call => Vec::new(),
            ElementKind::Alternative { on_true, on_false } => vec![on_true, on_false],
            ElementKind::While { body } | ElementKind::Repeat { body } | ElementKind::Forever { body } => {
                vec![body]
            }
            ElementKind::For(for_loop) => vec![&for_loop.body],
            ElementKind::Case(branches) => branches.branches().iter().collect(),
            ElementKind::Parallel { threads } => threads.iter().collect(),
        }
    }

    pub fn subqueues_mut(&mut self) -> Vec<&mut Subqueue> {
        match &mut self.kind {
            ElementKind::Instruction | ElementKind::Jump | ElementKind::Call => Vec::new(),
            ElementKind::Alternative { on_true, on_false } => vec![on_true, on_false],
            ElementKind::While { body } | ElementKind::Repeat { body } | ElementKind::Forever { body } => {
                vec![body]
            }
            ElementKind::For(for_loop) => vec![&mut for_loop.body],
            ElementKind::Case(branches) => branches.branches_mut().iter_mut().collect(),
            ElementKind::Parallel { threads } => threads.iter_mut().collect(),
        }
    }

    /// The body of a loop element.
    pub fn loop_body_mut(&mut self) -> Option<&mut Subqueue> {
        match &mut self.kind {
            ElementKind::While { body } | ElementKind::Repeat { body } | ElementKind::Forever { body } => {
                Some(body)
            }
            ElementKind::For(for_loop) => Some(&mut for_loop.body),
            _ => None,
        }
    }

    /// Whether this is a jump leaving the enclosing loop or case.
    ///
    /// An empty jump text means "leave" as well.
    pub fn is_leave(&self, keywords: &ParserKeywords) -> bool {
        if !matches!(self.kind, ElementKind::Jump) {
            return false;
        }
        let text = self.text_string();
        let text = text.trim();
        let leave = keywords.get(KeywordKey::PreLeave);
        text.is_empty()
            || starts_with_keyword(text, leave, keywords.ignore_case)
            || text == "break"
    }
}

/// Whether `text` begins with the whole word `keyword`.
pub(crate) fn starts_with_keyword(text: &str, keyword: &str, ignore_case: bool) -> bool {
    let keyword = keyword.trim();
    if keyword.is_empty() || text.len() < keyword.len() || !text.is_char_boundary(keyword.len()) {
        return false;
    }
    let (head, tail) = text.split_at(keyword.len());
    let head_matches = if ignore_case {
        head.eq_ignore_ascii_case(keyword) || head.to_lowercase() == keyword.to_lowercase()
    } else {
        head == keyword
    };
    head_matches && !crate::base::lexical::starts_with_word_char(tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_counts_stay_in_sync() {
        let mut branches = CaseBranches::new();
        branches.push("1, 2", Subqueue::new());
        branches.push("%", Subqueue::new());
        let case = Element::case("x", branches);
        let ElementKind::Case(branches) = &case.kind else {
            panic!("not a case");
        };
        assert_eq!(branches.len(), branches.selectors().len());
        assert!(!branches.has_default());
        assert_eq!(case.display_text(), vec!["x", "1, 2", "%"]);
    }

    #[test]
    fn test_parallel_text_is_thread_count() {
        let element = Element::parallel(vec![Subqueue::new(), Subqueue::new(), Subqueue::new()]);
        assert_eq!(element.text, vec!["3"]);
        assert_eq!(element.subqueues().len(), 3);
    }

    #[test]
    fn test_multi_line_text() {
        let element = Element::instruction("a <- 1\r\nb <- 2");
        assert_eq!(element.text, vec!["a <- 1", "b <- 2"]);
        assert!(Element::instruction("").text.is_empty());
    }

    #[test]
    fn test_leave_detection() {
        let keywords = ParserKeywords::default();
        assert!(Element::jump("").is_leave(&keywords));
        assert!(Element::jump("leave").is_leave(&keywords));
        assert!(!Element::jump("return 5").is_leave(&keywords));
        assert!(!Element::jump("leaveNow").is_leave(&keywords));
        assert!(!Element::instruction("leave").is_leave(&keywords));
    }
}
