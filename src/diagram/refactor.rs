//! Keyword refactoring.
//!
//! A diagram saved under another keyword configuration carries the old
//! keywords in its text (`solange x > 0` instead of `while x > 0`). The
//! pass below swaps them for the current ones, token sequence by token
//! sequence, and then records the current set as the stored one, so a
//! second pass with the same target finds nothing left to do.

use super::element::{Element, ElementKind};
use super::for_loop::ForStyle;
use super::root::Root;
use crate::base::lexical::{TokenLine, keyword_words};
use crate::config::{KeywordKey, ParserKeywords};

/// Where a keyword may occur in a text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Start,
    End,
    Anywhere,
}

/// One keyword replacement.
#[derive(Debug, Clone)]
pub struct Replacement {
    pub key: KeywordKey,
    old: Vec<String>,
    new: String,
}

impl Replacement {
    pub fn new(key: KeywordKey, old: &str, new: &str) -> Self {
        Self {
            key,
            old: keyword_words(old),
            new: new.trim().to_string(),
        }
    }
}

/// The keywords an element of this kind may contain.
pub fn relevant_keys(element: &Element) -> &'static [(KeywordKey, Placement)] {
    use KeywordKey::*;
    use Placement::*;
    match &element.kind {
        ElementKind::Instruction => &[(Input, Start), (Output, Start), (PreReturn, Start)],
        ElementKind::Jump => &[(PreLeave, Start), (PreReturn, Start), (PreExit, Start), (PreThrow, Start)],
        ElementKind::Call => &[(PreImport, Start)],
        ElementKind::Alternative { .. } => &[(PreAlt, Start), (PostAlt, End)],
        ElementKind::Case(_) => &[(PreCase, Start), (PostCase, End)],
        ElementKind::While { .. } => &[(PreWhile, Start), (PostWhile, End)],
        ElementKind::Repeat { .. } => &[(PreRepeat, Start), (PostRepeat, End)],
        ElementKind::For(for_loop) if for_loop.style == ForStyle::Traversal => {
            &[(PreForIn, Start), (PostForIn, Anywhere)]
        }
        ElementKind::For(_) => &[
            (PreFor, Start),
            (PostFor, Anywhere),
            (StepFor, Anywhere),
            (PreForIn, Start),
            (PostForIn, Anywhere),
        ],
        ElementKind::Forever { .. } | ElementKind::Parallel { .. } => &[],
    }
}

/// Apply one replacement to a line.
pub fn refactor_line(line: &str, replacement: &Replacement, placement: Placement, ignore_case: bool) -> String {
    if replacement.old.is_empty() {
        return line.to_string();
    }
    let mut tokens = TokenLine::new(line);
    let width = replacement.old.len();
    match placement {
        Placement::Start => {
            if tokens.matches_at(0, &replacement.old, ignore_case) {
                tokens.replace_words(0, width, &replacement.new);
            }
        }
        Placement::End => {
            if let Some(at) = tokens.word_count().checked_sub(width) {
                if tokens.matches_at(at, &replacement.old, ignore_case) {
                    tokens.replace_words(at, width, &replacement.new);
                }
            }
        }
        Placement::Anywhere => {
            let new_width = keyword_words(&replacement.new).len();
            let mut from = 0;
            while let Some(at) = tokens.find(&replacement.old, from, ignore_case) {
                tokens.replace_words(at, width, &replacement.new);
                from = at + new_width;
            }
        }
    }
    tokens.text()
}

impl Element {
    /// Apply the replacements relevant to this element's kind.
    ///
    /// Only the element's own text is touched; nested queues are visited by
    /// the caller.
    pub fn refactor_keywords(&mut self, replacements: &[Replacement], ignore_case: bool) -> bool {
        let keys = relevant_keys(self);
        let mut changed = false;
        for line in &mut self.text {
            let mut updated = line.clone();
            for replacement in replacements {
                if let Some((_, placement)) = keys.iter().find(|(key, _)| *key == replacement.key) {
                    updated = refactor_line(&updated, replacement, *placement, ignore_case);
                }
            }
            if updated != *line {
                *line = updated;
                changed = true;
            }
        }
        changed
    }
}

impl Root {
    /// Rewrite element text from the stored keyword set to `target`.
    ///
    /// Does nothing without a stored set. Returns the number of elements
    /// whose text changed.
    pub fn refactor_keywords(&mut self, target: &ParserKeywords) -> usize {
        let Some(stored) = &self.stored_keywords else {
            return 0;
        };
        let ignore_case = stored.ignore_case.unwrap_or(target.ignore_case);
        let replacements: Vec<Replacement> = stored
            .changed_keys(target)
            .into_iter()
            .filter_map(|key| {
                let old = stored.get(key)?;
                Some(Replacement::new(key, old, target.get(key)))
            })
            .collect();
        let mut changed = 0;
        if !replacements.is_empty() {
            self.walk_mut(&mut |element| {
                if element.refactor_keywords(&replacements, ignore_case) {
                    changed += 1;
                }
            });
            tracing::debug!(
                root = %self.method_name(),
                keys = replacements.len(),
                changed,
                "refactored keywords"
            );
        }
        self.stored_keywords = Some(target.snapshot());
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeywordSnapshot;
    use crate::diagram::{ForLoop, Subqueue};

    fn german() -> KeywordSnapshot {
        let mut snapshot = ParserKeywords::default().snapshot();
        snapshot.insert(KeywordKey::PreWhile, "solange");
        snapshot.insert(KeywordKey::PostFor, "bis");
        snapshot.insert(KeywordKey::Input, "EINGABE");
        snapshot
    }

    #[test]
    fn test_start_placement_only_at_line_start() {
        let replacement = Replacement::new(KeywordKey::PreWhile, "solange", "while");
        assert_eq!(
            refactor_line("solange x > 0", &replacement, Placement::Start, true),
            "while x > 0"
        );
        assert_eq!(
            refactor_line("x > solange", &replacement, Placement::Start, true),
            "x > solange"
        );
    }

    #[test]
    fn test_anywhere_replaces_all() {
        let replacement = Replacement::new(KeywordKey::PostFor, "bis", "to");
        assert_eq!(
            refactor_line("for i <- 1 BIS 10", &replacement, Placement::Anywhere, true),
            "for i <- 1 to 10"
        );
        assert_eq!(
            refactor_line("for i <- 1 BIS 10", &replacement, Placement::Anywhere, false),
            "for i <- 1 BIS 10"
        );
    }

    #[test]
    fn test_root_refactoring_is_idempotent() {
        let mut root = Root::program("main");
        root.push(Element::instruction("EINGABE x"));
        root.push(Element::while_loop(
            "solange x > 0",
            Subqueue::from_elements(vec![Element::for_loop(
                "for i <- 1 bis x",
                ForLoop::counter("i", "1", "x", 1, Subqueue::new()),
            )]),
        ));
        root.stored_keywords = Some(german());

        let target = ParserKeywords::default();
        assert_eq!(root.refactor_keywords(&target), 3);
        let once = root.clone();
        assert_eq!(root.refactor_keywords(&target), 0);
        assert_eq!(root, once);

        let texts: Vec<String> = {
            let mut texts = Vec::new();
            root.walk(&mut |element| texts.push(element.text_string()));
            texts
        };
        assert_eq!(texts, vec!["INPUT x", "while x > 0", "for i <- 1 to x"]);
    }

    #[test]
    fn test_without_snapshot_nothing_changes() {
        let mut root = Root::program("main");
        root.push(Element::while_loop("solange x > 0", Subqueue::new()));
        let before = root.clone();
        assert_eq!(root.refactor_keywords(&ParserKeywords::default()), 0);
        assert_eq!(root, before);
    }
}
