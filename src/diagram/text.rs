//! Breaking long element text lines.

use super::element::Element;
use super::root::Root;
use crate::base::split_lexically;

/// Break `line` at blanks so no piece exceeds `max_len` chars, where a
/// single token permits. Broken lines end with a continuation backslash.
pub fn break_line(line: &str, max_len: usize) -> Vec<String> {
    if max_len == 0 || line.chars().count() <= max_len {
        return vec![line.to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for piece in split_lexically(line, true) {
        let is_blank = piece.trim().is_empty();
        let fits = current.chars().count() + piece.chars().count() <= max_len;
        if !fits && !is_blank && !current.trim().is_empty() && current.ends_with(char::is_whitespace) {
            lines.push(format!("{} \\", current.trim_end()));
            current.clear();
        }
        if is_blank && current.is_empty() && !lines.is_empty() {
            continue;
        }
        current.push_str(&piece);
    }
    if !current.trim().is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

impl Element {
    /// Break text lines longer than `max_len`; returns whether anything changed.
    pub fn break_text_lines(&mut self, max_len: usize) -> bool {
        let broken: Vec<String> = self.text.iter().flat_map(|line| break_line(line, max_len)).collect();
        let changed = broken != self.text;
        self.text = broken;
        changed
    }
}

impl Root {
    /// Break long text lines in every element of the diagram.
    pub fn break_text_lines(&mut self, max_len: usize) -> usize {
        if max_len == 0 {
            return 0;
        }
        let mut changed = 0;
        self.walk_mut(&mut |element| {
            if element.break_text_lines(max_len) {
                changed += 1;
            }
        });
        changed
    }
}
