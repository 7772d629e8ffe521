use indexmap::IndexSet;

use super::element::Element;
use super::subqueue::Subqueue;
use crate::base::is_identifier;
use crate::config::KeywordSnapshot;

/// What a diagram represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RootKind {
    #[default]
    Program,
    Subroutine,
    Includable,
}

/// A diagram: program, subroutine or includable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Root {
    pub text: Vec<String>,
    pub comment: Vec<String>,
    pub kind: RootKind,
    pub author: String,
    pub created: String,
    pub modified_by: String,
    pub license_name: String,
    pub license_text: String,
    pub origin: String,
    /// Names of includable diagrams this one depends on.
    pub include_list: IndexSet<String>,
    /// Keywords in effect when the diagram was saved, if known.
    pub stored_keywords: Option<KeywordSnapshot>,
    pub children: Subqueue,
}

impl Root {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn program(name: &str) -> Self {
        let mut root = Self::new();
        root.set_text(name);
        root
    }

    pub fn subroutine(header: &str) -> Self {
        let mut root = Self::program(header);
        root.kind = RootKind::Subroutine;
        root
    }

    pub fn includable(name: &str) -> Self {
        let mut root = Self::program(name);
        root.kind = RootKind::Includable;
        root
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.lines().map(str::to_string).collect();
    }

    pub fn set_comment(&mut self, comment: &str) {
        self.comment = comment.lines().map(str::to_string).collect();
    }

    pub fn text_string(&self) -> String {
        self.text.join("\n")
    }

    pub fn is_subroutine(&self) -> bool {
        self.kind == RootKind::Subroutine
    }

    pub fn is_program(&self) -> bool {
        self.kind == RootKind::Program
    }

    pub fn is_includable(&self) -> bool {
        self.kind == RootKind::Includable
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Add an include dependency; duplicates are ignored.
    pub fn add_include(&mut self, name: &str) -> bool {
        let name = name.trim();
        !name.is_empty() && self.include_list.insert(name.to_string())
    }

    pub fn push(&mut self, element: Element) {
        self.children.push(element);
    }

    pub fn element_count(&self) -> usize {
        self.children.element_count()
    }

    pub fn walk(&self, visit: &mut dyn FnMut(&Element)) {
        self.children.walk(visit);
    }

    pub fn walk_mut(&mut self, visit: &mut dyn FnMut(&mut Element)) {
        self.children.walk_mut(visit);
    }

    /// Append to the origin trail.
    pub fn append_origin(&mut self, entry: &str) {
        self.origin.push_str(entry);
    }

    /// The routine or program name: the leading identifier of the header.
    pub fn method_name(&self) -> String {
        let header = self.text.first().map(String::as_str).unwrap_or("").trim();
        let head = header.split('(').next().unwrap_or("").trim();
        // "function foo" or "int foo" headers: take the last word before "("
        let name = head.split_whitespace().last().unwrap_or("");
        if is_identifier(name) {
            name.to_string()
        } else {
            String::new()
        }
    }

    /// The text between the outermost parentheses of the header.
    fn parameter_text(&self) -> Option<String> {
        let header = self.text.join(" ");
        let open = header.find('(')?;
        let mut depth = 0usize;
        for (offset, ch) in header[open..].char_indices() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(header[open + 1..open + offset].to_string());
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Formal parameter names.
    ///
    /// Accepts `a, b: integer; c: real` groups as well as `int a, float *b`
    /// lists and bare name lists.
    pub fn parameter_names(&self) -> Vec<String> {
        let Some(params) = self.parameter_text() else {
            return Vec::new();
        };
        let mut names = Vec::new();
        for group in split_top_level(&params, ';') {
            let group = group.trim();
            if group.is_empty() {
                continue;
            }
            if let Some((declared, _type)) = group.split_once(':') {
                let declared = declared.trim();
                let declared = ["var ", "const ", "out "]
                    .iter()
                    .find_map(|prefix| declared.strip_prefix(prefix))
                    .unwrap_or(declared);
                names.extend(
                    declared
                        .split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_string),
                );
            } else {
                for item in split_top_level(group, ',') {
                    if let Some(name) = last_identifier(&item) {
                        names.push(name);
                    }
                }
            }
        }
        names
    }

    /// `name#arity`, the key used for signature resolution.
    pub fn signature(&self) -> String {
        format!("{}#{}", self.method_name(), self.parameter_names().len())
    }
}

fn last_identifier(item: &str) -> Option<String> {
    let item = item.split('[').next().unwrap_or(item);
    let item = item.split('=').next().unwrap_or(item);
    item.split(|ch: char| ch.is_whitespace() || ch == '*' || ch == '&')
        .filter(|word| is_identifier(word))
        .last()
        .filter(|word| *word != "void")
        .map(str::to_string)
}

/// Split at `separator` where not nested in brackets or quotes.
pub(crate) fn split_top_level(text: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut current = String::new();
    for ch in text.chars() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
                current.push(ch);
                continue;
            }
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                current.push(ch);
                continue;
            }
            None => {}
        }
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ if ch == separator && depth == 0 => {
                parts.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    parts.push(current);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("foo(a, b)", "foo", 2)]
    #[case("bar()", "bar", 0)]
    #[case("compute(a, b: integer; c: real): real", "compute", 3)]
    #[case("add(int a, int b)", "add", 2)]
    #[case("swap(var x: integer; var y: integer)", "swap", 2)]
    #[case("fill(int *buf, int n)", "fill", 2)]
    #[case("noargs(void)", "noargs", 0)]
    fn test_signature(#[case] header: &str, #[case] name: &str, #[case] arity: usize) {
        let root = Root::subroutine(header);
        assert_eq!(root.method_name(), name);
        assert_eq!(root.parameter_names().len(), arity);
        assert_eq!(root.signature(), format!("{name}#{arity}"));
    }

    #[test]
    fn test_include_list_is_deduplicated() {
        let mut root = Root::program("main");
        assert!(root.add_include("Consts"));
        assert!(!root.add_include("Consts"));
        assert!(root.add_include("Types"));
        assert!(!root.add_include("  "));
        assert_eq!(root.include_list.iter().collect::<Vec<_>>(), vec!["Consts", "Types"]);
    }

    #[test]
    fn test_split_top_level_respects_nesting() {
        assert_eq!(split_top_level("a, f(b, c), \"x,y\"", ','), vec!["a", " f(b, c)", " \"x,y\""]);
    }
}
