//! Tagged diagram format (`.nsd`).
//!
//! ## Structure
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <root text="&#34;main&#34;" comment="" type="program" version="3.30" preFor="for" postFor="to">
//!   <children>
//!     <alternative text="&#34;x &gt; 0&#34;" comment="" color="ffffff">
//!       <qTrue><instruction text="&#34;y &lt;- 1&#34;"></instruction></qTrue>
//!       <qFalse></qFalse>
//!     </alternative>
//!   </children>
//! </root>
//! ```
//!
//! Keyword attributes on the root are a snapshot of the keywords the file
//! was saved with. They are trusted from version `3.25-01` on; loaded text
//! is then refactored to the keywords of the reading session.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::format::{end_tag, start_tag};
use super::frames::{SlotKind, TreeBuilder};
use super::{DiagramFormat, InterchangeError};
use crate::config::{KeywordKey, KeywordSnapshot, ParserKeywords};
use crate::diagram::{CaseBranches, Color, Element, ElementKind, ForLoop, ForStyle, Root, RootKind, Subqueue};

/// First version whose keyword snapshot can be relied on.
const TRUSTED_SNAPSHOT_VERSION: &str = "3.25-01";

/// Tagged diagram format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nsd;

impl DiagramFormat for Nsd {
    fn name(&self) -> &'static str {
        "Structorizer"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["nsd"]
    }

    fn read(&self, input: &[u8], keywords: &ParserKeywords) -> Result<Root, InterchangeError> {
        NsdReader::new(keywords).read(input)
    }

    fn validate(&self, input: &[u8]) -> Result<(), InterchangeError> {
        if input.windows(5).any(|window| window == b"<root") {
            Ok(())
        } else {
            Err(InterchangeError::missing_element("root"))
        }
    }
}

/// Streaming reader state for one file.
struct NsdReader<'k> {
    keywords: &'k ParserKeywords,
    /// Keywords the file was written with, used to classify `for` headers.
    file_keywords: ParserKeywords,
    snapshot: KeywordSnapshot,
    trusted: bool,
    builder: Option<TreeBuilder>,
    finished: Option<Root>,
}

impl<'k> NsdReader<'k> {
    fn new(keywords: &'k ParserKeywords) -> Self {
        Self {
            keywords,
            file_keywords: keywords.clone(),
            snapshot: KeywordSnapshot::new(),
            trusted: false,
            builder: None,
            finished: None,
        }
    }

    fn read(mut self, input: &[u8]) -> Result<Root, InterchangeError> {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    self.handle_start(e)?;
                }
                Ok(Event::Empty(ref e)) => {
                    let tag = self.handle_start(e)?;
                    self.handle_end(&tag)?;
                }
                Ok(Event::End(ref e)) => self.handle_end(&end_tag(e)?)?,
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(InterchangeError::xml(format!(
                        "XML parse error at position {}: {e}",
                        reader.error_position()
                    )));
                }
                _ => {}
            }
            buf.clear();
        }

        let mut root = match (self.finished, self.builder) {
            (Some(root), None) => root,
            (_, Some(builder)) => {
                builder.finish()?;
                return Err(InterchangeError::malformed("root", "unexpected end of file"));
            }
            (None, None) => return Err(InterchangeError::missing_element("root")),
        };
        if !self.snapshot.is_empty() {
            root.stored_keywords = Some(self.snapshot);
            if self.trusted {
                let changed = root.refactor_keywords(self.keywords);
                tracing::debug!(changed, "keywords refactored");
            }
        }
        Ok(root)
    }

    /// Handle a start tag; returns the tag name.
    fn handle_start(&mut self, e: &BytesStart<'_>) -> Result<String, InterchangeError> {
        let (tag, attributes) = start_tag(e)?;
        if tag == "root" {
            if self.builder.is_some() || self.finished.is_some() {
                return Err(InterchangeError::malformed(tag, "nested or repeated root"));
            }
            let root = self.read_root(&attributes)?;
            self.builder = Some(TreeBuilder::new(root));
            return Ok(tag);
        }
        let element = match SlotKind::from_tag(&tag) {
            Some(_) => None,
            None => Some(self.read_element(&tag, &attributes)?),
        };
        let builder = self
            .builder
            .as_mut()
            .ok_or_else(|| InterchangeError::malformed(tag.as_str(), "outside of <root>"))?;
        match (SlotKind::from_tag(&tag), element) {
            (Some(slot), _) => builder.open_slot(slot)?,
            (None, Some(element)) => builder.open_element(&tag, element)?,
            (None, None) => {}
        }
        Ok(tag)
    }

    fn handle_end(&mut self, tag: &str) -> Result<(), InterchangeError> {
        if tag == "root" {
            let builder = self
                .builder
                .take()
                .ok_or_else(|| InterchangeError::malformed(tag, "close without an open root"))?;
            self.finished = Some(builder.finish()?);
            return Ok(());
        }
        let builder = self
            .builder
            .as_mut()
            .ok_or_else(|| InterchangeError::malformed(tag, "outside of <root>"))?;
        match SlotKind::from_tag(tag) {
            Some(slot) => builder.close_slot(slot),
            None => builder.close_element(tag),
        }
    }

    fn read_root(&mut self, attributes: &[(String, String)]) -> Result<Root, InterchangeError> {
        let mut root = Root::new();
        let mut version = String::new();
        for (key, value) in attributes {
            match key.as_str() {
                "text" => root.text = comma_text(value),
                "comment" => root.comment = comma_text(value),
                "type" => {
                    root.kind = match value.as_str() {
                        "sub" => RootKind::Subroutine,
                        "includable" => RootKind::Includable,
                        _ => RootKind::Program,
                    }
                }
                "author" => root.author = value.clone(),
                "created" => root.created = value.clone(),
                "changedby" => root.modified_by = value.clone(),
                "origin" => root.origin = value.clone(),
                "licenseName" => root.license_name = value.clone(),
                "license" => root.license_text = value.clone(),
                "includeList" => root.include_list.extend(comma_text(value)),
                "version" => version = value.clone(),
                "ignoreCase" => self.snapshot.ignore_case = Some(value == "true"),
                _ => {
                    if let Some(key) = KeywordKey::from_name(key) {
                        self.snapshot.insert(key, value.as_str());
                    }
                }
            }
        }
        self.trusted = version_at_least(&version, TRUSTED_SNAPSHOT_VERSION);
        if self.trusted {
            for (key, value) in self.snapshot.iter() {
                self.file_keywords.set(key, value);
            }
            if let Some(ignore_case) = self.snapshot.ignore_case {
                self.file_keywords.ignore_case = ignore_case;
            }
        }
        tracing::debug!(version, trusted = self.trusted, "diagram root");
        Ok(root)
    }

    fn read_element(&self, tag: &str, attributes: &[(String, String)]) -> Result<Element, InterchangeError> {
        let kind = match tag {
            "instruction" => ElementKind::Instruction,
            "jump" => ElementKind::Jump,
            "call" => ElementKind::Call,
            "alternative" => ElementKind::Alternative {
                on_true: Subqueue::new(),
                on_false: Subqueue::new(),
            },
            "while" => ElementKind::While { body: Subqueue::new() },
            "repeat" => ElementKind::Repeat { body: Subqueue::new() },
            "forever" => ElementKind::Forever { body: Subqueue::new() },
            "case" => ElementKind::Case(CaseBranches::new()),
            "parallel" => ElementKind::Parallel { threads: Vec::new() },
            "for" => ElementKind::For(ForLoop::free_text(Subqueue::new())),
            _ => return Err(InterchangeError::invalid_element(format!("unknown element <{tag}>"))),
        };
        let mut element = Element::new(kind, "");
        for (key, value) in attributes {
            match key.as_str() {
                "text" => element.text = comma_text(value),
                "comment" => element.comment = comma_text(value),
                "color" => element.color = Color::parse_stored(value),
                "disabled" => element.disabled = value == "1" || value == "true",
                _ => {}
            }
        }
        if let ElementKind::For(for_loop) = &mut element.kind {
            *for_loop = self.read_for_loop(&element.text, attributes);
        }
        Ok(element)
    }

    /// Structured attributes first, then the header text.
    fn read_for_loop(&self, text: &[String], attributes: &[(String, String)]) -> ForLoop {
        let attribute = |name: &str| {
            attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };
        let header = text.first().map(String::as_str).unwrap_or("");
        let counter_var = attribute("counterVar");
        let step = attribute("stepConst").map(|step| {
            step.trim().parse::<i64>().unwrap_or_else(|_| {
                tracing::warn!(step, "invalid step constant");
                1
            })
        });
        let counter = || {
            ForLoop::counter(
                counter_var.unwrap_or(""),
                attribute("startValue").unwrap_or(""),
                attribute("endValue").unwrap_or(""),
                step.unwrap_or(1),
                Subqueue::new(),
            )
        };
        match attribute("style").and_then(ForStyle::from_name) {
            Some(ForStyle::Counter) => counter(),
            Some(ForStyle::Traversal) => match ForLoop::classify(header, &self.file_keywords) {
                classified if classified.style == ForStyle::Traversal => classified,
                _ => ForLoop::traversal(counter_var.unwrap_or(""), "", Subqueue::new()),
            },
            Some(ForStyle::FreeText) => ForLoop::free_text(Subqueue::new()),
            None if counter_var.is_some() => counter(),
            None => ForLoop::classify(header, &self.file_keywords),
        }
    }
}

/// Parse quoted comma text: `"a","b ""quoted"""`.
///
/// Unquoted items are taken as they are; an empty value is no lines.
pub fn comma_text(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                chars.next();
                current.push('"');
            }
            '"' => quoted = !quoted,
            ',' if !quoted => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);
    items
}

/// Compare dotted versions numerically, suffix digits included.
fn version_at_least(version: &str, minimum: &str) -> bool {
    fn numbers(version: &str) -> Vec<u64> {
        version
            .split(|c: char| !c.is_ascii_digit())
            .filter(|run| !run.is_empty())
            .filter_map(|run| run.parse().ok())
            .collect()
    }
    let version = numbers(version);
    !version.is_empty() && version >= numbers(minimum)
}
