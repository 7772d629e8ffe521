//! Legacy structogram editor files (`.stj`, `.strk`).
//!
//! ```xml
//! <struktogramm>
//!   <strelem typ="1" bgcolor="-1">
//!     <text>120;32;62;32;48</text>
//!     <fall><strelem typ="0"><text>...</text></strelem></fall>
//!     <fall></fall>
//!   </strelem>
//! </struktogramm>
//! ```
//!
//! Texts are stored as `;`-separated ISO-8859-1 character codes. The files
//! carry no program name; [`read_path`](super::read_path) names the root
//! after the file.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::format::{end_tag, start_tag};
use super::frames::{SlotKind, TreeBuilder};
use super::{DiagramFormat, InterchangeError};
use crate::config::ParserKeywords;
use crate::diagram::{CaseBranches, Color, Element, ElementKind, ForLoop, Root, Subqueue};

/// Legacy structogram format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stj;

impl DiagramFormat for Stj {
    fn name(&self) -> &'static str {
        "Struktogrammeditor"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["stj", "strk"]
    }

    fn read(&self, input: &[u8], _keywords: &ParserKeywords) -> Result<Root, InterchangeError> {
        StjReader::default().read(input)
    }

    fn validate(&self, input: &[u8]) -> Result<(), InterchangeError> {
        if input.windows(13).any(|window| window == b"<struktogramm") {
            Ok(())
        } else {
            Err(InterchangeError::missing_element("struktogramm"))
        }
    }
}

/// What a start tag opened, so its end tag can close it.
#[derive(Debug, Clone, Copy)]
enum Open {
    Root,
    Element(&'static str),
    Slot(SlotKind),
    Text,
    Other,
}

#[derive(Default)]
struct StjReader {
    builder: Option<TreeBuilder>,
    finished: Option<Root>,
    open: Vec<Open>,
    /// Depth inside an element of unknown type.
    skipping: usize,
}

impl StjReader {
    fn read(mut self, input: &[u8]) -> Result<Root, InterchangeError> {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => self.handle_start(e)?,
                Ok(Event::Empty(ref e)) => {
                    self.handle_start(e)?;
                    self.handle_end()?;
                }
                Ok(Event::End(ref e)) => {
                    end_tag(e)?;
                    self.handle_end()?;
                }
                Ok(Event::Text(ref e)) => {
                    let text = e
                        .unescape()
                        .map_err(|e| InterchangeError::xml(format!("Text error: {e}")))?;
                    self.handle_text(text.trim())?;
                }
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

        match (self.finished, self.builder) {
            (Some(root), None) => Ok(root),
            (_, Some(_)) => Err(InterchangeError::malformed("struktogramm", "unexpected end of file")),
            (None, None) => Err(InterchangeError::missing_element("struktogramm")),
        }
    }

    fn builder(&mut self, tag: &str) -> Result<&mut TreeBuilder, InterchangeError> {
        self.builder
            .as_mut()
            .ok_or_else(|| InterchangeError::malformed(tag, "outside of <struktogramm>"))
    }

    fn handle_start(&mut self, e: &BytesStart<'_>) -> Result<(), InterchangeError> {
        let (tag, attributes) = start_tag(e)?;
        if self.skipping > 0 {
            self.skipping += 1;
            return Ok(());
        }
        let attribute = |name: &str| {
            attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.trim())
        };
        let open = match tag.as_str() {
            "struktogramm" => {
                if self.builder.is_some() || self.finished.is_some() {
                    return Err(InterchangeError::malformed(tag.as_str(), "nested or repeated root"));
                }
                let mut builder = TreeBuilder::new(Root::new());
                builder.open_slot(SlotKind::Children)?;
                self.builder = Some(builder);
                Open::Root
            }
            "strelem" => {
                let code = attribute("typ").and_then(|code| code.parse::<i32>().ok());
                let Some((name, mut element)) = code.and_then(element_for) else {
                    tracing::warn!(?code, "unknown element type, element skipped");
                    self.skipping = 1;
                    return Ok(());
                };
                element.color = match attribute("bgcolor") {
                    Some(color) => parse_color(color)?,
                    None => None,
                };
                self.builder(&tag)?.open_element(name, element)?;
                Open::Element(name)
            }
            "fall" => {
                let selector = match attribute("fallname") {
                    Some(encoded) => decode_text(encoded)?.join(","),
                    None => "???".to_string(),
                };
                let builder = self.builder(&tag)?;
                let kind = builder.current_element_mut().map(|element| &element.kind);
                let alternative = matches!(kind, Some(ElementKind::Alternative { .. }));
                let case = matches!(kind, Some(ElementKind::Case(_)));
                let slot = if alternative && builder.true_branch_closed() {
                    SlotKind::False
                } else if alternative {
                    SlotKind::True
                } else if case {
                    builder.add_selector(selector)?;
                    SlotKind::Case
                } else {
                    return Err(InterchangeError::malformed(tag.as_str(), "not inside an alternative or case"));
                };
                builder.open_slot(slot)?;
                Open::Slot(slot)
            }
            "schleifeninhalt" => {
                let builder = self.builder(&tag)?;
                let slot = builder
                    .current_element_mut()
                    .and_then(|element| SlotKind::loop_slot(&element.kind))
                    .ok_or_else(|| InterchangeError::malformed(tag.as_str(), "not inside a loop"))?;
                builder.open_slot(slot)?;
                Open::Slot(slot)
            }
            "text" => Open::Text,
            _ => Open::Other,
        };
        self.open.push(open);
        Ok(())
    }

    fn handle_end(&mut self) -> Result<(), InterchangeError> {
        if self.skipping > 0 {
            self.skipping -= 1;
            return Ok(());
        }
        match self.open.pop() {
            Some(Open::Root) => {
                let mut builder = self
                    .builder
                    .take()
                    .ok_or_else(|| InterchangeError::malformed("struktogramm", "close without an open root"))?;
                builder.close_slot(SlotKind::Children)?;
                self.finished = Some(builder.finish()?);
            }
            Some(Open::Element(name)) => self.builder(name)?.close_element(name)?,
            Some(Open::Slot(slot)) => self.builder(slot.tag())?.close_slot(slot)?,
            Some(Open::Text | Open::Other) | None => {}
        }
        Ok(())
    }

    fn handle_text(&mut self, text: &str) -> Result<(), InterchangeError> {
        if self.skipping > 0 || text.is_empty() || !matches!(self.open.last(), Some(Open::Text)) {
            return Ok(());
        }
        let lines = decode_text(text)?;
        let Some(element) = self.builder.as_mut().and_then(TreeBuilder::current_element_mut) else {
            return Ok(());
        };
        if matches!(element.kind, ElementKind::Forever { .. }) {
            element.comment = lines;
        } else {
            element.text = lines;
        }
        Ok(())
    }
}

/// Element for a type code, with the tag name used for diagnostics.
fn element_for(code: i32) -> Option<(&'static str, Element)> {
    Some(match code {
        0 => ("instruction", Element::instruction("")),
        1 => ("alternative", Element::alternative("", Subqueue::new(), Subqueue::new())),
        2 => ("case", Element::case("", CaseBranches::new())),
        3 => ("for", Element::for_loop("", ForLoop::free_text(Subqueue::new()))),
        4 => ("while", Element::while_loop("", Subqueue::new())),
        5 => (
            "repeat",
            Element::repeat("", Subqueue::new()).with_comment("The condition is likely to be negated"),
        ),
        6 => ("forever", Element::forever(Subqueue::new())),
        7 => ("jump", Element::jump("")),
        8 => ("call", Element::call("")),
        _ => return None,
    })
}

/// Decimal, `#rrggbb` or `0xrrggbb`; `-1` and empty mean unset.
fn parse_color(value: &str) -> Result<Option<Color>, InterchangeError> {
    if value.is_empty() || value == "-1" {
        return Ok(None);
    }
    let rgb = match value.strip_prefix('#').or_else(|| value.strip_prefix("0x")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse::<u32>(),
    }
    .map_err(|_| InterchangeError::invalid_attribute(format!("bgcolor {value:?}")))?;
    let [_, r, g, b] = rgb.to_be_bytes();
    Ok(Some(Color::rgb(r, g, b)).filter(|color| *color != Color::WHITE))
}

/// Decode `;`-separated ISO-8859-1 codes into lines.
fn decode_text(encoded: &str) -> Result<Vec<String>, InterchangeError> {
    let mut text = String::new();
    for code in encoded.split(';').map(str::trim).filter(|code| !code.is_empty()) {
        let byte = code
            .parse::<i16>()
            .ok()
            .filter(|code| (-128..=255).contains(code))
            .ok_or_else(|| InterchangeError::encoding(format!("invalid character code {code:?}")))?;
        text.push(char::from(byte as u8));
    }
    Ok(text.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn encode(text: &str) -> String {
        text.chars().map(|c| (c as u32).to_string()).collect::<Vec<_>>().join(";")
    }

    fn read(xml: &str) -> Result<Root, InterchangeError> {
        Stj.read(xml.as_bytes(), &ParserKeywords::default())
    }

    #[rstest]
    #[case("120;32;60;45;32;49", &["x <- 1"])]
    #[case("97;10;98", &["a", "b"])]
    #[case("71;114;246;223;101", &["Größe"])]
    #[case("71;114;-10;-33;101", &["Größe"])]
    #[case("", &[])]
    fn test_decode_text(#[case] encoded: &str, #[case] expected: &[&str]) {
        assert_eq!(decode_text(encoded).unwrap(), expected);
    }

    #[test]
    fn test_decode_text_rejects_garbage() {
        assert!(matches!(decode_text("65;x").unwrap_err(), InterchangeError::Encoding(_)));
        assert!(decode_text("300").is_err());
    }

    #[rstest]
    #[case("-1", None)]
    #[case("", None)]
    #[case("16777215", None)]
    #[case("16769279", Some(Color::CONST))]
    #[case("#e0ffe0", Some(Color::DECL))]
    #[case("0xe0ffff", Some(Color::GLOBAL))]
    fn test_parse_color(#[case] value: &str, #[case] expected: Option<Color>) {
        assert_eq!(parse_color(value).unwrap(), expected);
    }

    #[test]
    fn test_read_structogram() {
        let xml = format!(
            r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<struktogramm>
  <strelem typ="0" bgcolor="-1"><text>{}</text></strelem>
  <strelem typ="1" bgcolor="16769279">
    <text>{}</text>
    <fall><strelem typ="8"><text>{}</text></strelem></fall>
    <fall><strelem typ="7"><text>{}</text></strelem></fall>
  </strelem>
  <strelem typ="2">
    <text>{}</text>
    <fall fallname="{}"><strelem typ="0"><text>{}</text></strelem></fall>
    <fall fallname="{}"></fall>
  </strelem>
  <strelem typ="5"><text>{}</text><schleifeninhalt><strelem typ="0"><text>{}</text></strelem></schleifeninhalt></strelem>
  <strelem typ="6"><text>{}</text><schleifeninhalt></schleifeninhalt></strelem>
  <strelem typ="42"><text>{}</text><fall/></strelem>
</struktogramm>"#,
            encode("x <- 1"),
            encode("x > 0"),
            encode("show(x)"),
            encode("leave"),
            encode("n"),
            encode("1\n2"),
            encode("a <- 1"),
            encode("sonst"),
            encode("x = 0"),
            encode("x <- x - 1"),
            encode("main loop"),
            encode("ignored"),
        );
        let root = read(&xml).unwrap();
        assert!(root.text.is_empty());

        let elements = root.children.elements();
        assert_eq!(elements.len(), 5);
        assert_eq!(elements[0].text, ["x <- 1"]);
        assert_eq!(elements[0].color, None);

        let ElementKind::Alternative { on_true, on_false } = &elements[1].kind else {
            panic!("expected alternative");
        };
        assert_eq!(elements[1].color, Some(Color::CONST));
        assert_eq!(on_true.elements()[0].kind, ElementKind::Call);
        assert_eq!(on_false.elements()[0].text, ["leave"]);

        let ElementKind::Case(branches) = &elements[2].kind else {
            panic!("expected case");
        };
        assert_eq!(elements[2].text, ["n"]);
        assert_eq!(branches.selectors(), ["1,2", "sonst"]);
        assert_eq!(branches.branches()[0].len(), 1);

        assert_eq!(elements[3].text, ["x = 0"]);
        assert_eq!(elements[3].comment, ["The condition is likely to be negated"]);
        assert_eq!(elements[3].subqueues()[0].len(), 1);

        assert!(elements[4].text.is_empty());
        assert_eq!(elements[4].comment, ["main loop"]);
    }

    #[test]
    fn test_fall_outside_branching_element() {
        let xml = r#"<struktogramm><strelem typ="4"><fall/></strelem></struktogramm>"#;
        assert!(read(xml).unwrap_err().is_malformed());
    }

    #[test]
    fn test_third_fall_of_alternative() {
        let xml = r#"<struktogramm><strelem typ="1"><fall/><fall/><fall/></strelem></struktogramm>"#;
        assert!(read(xml).unwrap_err().is_malformed());
    }
}
