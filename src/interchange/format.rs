//! Common trait for stored diagram formats.

use std::path::Path;

use super::{InterchangeError, Nsd, Sbd, Stj};
use crate::config::ParserKeywords;
use crate::diagram::Root;

/// Trait for stored diagram formats.
///
/// A format reads one file into one [`Root`]. Readers stream over the input
/// and build the tree through [`TreeBuilder`](super::TreeBuilder); they never
/// hold a parsed document tree.
pub trait DiagramFormat: Send + Sync {
    /// Human-readable name of the format.
    fn name(&self) -> &'static str;

    /// File extension(s) for this format, lower case.
    fn extensions(&self) -> &'static [&'static str];

    /// Read a diagram from bytes.
    ///
    /// `keywords` is the keyword set of the reading session: text loaded
    /// from a trusted keyword snapshot is refactored to it.
    fn read(&self, input: &[u8], keywords: &ParserKeywords) -> Result<Root, InterchangeError>;

    /// Quick check that the input looks like this format.
    fn validate(&self, input: &[u8]) -> Result<(), InterchangeError> {
        let _ = input;
        Ok(())
    }
}

static FORMATS: [&dyn DiagramFormat; 3] = [&Nsd, &Sbd, &Stj];

/// All built-in formats.
pub fn formats() -> &'static [&'static dyn DiagramFormat] {
    &FORMATS
}

/// The format responsible for `path`, by extension.
pub fn format_for_path(path: &Path) -> Option<&'static dyn DiagramFormat> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    FORMATS
        .iter()
        .copied()
        .find(|format| format.extensions().contains(&extension.as_str()))
}

/// Read the diagram stored at `path`.
///
/// A diagram without a name is named after the file stem. The reader and
/// the path are appended to the root's origin trail.
pub fn read_path(path: &Path, keywords: &ParserKeywords) -> Result<Root, InterchangeError> {
    let format = format_for_path(path)
        .ok_or_else(|| InterchangeError::Unsupported(format!("no diagram format for {}", path.display())))?;
    let input = std::fs::read(path)?;
    format.validate(&input)?;
    let mut root = format.read(&input, keywords)?;
    if root.text_string().trim().is_empty() {
        let stem = path.file_stem().map(|stem| stem.to_string_lossy()).unwrap_or_default();
        root.set_text(&stem.replace(['.', ' '], "_"));
    }
    root.append_origin(&format!(" / {}: \"{}\"", format.name(), path.display()));
    tracing::debug!(format = format.name(), path = %path.display(), "diagram read");
    Ok(root)
}

/// Decode file text as UTF-8, falling back to ISO-8859-1.
pub(super) fn decode_text(input: &[u8]) -> String {
    let input = input.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(input);
    match std::str::from_utf8(input) {
        Ok(text) => text.to_string(),
        Err(_) => input.iter().map(|&byte| char::from(byte)).collect(),
    }
}

/// Tag name and unescaped attributes of an XML start tag.
pub(super) fn start_tag(
    e: &quick_xml::events::BytesStart<'_>,
) -> Result<(String, Vec<(String, String)>), InterchangeError> {
    let name = e.name();
    let tag = std::str::from_utf8(name.as_ref())
        .map_err(|e| InterchangeError::xml(format!("Invalid tag name: {e}")))?
        .to_string();
    let mut attributes = Vec::new();
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| InterchangeError::xml(format!("Attribute error: {e}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| InterchangeError::xml(format!("Attribute key error: {e}")))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| InterchangeError::xml(format!("Attribute value error: {e}")))?
            .to_string();
        attributes.push((key, value));
    }
    Ok((tag, attributes))
}

pub(super) fn end_tag(e: &quick_xml::events::BytesEnd<'_>) -> Result<String, InterchangeError> {
    let name = e.name();
    std::str::from_utf8(name.as_ref())
        .map(str::to_string)
        .map_err(|e| InterchangeError::xml(format!("Invalid tag name: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[rstest]
    #[case("prog.nsd", Some("Structorizer"))]
    #[case("PROG.NSD", Some("Structorizer"))]
    #[case("old.sbd", Some("sbide"))]
    #[case("legacy.stj", Some("Struktogrammeditor"))]
    #[case("legacy.strk", Some("Struktogrammeditor"))]
    #[case("model.xmi", None)]
    #[case("noextension", None)]
    fn test_format_for_path(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(format_for_path(Path::new(path)).map(|format| format.name()), expected);
    }

    #[test]
    fn test_decode_text_falls_back_to_latin1() {
        assert_eq!(decode_text("größe".as_bytes()), "größe");
        assert_eq!(decode_text(b"gr\xf6\xdfe"), "größe");
        assert_eq!(decode_text(b"\xEF\xBB\xBFabc"), "abc");
    }

    #[test]
    fn test_read_path_names_root_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my first.prog.sbd");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{{ }}{{1 x <- 1}}").unwrap();

        let root = read_path(&path, &ParserKeywords::default()).unwrap();
        assert_eq!(root.text_string(), "my_first_prog");
        assert!(root.origin.starts_with(" / sbide: \""));
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_read_path_rejects_unknown_extension() {
        let error = read_path(Path::new("diagram.txt"), &ParserKeywords::default()).unwrap_err();
        assert!(matches!(error, InterchangeError::Unsupported(_)));
    }
}
