//! Source preparation: decoding, normalization and identifier substitution.
//!
//! A preprocessor turns the raw file into UTF-8 text with `\n` line ends,
//! stored in a temporary file that lives exactly as long as the
//! [`PreparedSource`]. Identifier substitutions are recorded in
//! [`IdReplacements`] so messages can show the original names again.

use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;
use tempfile::NamedTempFile;

use super::error::PreparationError;
use crate::base::lexical::{LexicalClass, pieces};

/// Substitute identifier → original identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdReplacements {
    map: IndexMap<String, String>,
}

impl IdReplacements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `original` was replaced by `substitute`.
    pub fn insert(&mut self, substitute: impl Into<String>, original: impl Into<String>) {
        self.map.insert(substitute.into(), original.into());
    }

    pub fn original(&self, substitute: &str) -> Option<&str> {
        self.map.get(substitute).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Revert whole-word substitutions in `line`; literals are left alone.
    pub fn undo(&self, line: &str) -> String {
        if self.map.is_empty() {
            return line.to_string();
        }
        pieces(line)
            .map(|(class, piece)| match class {
                LexicalClass::Word => self.original(piece).unwrap_or(piece),
                _ => piece,
            })
            .collect()
    }
}

/// The prepared, normalized source of one import.
///
/// The temporary file is removed when this value is dropped.
#[derive(Debug)]
pub struct PreparedSource {
    file: NamedTempFile,
    pub replacements: IdReplacements,
}

impl PreparedSource {
    /// Write `text` to a fresh temporary file.
    pub fn from_text(text: &str, replacements: IdReplacements) -> Result<Self, PreparationError> {
        let mut file = tempfile::Builder::new()
            .prefix("nassi-import-")
            .suffix(".txt")
            .tempfile()?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        Ok(Self { file, replacements })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn read_text(&self) -> std::io::Result<String> {
        std::fs::read_to_string(self.file.path())
    }
}

/// Turns a source file into a [`PreparedSource`].
pub trait Preprocessor {
    fn prepare(&self, path: &Path, encoding: &str) -> Result<PreparedSource, PreparationError>;
}

/// Decode `bytes`: ISO-8859-1 labels decode bytewise, UTF-8 falls back to
/// ISO-8859-1 on invalid input. Other labels are rejected.
pub fn decode(bytes: &[u8], encoding: &str) -> Result<String, PreparationError> {
    let label = encoding.trim().to_ascii_lowercase();
    match label.as_str() {
        "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" | "l1" | "windows-1252" | "cp1252" => {
            Ok(latin1(bytes))
        }
        "" | "utf-8" | "utf8" => {
            match std::str::from_utf8(bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)) {
                Ok(text) => Ok(text.to_string()),
                Err(err) => {
                    tracing::debug!(%encoding, %err, "not valid UTF-8, decoding as ISO-8859-1");
                    Ok(latin1(bytes))
                }
            }
        }
        _ => Err(PreparationError::Encoding {
            label: encoding.to_string(),
        }),
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| char::from(byte)).collect()
}

/// Convert `\r\n` and lone `\r` line ends to `\n`.
pub fn normalize_line_ends(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Read, decode and normalize `path`.
pub fn read_source(path: &Path, encoding: &str) -> Result<String, PreparationError> {
    let bytes = std::fs::read(path)?;
    Ok(normalize_line_ends(&decode(&bytes, encoding)?))
}

/// Decoding and line-end normalization only.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPreprocessor;

impl Preprocessor for PlainPreprocessor {
    fn prepare(&self, path: &Path, encoding: &str) -> Result<PreparedSource, PreparationError> {
        let text = read_source(path, encoding)?;
        PreparedSource::from_text(&text, IdReplacements::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"abc".as_slice(), "UTF-8", "abc")]
    #[case(b"\xEF\xBB\xBFx".as_slice(), "UTF-8", "x")]
    #[case(b"caf\xE9".as_slice(), "UTF-8", "café")]
    #[case("café".as_bytes(), "UTF-8", "café")]
    #[case(b"caf\xE9".as_slice(), "ISO-8859-1", "café")]
    fn test_decode(#[case] bytes: &[u8], #[case] encoding: &str, #[case] expected: &str) {
        assert_eq!(decode(bytes, encoding).unwrap(), expected);
    }

    #[test]
    fn test_unknown_encoding_is_rejected() {
        let err = decode(b"x", "EBCDIC").unwrap_err();
        assert_eq!(err.to_string(), "Cannot decode file content as EBCDIC");
    }

    #[test]
    fn test_normalize_line_ends() {
        assert_eq!(normalize_line_ends("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn test_undo_reverts_whole_words_only() {
        let mut replacements = IdReplacements::new();
        replacements.insert("type_0", "myint");
        assert_eq!(replacements.undo("type_0 x; type_01 y"), "myint x; type_01 y");
        assert_eq!(replacements.undo("s = \"type_0\""), "s = \"type_0\"");
    }

    #[test]
    fn test_prepared_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("prog.pas");
        std::fs::write(&source, "begin\r\nend.").unwrap();
        let prepared = PlainPreprocessor.prepare(&source, "UTF-8").unwrap();
        let path = prepared.path().to_path_buf();
        assert_eq!(prepared.read_text().unwrap(), "begin\nend.");
        drop(prepared);
        assert!(!path.exists());
    }
}
