//! Optional per-import log file.
//!
//! Logging is best-effort: the first write failure is reported through
//! `tracing` and the log goes quiet for the rest of the session.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::parser::{GrammarTables, Token, TokenSink};

#[derive(Debug)]
pub struct SessionLog {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl SessionLog {
    /// Open `<dir>/<file name of source>.log`; `None` if it cannot be created.
    pub fn open(dir: &Path, source: &Path) -> Option<Self> {
        let name = source.file_name()?.to_string_lossy();
        let path = dir.join(format!("{name}.log"));
        match File::create(&path) {
            Ok(file) => Some(Self {
                path,
                writer: Some(BufWriter::new(file)),
            }),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "cannot open import log");
                None
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log(&mut self, text: &str) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        if let Err(err) = writer.write_all(text.as_bytes()) {
            tracing::warn!(path = %self.path.display(), %err, "import log write failed, logging disabled");
            self.writer = None;
        }
    }

    pub fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(err) = writer.flush() {
                tracing::warn!(path = %self.path.display(), %err, "import log flush failed");
            }
        }
    }
}

impl Drop for SessionLog {
    fn drop(&mut self) {
        self.close();
    }
}

/// Make control characters visible.
pub fn escape_control(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch.is_control() => out.push_str(&format!("\\u{:04x}", ch as u32)),
            ch => out.push(ch),
        }
    }
    out
}

impl TokenSink for SessionLog {
    fn token_read(&mut self, token: &Token, tables: &GrammarTables) {
        let line = format!(
            "{} token {} = \"{}\"\n",
            token.position,
            token.describe(tables),
            escape_control(token.text())
        );
        self.log(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_control() {
        assert_eq!(escape_control("a\tb\n\u{1}"), "a\\tb\\n\\u0001");
    }

    #[test]
    fn test_log_file_is_written_and_closed() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = SessionLog::open(dir.path(), Path::new("/some/where/prog.pas")).unwrap();
        log.log("STARTING\n");
        let path = log.path().to_path_buf();
        drop(log);
        assert_eq!(path.file_name().unwrap(), "prog.pas.log");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "STARTING\n");
    }

    #[test]
    fn test_missing_directory_gives_no_log() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SessionLog::open(&dir.path().join("missing"), Path::new("a.c")).is_none());
    }
}
