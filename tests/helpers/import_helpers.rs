//! Helpers for running importers on sources written to a temp directory.

use std::path::PathBuf;

use nassi::{CodeImporter, Element, ImportOptions, ImportOutcome, ParserKeywords, Root, Subqueue, import_file};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// A source file that lives as long as this value.
pub struct SourceFile {
    _dir: TempDir,
    pub path: PathBuf,
}

/// Write `text` to a fresh directory under `name`.
pub fn source_file(name: &str, text: &str) -> SourceFile {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    SourceFile { _dir: dir, path }
}

/// Import `text` (saved as `name`) and return the outcome.
pub fn import_source<I: CodeImporter>(importer: &I, name: &str, text: &str, options: &ImportOptions) -> ImportOutcome {
    let file = source_file(name, text);
    import_file(
        importer,
        &file.path,
        &ParserKeywords::default(),
        options,
        &CancellationToken::new(),
    )
    .expect("import was not cancelled")
}

/// Import `text` and assert that no error was reported.
pub fn import_roots<I: CodeImporter>(importer: &I, name: &str, text: &str) -> Vec<Root> {
    let outcome = import_source(importer, name, text, &ImportOptions::default());
    assert!(outcome.is_ok(), "unexpected import error: {}", outcome.error);
    outcome.roots
}

/// First-line texts of a queue, joined per element.
pub fn texts(queue: &Subqueue) -> Vec<String> {
    queue.iter().map(Element::text_string).collect()
}
