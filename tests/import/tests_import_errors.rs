#![allow(clippy::unwrap_used)]

use std::path::Path;

use nassi::{ImportOptions, ParserKeywords, PascalImporter, import_file};
use tokio_util::sync::CancellationToken;

use crate::helpers::import_helpers::import_source;
use crate::helpers::source_fixtures::PASCAL_SYNTAX_ERROR;

#[test]
fn test_syntax_error_reports_source_context() {
    let outcome = import_source(&PascalImporter, "broken.pas", PASCAL_SYNTAX_ERROR, &ImportOptions::default());
    assert!(!outcome.is_ok());
    assert!(outcome.roots.is_empty());

    let message = &outcome.error;
    assert!(message.contains("broken.pas"), "{message}");
    assert!(message.contains("Preceding source context:"), "{message}");
    assert!(message.contains("Found token"), "{message}");
    assert!(message.contains("Expected: "), "{message}");
    // the failing line carries the marker, the lines before it are numbered
    let failing = message.lines().find(|line| line.contains('»')).unwrap();
    assert!(failing.trim_start().starts_with("4:"), "{failing}");
    assert!(message.lines().any(|line| line.trim_start().starts_with("3:")));
}

#[test]
fn test_missing_file_is_a_preparation_error() {
    let outcome = import_file(
        &PascalImporter,
        Path::new("/nonexistent/dir/missing.pas"),
        &ParserKeywords::default(),
        &ImportOptions::default(),
        &CancellationToken::new(),
    )
    .unwrap();
    assert!(!outcome.is_ok());
    assert!(outcome.roots.is_empty());
    assert!(outcome.error.contains("FILE PREPARATION ERROR"), "{}", outcome.error);
}
