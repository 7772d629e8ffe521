#![allow(clippy::unwrap_used)]

use nassi::{ImportOptions, PascalImporter};

use crate::helpers::import_helpers::import_source;
use crate::helpers::source_fixtures::{PASCAL_ROUTINES, PASCAL_SYNTAX_ERROR};

fn options_logging_to(dir: &tempfile::TempDir) -> ImportOptions {
    ImportOptions {
        log_dir: Some(dir.path().to_path_buf()),
        ..ImportOptions::default()
    }
}

#[test]
fn test_log_records_every_phase() {
    let logs = tempfile::tempdir().unwrap();
    let outcome = import_source(&PascalImporter, "calls.pas", PASCAL_ROUTINES, &options_logging_to(&logs));
    assert!(outcome.is_ok(), "{}", outcome.error);

    let log = std::fs::read_to_string(logs.path().join("calls.pas.log")).unwrap();
    assert!(log.contains("STARTING FILE PREPARATION..."));
    assert!(log.contains("FILE PREPARATION COMPLETE"));
    assert!(log.contains("Parsing complete."));
    assert!(log.contains("BUILD PHASE COMPLETE."));
    assert!(log.contains("3 diagram(s) built."));
}

#[test]
fn test_log_keeps_the_syntax_error() {
    let logs = tempfile::tempdir().unwrap();
    let outcome = import_source(&PascalImporter, "broken.pas", PASCAL_SYNTAX_ERROR, &options_logging_to(&logs));
    assert!(!outcome.is_ok());

    let log = std::fs::read_to_string(logs.path().join("broken.pas.log")).unwrap();
    assert!(log.contains("Preceding source context:"));
    assert!(!log.contains("BUILD PHASE COMPLETE."));
}
