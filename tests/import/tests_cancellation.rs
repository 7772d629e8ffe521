#![allow(clippy::unwrap_used)]

use std::cell::Cell;

use nassi::import::comments::CommentDelimiters;
use nassi::import::{BuildError, ImportPhase, ImportProgress, ImportSession, import_file_with_progress};
use nassi::parser::{GrammarTables, Reduction};
use nassi::{CodeImporter, ImportOptions, ParserKeywords, PascalImporter, import_file};
use rustc_hash::FxHashSet;
use rstest::rstest;
use tokio_util::sync::CancellationToken;

use crate::helpers::import_helpers::source_file;
use crate::helpers::source_fixtures::PASCAL_ROUTINES;

/// Records phases and cancels the token as soon as `phase` starts.
struct CancelOnPhase {
    phase: Option<ImportPhase>,
    token: CancellationToken,
    seen: Vec<ImportPhase>,
    roots_reported: bool,
}

impl ImportProgress for CancelOnPhase {
    fn phase_started(&mut self, phase: ImportPhase) {
        self.seen.push(phase);
        if self.phase == Some(phase) {
            self.token.cancel();
        }
    }

    fn roots_changed(&mut self, _count: usize) {
        self.roots_reported = true;
    }
}

/// Builds the top reduction child by child and cancels once `after`
/// children are done, leaving the session half built.
struct CancelDuringBuild {
    token: CancellationToken,
    after: usize,
    diagrams_at_cancel: Cell<Option<usize>>,
}

impl CodeImporter for CancelDuringBuild {
    type Engine = <PascalImporter as CodeImporter>::Engine;

    fn name(&self) -> &'static str {
        PascalImporter.name()
    }

    fn dialog_title(&self) -> &'static str {
        PascalImporter.dialog_title()
    }

    fn file_description(&self) -> &'static str {
        PascalImporter.file_description()
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        PascalImporter.file_extensions()
    }

    fn create_engine(&self) -> Self::Engine {
        PascalImporter.create_engine()
    }

    fn comment_delimiters(&self) -> CommentDelimiters {
        PascalImporter.comment_delimiters()
    }

    fn statement_rules(&self, tables: &GrammarTables) -> FxHashSet<usize> {
        PascalImporter.statement_rules(tables)
    }

    fn build(&self, reduction: &Reduction, session: &mut ImportSession<'_>) -> Result<(), BuildError> {
        let children = reduction.tokens.iter().filter_map(|token| token.as_reduction());
        for (built, child) in children.enumerate() {
            if built == self.after {
                self.diagrams_at_cancel.set(Some(session.sub_roots.len()));
                self.token.cancel();
            }
            PascalImporter.build(child, session)?;
        }
        Ok(())
    }
}

#[test]
fn test_cancellation_in_the_middle_of_building_discards_built_diagrams() {
    let file = source_file("calls.pas", PASCAL_ROUTINES);
    let token = CancellationToken::new();
    // header and routine declarations are built, the main block is not
    let importer = CancelDuringBuild {
        token: token.clone(),
        after: 2,
        diagrams_at_cancel: Cell::new(None),
    };
    let mut progress = CancelOnPhase {
        phase: None,
        token: token.clone(),
        seen: Vec::new(),
        roots_reported: false,
    };

    let result = import_file_with_progress(
        &importer,
        &file.path,
        &ParserKeywords::default(),
        &ImportOptions::default(),
        &token,
        &mut progress,
    );

    assert_eq!(importer.diagrams_at_cancel.get(), Some(2));
    let error = result.unwrap_err();
    assert!(error.is_cancelled());
    assert_eq!(error.to_string(), "Pascal CANCELLED!");
    assert_eq!(progress.seen.last(), Some(&ImportPhase::Building));
    assert!(!progress.roots_reported);
}

#[rstest]
#[case::preparation(ImportPhase::Preparation)]
#[case::parsing(ImportPhase::Parsing)]
#[case::building(ImportPhase::Building)]
fn test_cancellation_discards_everything(#[case] phase: ImportPhase) {
    let file = source_file("calls.pas", PASCAL_ROUTINES);
    let token = CancellationToken::new();
    let mut progress = CancelOnPhase {
        phase: Some(phase),
        token: token.clone(),
        seen: Vec::new(),
        roots_reported: false,
    };

    let result = import_file_with_progress(
        &PascalImporter,
        &file.path,
        &ParserKeywords::default(),
        &ImportOptions::default(),
        &token,
        &mut progress,
    );

    let error = result.unwrap_err();
    assert!(error.is_cancelled());
    assert_eq!(error.to_string(), "Pascal CANCELLED!");
    assert_eq!(progress.seen.last(), Some(&phase));
    assert!(!progress.seen.contains(&ImportPhase::PostProcessing));
    assert!(!progress.roots_reported);
}

#[test]
fn test_already_cancelled_token_stops_before_preparation() {
    let file = source_file("calls.pas", PASCAL_ROUTINES);
    let token = CancellationToken::new();
    token.cancel();
    let error = import_file(
        &PascalImporter,
        &file.path,
        &ParserKeywords::default(),
        &ImportOptions::default(),
        &token,
    )
    .unwrap_err();
    assert!(error.is_cancelled());
}

#[test]
fn test_phases_are_reported_in_order() {
    let file = source_file("calls.pas", PASCAL_ROUTINES);
    let token = CancellationToken::new();
    let mut progress = CancelOnPhase {
        phase: None,
        token: token.clone(),
        seen: Vec::new(),
        roots_reported: false,
    };
    let outcome = import_file_with_progress(
        &PascalImporter,
        &file.path,
        &ParserKeywords::default(),
        &ImportOptions::default(),
        &token,
        &mut progress,
    )
    .unwrap();
    assert!(outcome.is_ok(), "{}", outcome.error);
    assert_eq!(
        progress.seen,
        [
            ImportPhase::Preparation,
            ImportPhase::Parsing,
            ImportPhase::Building,
            ImportPhase::PostProcessing,
        ]
    );
    assert!(progress.roots_reported);
}
