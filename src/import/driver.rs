//! The import driver: one source file in, diagrams out.
//!
//! ```text
//! prepare ─► parse (AuParser: engine + comment mapper) ─► build ─► post-process
//!    │              │ syntax error                           │
//!    └─ error       └─ error + source context                └─ signatures → Call elements
//! ```
//!
//! Every phase boundary (and every build step) checks the cancellation
//! token; cancellation discards all partial diagrams.

use std::path::Path;

use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use tokio_util::sync::CancellationToken;

use super::comments::CommentDelimiters;
use super::error::{BuildError, ImportError};
use super::error_context::{self, FailurePoint};
use super::preprocess::{PlainPreprocessor, Preprocessor};
use super::progress::{ImportPhase, ImportProgress, NoProgress};
use super::session::ImportSession;
use super::session_log::SessionLog;
use crate::config::{ImportOptions, ParserKeywords};
use crate::diagram::Root;
use crate::parser::{AuParser, EngineError, GrammarTables, ParseEngine, Reduction, TokenSink};

/// A source-language importer.
pub trait CodeImporter {
    type Engine: ParseEngine;

    /// Short name, used in origin trails and cancellation messages.
    fn name(&self) -> &'static str;

    fn dialog_title(&self) -> &'static str;

    fn file_description(&self) -> &'static str;

    /// Accepted file extensions, without dot.
    fn file_extensions(&self) -> &'static [&'static str];

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| {
                self.file_extensions()
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(extension))
            })
    }

    fn create_engine(&self) -> Self::Engine;

    fn preprocessor(&self) -> &dyn Preprocessor {
        &PlainPreprocessor
    }

    /// Display form of a symbol → friendlier alternatives for error reports.
    fn terminal_translations(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    fn comment_delimiters(&self) -> CommentDelimiters;

    /// Rules whose reductions are statements of their own; comment
    /// retrieval does not descend into them.
    fn statement_rules(&self, tables: &GrammarTables) -> FxHashSet<usize>;

    /// Turn the top reduction into diagrams held by `session`.
    fn build(&self, reduction: &Reduction, session: &mut ImportSession<'_>) -> Result<(), BuildError>;

    /// Per-diagram hook; `true` marks the diagram as superfluous.
    fn update_root(&self, _root: &mut Root, _session: &ImportSession<'_>) -> bool {
        false
    }

    /// Session hook, run once on the final diagram list in `session.roots`.
    fn post_process(&self, _session: &mut ImportSession<'_>) -> Result<(), BuildError> {
        Ok(())
    }
}

/// Result of an import that was not cancelled.
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    pub roots: Vec<Root>,
    /// Empty on success, a readable message otherwise.
    pub error: String,
}

impl ImportOutcome {
    fn failed(roots: Vec<Root>, error: &ImportError) -> Self {
        Self {
            roots,
            error: error.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_empty()
    }
}

/// Import `path` with `importer`.
///
/// Recoverable failures come back as `Ok` with [`ImportOutcome::error`]
/// set; only cancellation is an `Err`.
pub fn import_file<I: CodeImporter>(
    importer: &I,
    path: &Path,
    keywords: &ParserKeywords,
    options: &ImportOptions,
    cancel: &CancellationToken,
) -> Result<ImportOutcome, ImportError> {
    import_file_with_progress(importer, path, keywords, options, cancel, &mut NoProgress)
}

pub fn import_file_with_progress<I: CodeImporter>(
    importer: &I,
    path: &Path,
    keywords: &ParserKeywords,
    options: &ImportOptions,
    cancel: &CancellationToken,
    progress: &mut dyn ImportProgress,
) -> Result<ImportOutcome, ImportError> {
    let file = path.display().to_string();
    let span = tracing::info_span!("import", importer = importer.name(), file = %file);
    let _entered = span.enter();
    let check = || {
        if cancel.is_cancelled() {
            tracing::info!("import cancelled");
            Err(ImportError::cancelled(importer.name()))
        } else {
            Ok(())
        }
    };

    let mut log = options.log_dir.as_deref().and_then(|dir| SessionLog::open(dir, path));

    // =========================================================================
    // Preparation
    // =========================================================================

    check()?;
    progress.phase_started(ImportPhase::Preparation);
    note(&mut log, "STARTING FILE PREPARATION...\n\n");
    let prepared = match importer.preprocessor().prepare(path, &options.encoding) {
        Ok(prepared) => prepared,
        Err(source) => {
            let error = ImportError::Preparation { file, source };
            tracing::warn!(%error, "preparation failed");
            note(&mut log, &error.to_string());
            return Ok(ImportOutcome::failed(Vec::new(), &error));
        }
    };
    note(
        &mut log,
        &format!("\nFILE PREPARATION COMPLETE -> \"{}\"\n\n", prepared.path().display()),
    );
    check()?;

    // =========================================================================
    // Parsing
    // =========================================================================

    progress.phase_started(ImportPhase::Parsing);
    let source = match prepared.read_text() {
        Ok(source) => source,
        Err(source) => {
            let error = ImportError::Io { file, source };
            tracing::warn!(%error, "cannot read prepared source");
            return Ok(ImportOutcome::failed(Vec::new(), &error));
        }
    };
    check()?;
    let mut parser = AuParser::new(importer.create_engine());
    let parsed = parser.parse_source_statements(&source, log.as_mut().map(|log| log as &mut dyn TokenSink));
    match parsed {
        Ok(true) => {
            tracing::debug!("parsing complete");
            note(&mut log, "\nParsing complete.\n\n");
        }
        Ok(false) => {
            let expected = parser.expected_symbols();
            let context = error_context::describe(
                &source,
                FailurePoint {
                    position: parser.current_position(),
                    token: parser.current_token(),
                    expected: &expected,
                },
                parser.tables(),
                importer.terminal_translations(),
                &prepared.replacements,
            );
            let error = ImportError::Syntax {
                file,
                message: parser.error_message(),
                context,
            };
            tracing::warn!("parsing failed");
            note(&mut log, &format!("\n{error}\n\n"));
            return Ok(ImportOutcome::failed(Vec::new(), &error));
        }
        Err(source) => {
            let error = ImportError::Engine { file, source };
            tracing::warn!(%error, "engine failure");
            return Ok(ImportOutcome::failed(Vec::new(), &error));
        }
    }
    let Some(reduction) = parser.take_reduction() else {
        let error = ImportError::Engine {
            file,
            source: EngineError::NoToken,
        };
        return Ok(ImportOutcome::failed(Vec::new(), &error));
    };
    check()?;

    // =========================================================================
    // Building
    // =========================================================================

    progress.phase_started(ImportPhase::Building);
    let tables = parser.tables().clone();
    let statement_rules = importer.statement_rules(&tables);
    let mut session = ImportSession::new(
        path,
        keywords.clone(),
        options.clone(),
        cancel,
        tables,
        parser.take_comment_map(),
        statement_rules,
        importer.comment_delimiters(),
    )
    .with_log(log)
    .with_replacements(prepared.replacements.clone());
    match importer.build(&reduction, &mut session) {
        Ok(()) => {}
        Err(BuildError::Cancelled) => return Err(ImportError::cancelled(importer.name())),
        Err(source) => {
            let error = ImportError::Build { file, source };
            tracing::warn!(%error, "build failed");
            session.log(&error.to_string());
            let roots = std::mem::take(&mut session.sub_roots);
            return Ok(ImportOutcome::failed(roots, &error));
        }
    }
    drop(prepared);
    check()?;

    // =========================================================================
    // Post-processing
    // =========================================================================

    progress.phase_started(ImportPhase::PostProcessing);
    let roots = finalize_roots(importer, &mut session);
    progress.roots_changed(roots.len());
    session.roots = roots;

    let origin = format!(" / {}: \"{}\"", importer.name(), file);
    let max_line_length = session.options.max_line_length;
    let mut signatures: IndexSet<String> = IndexSet::new();
    for root in &session.roots {
        if root.is_subroutine() {
            signatures.insert(root.signature());
        }
    }
    for root in &mut session.roots {
        root.convert_to_calls(&signatures, keywords);
        root.append_origin(&origin);
        if max_line_length > 0 {
            root.break_text_lines(max_line_length);
        }
    }

    let mut error = String::new();
    match importer.post_process(&mut session) {
        Ok(()) => {}
        Err(BuildError::Cancelled) => return Err(ImportError::cancelled(importer.name())),
        Err(source) => {
            let failure = ImportError::PostProcess(source.to_string());
            tracing::warn!(%failure, "post-processing failed");
            error = failure.to_string();
        }
    }

    session.log("\nBUILD PHASE COMPLETE.\n");
    let built = session.roots.first().is_some_and(|root| !root.children.is_empty());
    if built {
        let count = session.roots.len();
        session.log(&format!("{count} diagram(s) built.\n"));
    } else {
        session.log("No diagrams built.\n");
    }
    if let Some(mut log) = session.take_log() {
        log.close();
    }
    progress.roots_changed(session.roots.len());
    tracing::info!(roots = session.roots.len(), "import finished");
    Ok(ImportOutcome {
        roots: std::mem::take(&mut session.roots),
        error,
    })
}

fn note(log: &mut Option<SessionLog>, text: &str) {
    if let Some(log) = log.as_mut() {
        log.log(text);
    }
}

/// Apply the per-diagram hook and decide which diagrams are kept.
///
/// The main diagram is kept if no routines were built, or if it has
/// content and the hook did not mark it superfluous.
fn finalize_roots<I: CodeImporter>(importer: &I, session: &mut ImportSession<'_>) -> Vec<Root> {
    let mut sub_roots = std::mem::take(&mut session.sub_roots);
    let mut keep = Vec::with_capacity(sub_roots.len());
    for root in &mut sub_roots {
        keep.push(!importer.update_root(root, session));
    }
    let mut main = std::mem::take(&mut session.root);
    let forget_main = importer.update_root(&mut main, session);
    let with_main = sub_roots.is_empty() || (!main.children.is_empty() && !forget_main);

    let mut roots: Vec<Root> = Vec::with_capacity(sub_roots.len() + 1);
    if with_main {
        roots.push(main);
    }
    let removed = keep.iter().filter(|kept| !**kept).count();
    roots.extend(
        sub_roots
            .into_iter()
            .zip(keep)
            .filter_map(|(root, kept)| kept.then_some(root)),
    );
    if removed > 0 {
        tracing::debug!(removed, "superfluous diagrams dropped");
    }
    roots
}
