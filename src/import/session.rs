//! Per-import state shared between the driver and an importer's build.

use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};
use tokio_util::sync::CancellationToken;

use super::comments::{CommentDelimiters, clean_comment, retrieve_comment};
use super::error::BuildError;
use super::preprocess::IdReplacements;
use super::session_log::SessionLog;
use crate::config::{ImportOptions, ParserKeywords};
use crate::diagram::{Element, Root};
use crate::parser::{GrammarTables, Reduction, TokenId};

/// State of one import operation.
///
/// Built roots go to [`root`](Self::root) (the main diagram) and
/// [`sub_roots`](Self::sub_roots) (routines and includables). After the
/// driver's post-processing, the final list is in [`roots`](Self::roots).
pub struct ImportSession<'c> {
    pub keywords: ParserKeywords,
    pub options: ImportOptions,
    pub root: Root,
    pub sub_roots: Vec<Root>,
    pub roots: Vec<Root>,
    pub replacements: IdReplacements,
    source: PathBuf,
    cancel: &'c CancellationToken,
    tables: GrammarTables,
    comments: FxHashMap<TokenId, String>,
    statement_rules: FxHashSet<usize>,
    delimiters: CommentDelimiters,
    log: Option<SessionLog>,
}

impl<'c> ImportSession<'c> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: &Path,
        keywords: ParserKeywords,
        options: ImportOptions,
        cancel: &'c CancellationToken,
        tables: GrammarTables,
        comments: FxHashMap<TokenId, String>,
        statement_rules: FxHashSet<usize>,
        delimiters: CommentDelimiters,
    ) -> Self {
        Self {
            keywords,
            options,
            root: Root::new(),
            sub_roots: Vec::new(),
            roots: Vec::new(),
            replacements: IdReplacements::new(),
            source: source.to_path_buf(),
            cancel,
            tables,
            comments,
            statement_rules,
            delimiters,
            log: None,
        }
    }

    pub fn with_log(mut self, log: Option<SessionLog>) -> Self {
        self.log = log;
        self
    }

    pub fn with_replacements(mut self, replacements: IdReplacements) -> Self {
        self.replacements = replacements;
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// File name without extension, as used for derived diagram names.
    pub fn source_stem(&self) -> String {
        self.source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn tables(&self) -> &GrammarTables {
        &self.tables
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Polled at every recursive build step.
    pub fn check_cancelled(&self) -> Result<(), BuildError> {
        if self.cancel.is_cancelled() {
            Err(BuildError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// The cleaned source comment of a statement, if comment import is on.
    pub fn comment_for(&self, reduction: &Reduction) -> Option<String> {
        if !self.options.import_comments {
            return None;
        }
        let raw = retrieve_comment(reduction, &self.comments, &self.statement_rules)?;
        let cleaned = clean_comment(&self.replacements.undo(&raw), self.delimiters);
        (!cleaned.is_empty()).then_some(cleaned)
    }

    /// Attach the source comment of `reduction` to `element`.
    pub fn equip_with_comment(&self, element: &mut Element, reduction: &Reduction) {
        if let Some(comment) = self.comment_for(reduction) {
            element.set_comment(&comment);
        }
    }

    pub fn add_sub_root(&mut self, root: Root) {
        tracing::debug!(root = %root.text_string(), "sub diagram built");
        self.sub_roots.push(root);
    }

    pub fn log(&mut self, text: &str) {
        if let Some(log) = self.log.as_mut() {
            log.log(text);
        }
    }

    pub(crate) fn take_log(&mut self) -> Option<SessionLog> {
        self.log.take()
    }
}
