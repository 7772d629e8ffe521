//! Source-code import: the pipeline shared by all language importers.
//!
//! ```text
//! file ─► Preprocessor ─► PreparedSource (temp file + id replacements)
//!                              │
//!                              ▼
//!              AuParser<Engine> ─► Reduction + comment map
//!                              │
//!                              ▼
//!          CodeImporter::build(ImportSession) ─► root + sub roots
//!                              │
//!                              ▼
//!        update_root / signatures → calls / origin / line breaking
//!                              │
//!                              ▼
//!                        ImportOutcome
//! ```
//!
//! A language importer implements [`CodeImporter`]; [`import_file`] runs
//! the phases and turns every failure except cancellation into a message
//! on the outcome.

pub mod comments;
mod driver;
pub mod error;
pub mod error_context;
pub mod preprocess;
mod progress;
mod session;
mod session_log;

pub use driver::{CodeImporter, ImportOutcome, import_file, import_file_with_progress};
pub use error::{BuildError, ImportError, PreparationError};
pub use preprocess::{IdReplacements, PlainPreprocessor, PreparedSource, Preprocessor};
pub use progress::{ImportPhase, ImportProgress, NoProgress};
pub use session::ImportSession;
pub use session_log::SessionLog;
