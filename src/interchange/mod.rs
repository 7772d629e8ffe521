//! Stored diagram formats.
//!
//! Diagrams saved by diagram editors are read back into a [`Root`]:
//!
//! - **NSD** - tagged XML with attribute text and an optional keyword snapshot
//! - **SBD** - brace/type-code token groups
//! - **STJ** - legacy structogram XML with character-coded text
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   .nsd       │     │   .sbd       │     │  .stj/.strk  │
//! └──────┬───────┘     └──────┬───────┘     └──────┬───────┘
//!        │ quick-xml events   │ lexical tokens     │ quick-xml events
//!        ▼                    ▼                    ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │          TreeBuilder (one stack of tagged frames)        │
//! │  open_element / open_slot / close_slot / close_element   │
//! └──────────────────────────────────────────────────────────┘
//!        │ finish()
//!        ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  Root (+ keyword refactoring for trusted NSD snapshots)  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use nassi::config::ParserKeywords;
//! use nassi::interchange::read_path;
//!
//! let root = read_path(Path::new("sort.nsd"), &ParserKeywords::default())?;
//! ```
//!
//! [`Root`]: crate::diagram::Root

mod error;
mod format;
pub mod frames;
mod nsd;
mod sbd;
mod stj;

pub use error::InterchangeError;
pub use format::{DiagramFormat, format_for_path, formats, read_path};
pub use frames::{SlotKind, TreeBuilder};
pub use nsd::{Nsd, comma_text};
pub use sbd::Sbd;
pub use stj::Stj;
