//! Process-wide keyword store.
//!
//! The settings component loads and saves the active keyword set here.
//! Imports take a copy via [`ParserKeywords::current`] before they start
//! and never look at the store again.

use std::sync::LazyLock;

use parking_lot::RwLock;

use super::keywords::ParserKeywords;

static STORE: LazyLock<RwLock<ParserKeywords>> =
    LazyLock::new(|| RwLock::new(ParserKeywords::default()));

/// The process-wide keyword store.
pub fn keyword_store() -> &'static RwLock<ParserKeywords> {
    &STORE
}

impl ParserKeywords {
    /// Copy of the currently active keyword set.
    pub fn current() -> Self {
        keyword_store().read().clone()
    }

    /// Make this the active keyword set, returning the previous one.
    pub fn install(self) -> ParserKeywords {
        std::mem::replace(&mut *keyword_store().write(), self)
    }
}
