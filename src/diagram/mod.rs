//! Diagram tree model.
//!
//! ```text
//! Root ── children: Subqueue
//!                     └── Element* ── kind: ElementKind
//!                                        ├── Instruction | Jump | Call
//!                                        ├── Alternative { on_true, on_false }
//!                                        ├── While | Repeat | Forever { body }
//!                                        ├── For(ForLoop { .., body })
//!                                        ├── Case(CaseBranches { selectors, branches })
//!                                        └── Parallel { threads }
//! ```
//!
//! Every [`Subqueue`] is owned by exactly one element or root, so the model
//! is a tree by construction. Importers build children first and move them
//! into their container once.

pub mod calls;
mod color;
mod element;
mod for_loop;
pub mod refactor;
mod root;
mod subqueue;
mod text;

pub use color::Color;
pub use element::{CaseBranches, Element, ElementKind};
pub use for_loop::{ForLoop, ForStyle};
pub use root::{Root, RootKind};
pub use subqueue::Subqueue;
pub use text::break_line;
