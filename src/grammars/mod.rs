//! Source-language importers.
//!
//! Each language brings a logos lexer, a recursive-descent grammar over
//! the shared [`kit`](self::kit) cursor and a synthesizer turning the
//! reduction tree into diagrams.

pub mod c;
pub mod compose;
pub mod kit;
pub mod pascal;

pub use c::CImporter;
pub use pascal::PascalImporter;
