//! World module - grid-based level documents
//!
//! The level document model: placed objects, ambient settings, the
//! snapshot history used for undo/redo, and JSON persistence with the
//! import sanitization rules.

mod document;
mod history;
mod io;
mod object;

pub use document::*;
pub use history::*;
pub use io::*;
pub use object::*;
