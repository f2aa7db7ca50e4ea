//! Editor module - tools, selection, and document mutation
//!
//! The editing operations themselves live on the engine facade (ops.rs)
//! so every mutation flows through the same history/notification path.

mod ops;
mod state;

pub use state::{EditorState, EditorTool};
