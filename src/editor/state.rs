//! Editor tool and selection state
//!
//! Selection is a set of object ids, always a subset of the document's
//! current ids. It is cleared whenever the document is replaced wholesale
//! (load, clear, undo/redo restore) and on every player reset.

use crate::world::{LevelDocument, LevelObject, ObjectKind};

/// The active editor tool. Erase and Select are tool markers, never
/// placed objects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorTool {
    Select,
    Erase,
    Place(ObjectKind),
}

#[derive(Debug)]
pub struct EditorState {
    pub tool: EditorTool,
    /// Selected object ids, insertion-ordered
    pub selection: Vec<String>,
    /// Copy buffer: deep value copies, never references into the document
    pub clipboard: Vec<LevelObject>,
    /// The current selection came from a paste/duplicate (rendering
    /// emphasis only)
    pub pasted_selection: bool,
    /// Rotation applied to newly placed objects; remembered across
    /// placements within one tool session
    pub last_rotation: f32,
    /// Last grid cell processed by the current delete stroke
    pub last_delete_cell: Option<(i32, i32)>,
}

impl EditorState {
    pub fn new() -> Self {
        Self {
            tool: EditorTool::Select,
            selection: Vec::new(),
            clipboard: Vec::new(),
            pasted_selection: false,
            last_rotation: 0.0,
            last_delete_cell: None,
        }
    }

    /// Switch tools. The remembered placement rotation resets with the
    /// tool session.
    pub fn set_tool(&mut self, tool: EditorTool) {
        self.tool = tool;
        self.last_rotation = 0.0;
        self.last_delete_cell = None;
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.pasted_selection = false;
        self.last_rotation = 0.0;
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.iter().any(|s| s == id)
    }

    /// Drop selected ids that no longer exist in the document
    pub fn prune_selection(&mut self, doc: &LevelDocument) {
        self.selection.retain(|id| doc.get(id).is_some());
        if self.selection.is_empty() {
            self.pasted_selection = false;
        }
    }

    /// A new pointer-down gesture starts a fresh delete stroke
    pub fn begin_delete_stroke(&mut self) {
        self.last_delete_cell = None;
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}
