//! Level loading and saving
//!
//! Levels persist as JSON: `{ "settings": ..., "objects": [...] }`, with a
//! legacy fallback accepting a bare object array (settings take the
//! documented defaults). The import path sanitizes documents before they
//! reach the engine: start positions behind x = 0 are dropped, trigger
//! rotations are zeroed, and block rotations snap to the nearest 90
//! degrees. The engine's `load` trusts this and does not re-validate.

use std::fs;
use std::path::Path;
use serde::Deserialize;
use super::document::LevelDocument;
use super::object::{LevelObject, LevelSettings, normalize_degrees, snap_to_right_angle};

/// Validation limits to prevent resource exhaustion from malicious files
pub mod limits {
    /// Maximum number of objects in a level
    pub const MAX_OBJECTS: usize = 100_000;
    /// Maximum grid coordinate magnitude
    pub const MAX_COORD: f32 = 100_000.0;
    /// Maximum id string length
    pub const MAX_ID_LEN: usize = 64;
}

/// Error type for level loading and saving
#[derive(Debug)]
pub enum LevelError {
    IoError(std::io::Error),
    ParseError(serde_json::Error),
    ValidationError(String),
}

impl From<std::io::Error> for LevelError {
    fn from(e: std::io::Error) -> Self {
        LevelError::IoError(e)
    }
}

impl From<serde_json::Error> for LevelError {
    fn from(e: serde_json::Error) -> Self {
        LevelError::ParseError(e)
    }
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelError::IoError(e) => write!(f, "IO error: {}", e),
            LevelError::ParseError(e) => write!(f, "Parse error: {}", e),
            LevelError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

/// Check if a float is valid (not NaN or Inf, within coordinate bounds)
fn is_valid_coord(f: f32) -> bool {
    f.is_finite() && f.abs() <= limits::MAX_COORD
}

/// Validate a single object
fn validate_object(obj: &LevelObject, idx: usize) -> Result<(), String> {
    if obj.id.is_empty() || obj.id.len() > limits::MAX_ID_LEN {
        return Err(format!("object[{}]: bad id length {}", idx, obj.id.len()));
    }
    if !is_valid_coord(obj.x) || !is_valid_coord(obj.y) {
        return Err(format!("object[{}]: invalid position ({}, {})", idx, obj.x, obj.y));
    }
    if !obj.rotation.is_finite() {
        return Err(format!("object[{}]: invalid rotation {}", idx, obj.rotation));
    }
    if let Some(trigger) = &obj.trigger {
        if !trigger.duration.is_finite() || trigger.duration < 0.0 {
            return Err(format!("object[{}]: invalid trigger duration {}", idx, trigger.duration));
        }
    }
    Ok(())
}

/// Validate an entire document
pub fn validate_document(doc: &LevelDocument) -> Result<(), LevelError> {
    if doc.objects.len() > limits::MAX_OBJECTS {
        return Err(LevelError::ValidationError(format!(
            "too many objects ({} > {})",
            doc.objects.len(),
            limits::MAX_OBJECTS
        )));
    }
    for (idx, obj) in doc.objects.iter().enumerate() {
        validate_object(obj, idx).map_err(LevelError::ValidationError)?;
    }
    Ok(())
}

/// Apply the import sanitization rules in place:
/// - drop any start position with grid x < 0
/// - zero rotation on triggers
/// - snap block rotations to the nearest 90 degrees
/// - normalize all rotations into [0, 360)
pub fn sanitize_document(doc: &mut LevelDocument) {
    let before = doc.objects.len();
    doc.objects.retain(|o| !(o.kind.is_start_pos() && o.x < 0.0));
    let dropped = before - doc.objects.len();
    if dropped > 0 {
        eprintln!("level import: dropped {} start position(s) behind x = 0", dropped);
    }

    for obj in &mut doc.objects {
        obj.rotation = if obj.kind.is_trigger() {
            0.0
        } else if obj.kind.is_block() {
            snap_to_right_angle(obj.rotation)
        } else {
            normalize_degrees(obj.rotation)
        };
    }
}

/// Either shape a level file may take on disk
#[derive(Deserialize)]
#[serde(untagged)]
enum LevelFile {
    Full(LevelDocument),
    /// Legacy format: a bare object array, settings defaulted
    Objects(Vec<LevelObject>),
}

/// Parse a level from a JSON string, validating and sanitizing it
pub fn parse_document(text: &str) -> Result<LevelDocument, LevelError> {
    let mut doc = match serde_json::from_str::<LevelFile>(text)? {
        LevelFile::Full(doc) => doc,
        LevelFile::Objects(objects) => LevelDocument {
            settings: LevelSettings::default(),
            objects,
        },
    };
    validate_document(&doc)?;
    sanitize_document(&mut doc);
    Ok(doc)
}

/// Serialize a document to a JSON string
pub fn serialize_document(doc: &LevelDocument) -> Result<String, LevelError> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Load a level from a JSON file
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<LevelDocument, LevelError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    match parse_document(&text) {
        Ok(doc) => Ok(doc),
        Err(e) => {
            eprintln!("level parse error in {}: {}", path.display(), e);
            Err(e)
        }
    }
}

/// Save a level to a JSON file
pub fn save_document<P: AsRef<Path>>(doc: &LevelDocument, path: P) -> Result<(), LevelError> {
    let text = serialize_document(doc)?;
    fs::write(path, text)?;
    Ok(())
}
