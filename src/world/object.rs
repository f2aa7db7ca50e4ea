//! Level object model
//!
//! Every placeable thing in a level is a `LevelObject`: a grid position, a
//! kind (with a per-kind subtype), an optional rotation, and optional
//! per-kind payload (trigger configuration, start-position configuration).
//! Identity is the `id` string, immutable after creation.

use serde::{Serialize, Deserialize};

/// Vehicle forms the player can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VehicleMode {
    #[default]
    Cube,
    Ship,
}

/// Which ambient color channel a trigger writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerTarget {
    #[serde(rename = "bgColorTop")]
    BgTop,
    #[serde(rename = "bgColorBottom")]
    BgBottom,
    #[serde(rename = "groundColor")]
    Ground,
    #[serde(rename = "lineColor")]
    Line,
}

impl TriggerTarget {
    pub const ALL: [TriggerTarget; 4] = [
        TriggerTarget::BgTop,
        TriggerTarget::BgBottom,
        TriggerTarget::Ground,
        TriggerTarget::Line,
    ];
}

/// Block variants. `Slab` is the half-height top slab; its solid face
/// depends on rotation (180 degrees puts the slab in the bottom half).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Solid,
    Brick,
    Slab,
}

/// Spike variants, largest hitbox first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpikeKind {
    Large,
    Medium,
    Small,
}

/// Jump pad variants. Blue inverts gravity instead of boosting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PadKind {
    Pink,
    Yellow,
    Red,
    Blue,
}

/// Jump orb variants, activated by input while overlapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrbKind {
    Pink,
    Yellow,
    Red,
    Blue,
}

/// Decoration variants (no hitbox, no gameplay effect)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecoKind {
    Chain,
    Flower,
    Cloud,
}

/// Portal variants: vehicle changes and gravity changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortalKind {
    Cube,
    Ship,
    GravityReverse,
    GravityNormal,
    GravityFlip,
}

/// The kind of a placed object, with subtype scoped to each variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Block(BlockKind),
    Spike(SpikeKind),
    Pad(PadKind),
    Orb(OrbKind),
    Deco(DecoKind),
    Portal(PortalKind),
    Trigger,
    StartPos,
}

impl ObjectKind {
    /// Objects that participate in gameplay collision.
    /// Decorations and start positions never collide.
    pub fn has_hitbox(&self) -> bool {
        !matches!(self, ObjectKind::Deco(_) | ObjectKind::StartPos)
    }

    pub fn is_block(&self) -> bool {
        matches!(self, ObjectKind::Block(_))
    }

    pub fn is_start_pos(&self) -> bool {
        matches!(self, ObjectKind::StartPos)
    }

    pub fn is_trigger(&self) -> bool {
        matches!(self, ObjectKind::Trigger)
    }
}

/// Trigger payload: schedules an ambient color change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerData {
    pub target: TriggerTarget,
    /// RGB hex string, e.g. "#ff8800"
    pub color: String,
    /// Interpolation time in seconds (0 = instant snap)
    pub duration: f32,
    /// Fire on hitbox overlap instead of x-position crossing
    pub touch_trigger: bool,
}

impl Default for TriggerData {
    fn default() -> Self {
        Self {
            target: TriggerTarget::BgTop,
            color: "#ffffff".to_string(),
            duration: 0.5,
            touch_trigger: false,
        }
    }
}

/// Start-position payload: an alternate spawn usable outside verification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartPosData {
    pub mode: VehicleMode,
    pub reverse_gravity: bool,
    pub enabled: bool,
}

impl Default for StartPosData {
    fn default() -> Self {
        Self {
            mode: VehicleMode::Cube,
            reverse_gravity: false,
            enabled: true,
        }
    }
}

/// A single placed object in the level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelObject {
    /// Opaque unique identifier
    pub id: String,
    /// Grid position (grid units; placements are integer, transforms may
    /// leave fractional positions rounded to 2 decimals)
    pub x: f32,
    pub y: f32,
    pub kind: ObjectKind,
    /// Rotation in degrees, normalized into [0, 360)
    #[serde(default)]
    pub rotation: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<TriggerData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_pos: Option<StartPosData>,
}

impl LevelObject {
    /// Create an object of the given kind at a grid cell, populating the
    /// payload its kind requires.
    pub fn new(id: String, kind: ObjectKind, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            kind,
            rotation: 0.0,
            trigger: kind.is_trigger().then(TriggerData::default),
            start_pos: kind.is_start_pos().then(StartPosData::default),
        }
    }

    /// The integer grid cell this object's anchor lies in (unrotated)
    pub fn grid_cell(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }

    /// Center of the object's tile, in grid units
    pub fn center(&self) -> (f32, f32) {
        (self.x + 0.5, self.y + 0.5)
    }
}

/// Ambient level defaults: base colors and spawn configuration.
/// Exactly one instance per document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSettings {
    pub bg_color_top: String,
    pub bg_color_bottom: String,
    pub ground_color: String,
    pub line_color: String,
    pub start_mode: VehicleMode,
    pub start_reverse_gravity: bool,
}

impl Default for LevelSettings {
    fn default() -> Self {
        Self {
            bg_color_top: "#287dff".to_string(),
            bg_color_bottom: "#0066ff".to_string(),
            ground_color: "#0066ff".to_string(),
            line_color: "#ffffff".to_string(),
            start_mode: VehicleMode::Cube,
            start_reverse_gravity: false,
        }
    }
}

impl LevelSettings {
    pub fn color_for(&self, target: TriggerTarget) -> &str {
        match target {
            TriggerTarget::BgTop => &self.bg_color_top,
            TriggerTarget::BgBottom => &self.bg_color_bottom,
            TriggerTarget::Ground => &self.ground_color,
            TriggerTarget::Line => &self.line_color,
        }
    }
}

/// Partial update for `LevelSettings` (shallow merge)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub bg_color_top: Option<String>,
    pub bg_color_bottom: Option<String>,
    pub ground_color: Option<String>,
    pub line_color: Option<String>,
    pub start_mode: Option<VehicleMode>,
    pub start_reverse_gravity: Option<bool>,
}

impl SettingsPatch {
    pub fn apply(self, settings: &mut LevelSettings) {
        if let Some(v) = self.bg_color_top { settings.bg_color_top = v; }
        if let Some(v) = self.bg_color_bottom { settings.bg_color_bottom = v; }
        if let Some(v) = self.ground_color { settings.ground_color = v; }
        if let Some(v) = self.line_color { settings.line_color = v; }
        if let Some(v) = self.start_mode { settings.start_mode = v; }
        if let Some(v) = self.start_reverse_gravity { settings.start_reverse_gravity = v; }
    }
}

/// Partial update for `TriggerData`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerPatch {
    pub target: Option<TriggerTarget>,
    pub color: Option<String>,
    pub duration: Option<f32>,
    pub touch_trigger: Option<bool>,
}

impl TriggerPatch {
    pub fn apply(self, data: &mut TriggerData) {
        if let Some(v) = self.target { data.target = v; }
        if let Some(v) = self.color { data.color = v; }
        if let Some(v) = self.duration { data.duration = v.max(0.0); }
        if let Some(v) = self.touch_trigger { data.touch_trigger = v; }
    }
}

/// Partial update for `StartPosData`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StartPosPatch {
    pub mode: Option<VehicleMode>,
    pub reverse_gravity: Option<bool>,
    pub enabled: Option<bool>,
}

impl StartPosPatch {
    pub fn apply(self, data: &mut StartPosData) {
        if let Some(v) = self.mode { data.mode = v; }
        if let Some(v) = self.reverse_gravity { data.reverse_gravity = v; }
        if let Some(v) = self.enabled { data.enabled = v; }
    }
}

/// Normalize an angle in degrees into [0, 360)
pub fn normalize_degrees(angle: f32) -> f32 {
    let a = angle % 360.0;
    if a < 0.0 { a + 360.0 } else { a }
}

/// Snap an angle in degrees to the nearest multiple of 90, in [0, 360)
pub fn snap_to_right_angle(angle: f32) -> f32 {
    normalize_degrees((angle / 90.0).round() * 90.0)
}

/// Parse an "#rrggbb" hex string. Malformed input falls back to white,
/// matching the forgiving behavior of the display layer.
pub fn parse_hex(color: &str) -> [u8; 3] {
    let s = color.trim_start_matches('#');
    if s.len() != 6 {
        return [255, 255, 255];
    }
    let parse = |range: std::ops::Range<usize>| u8::from_str_radix(&s[range], 16);
    match (parse(0..2), parse(2..4), parse(4..6)) {
        (Ok(r), Ok(g), Ok(b)) => [r, g, b],
        _ => [255, 255, 255],
    }
}

/// Format RGB bytes as an "#rrggbb" hex string
pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Linearly interpolate each RGB channel between two hex colors,
/// t clamped to [0, 1]. Returns a hex string.
pub fn lerp_hex(start: &str, end: &str, t: f32) -> String {
    let a = parse_hex(start);
    let b = parse_hex(end);
    let t = t.clamp(0.0, 1.0);
    to_hex([
        lerp_u8(a[0], b[0], t),
        lerp_u8(a[1], b[1], t),
        lerp_u8(a[2], b[2], t),
    ])
}

/// Lerp between two u8 values
fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let result = a as f32 * (1.0 - t) + b as f32 * t;
    result.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        assert_eq!(parse_hex("#287dff"), [0x28, 0x7d, 0xff]);
        assert_eq!(to_hex([0x28, 0x7d, 0xff]), "#287dff");
        assert_eq!(parse_hex("garbage"), [255, 255, 255]);
    }

    #[test]
    fn test_lerp_hex_endpoints() {
        assert_eq!(lerp_hex("#000000", "#ffffff", 0.0), "#000000");
        assert_eq!(lerp_hex("#000000", "#ffffff", 1.0), "#ffffff");
        // Clamped outside [0, 1]
        assert_eq!(lerp_hex("#000000", "#ffffff", 2.0), "#ffffff");
        assert_eq!(lerp_hex("#000000", "#ffffff", -1.0), "#000000");
    }

    #[test]
    fn test_lerp_hex_midpoint_is_linear() {
        let mid = parse_hex(&lerp_hex("#000000", "#ff0000", 0.5));
        assert!((mid[0] as i32 - 127).abs() <= 1);
        assert_eq!(mid[1], 0);
        assert_eq!(mid[2], 0);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(450.0), 90.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
    }

    #[test]
    fn test_snap_to_right_angle() {
        assert_eq!(snap_to_right_angle(44.0), 0.0);
        assert_eq!(snap_to_right_angle(46.0), 90.0);
        assert_eq!(snap_to_right_angle(350.0), 0.0);
        assert_eq!(snap_to_right_angle(-10.0), 0.0);
    }

    #[test]
    fn test_new_object_populates_payload() {
        let trigger = LevelObject::new("a".into(), ObjectKind::Trigger, 3.0, 1.0);
        assert!(trigger.trigger.is_some());
        assert!(trigger.start_pos.is_none());

        let start = LevelObject::new("b".into(), ObjectKind::StartPos, 0.0, 0.0);
        assert!(start.start_pos.is_some());
        assert!(start.trigger.is_none());
        assert!(!start.kind.has_hitbox());
    }
}
