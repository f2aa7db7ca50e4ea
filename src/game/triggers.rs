//! Trigger and color-effect system
//!
//! Triggers schedule ambient color changes. Positional triggers fire once
//! the player's horizontal center crosses the trigger's x (tested with a
//! crossing window one step wide); touch triggers fire on hitbox overlap.
//! Each fires at most once per player reset. Firing either snaps the
//! display color (duration zero) or enqueues a timed linear interpolation
//! from the channel's *current* display color.

use crate::world::{lerp_hex, LevelDocument, LevelSettings, TriggerData, TriggerTarget};
use super::tuning::{FRAMES_PER_SEC, STEP_SPEED, TILE};

/// The currently rendered color set, distinct from the document's base
/// settings. Mutated continuously by active effects; reset from settings
/// on player reset.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayColors {
    pub bg_top: String,
    pub bg_bottom: String,
    pub ground: String,
    pub line: String,
}

impl DisplayColors {
    pub fn from_settings(settings: &LevelSettings) -> Self {
        Self {
            bg_top: settings.color_for(TriggerTarget::BgTop).to_string(),
            bg_bottom: settings.color_for(TriggerTarget::BgBottom).to_string(),
            ground: settings.color_for(TriggerTarget::Ground).to_string(),
            line: settings.color_for(TriggerTarget::Line).to_string(),
        }
    }

    pub fn get(&self, target: TriggerTarget) -> &str {
        match target {
            TriggerTarget::BgTop => &self.bg_top,
            TriggerTarget::BgBottom => &self.bg_bottom,
            TriggerTarget::Ground => &self.ground,
            TriggerTarget::Line => &self.line,
        }
    }

    pub fn set(&mut self, target: TriggerTarget, color: String) {
        match target {
            TriggerTarget::BgTop => self.bg_top = color,
            TriggerTarget::BgBottom => self.bg_bottom = color,
            TriggerTarget::Ground => self.ground = color,
            TriggerTarget::Line => self.line = color,
        }
    }
}

/// A live color interpolation
#[derive(Debug, Clone)]
pub struct ColorEffect {
    pub target: TriggerTarget,
    pub start_color: String,
    pub end_color: String,
    pub start_frame: u64,
    pub duration_frames: f32,
}

impl ColorEffect {
    /// Elapsed/duration clamped to [0, 1]
    fn progress(&self, frame: u64) -> f32 {
        let elapsed = frame.saturating_sub(self.start_frame) as f32;
        if self.duration_frames <= 0.0 {
            1.0
        } else {
            (elapsed / self.duration_frames).clamp(0.0, 1.0)
        }
    }

    pub fn expired(&self, frame: u64) -> bool {
        frame.saturating_sub(self.start_frame) as f32 >= self.duration_frames
    }

    pub fn color_at(&self, frame: u64) -> String {
        lerp_hex(&self.start_color, &self.end_color, self.progress(frame))
    }
}

/// The world-space x at which a trigger fires (tile center)
pub fn trigger_x(x: f32) -> f32 {
    (x + 0.5) * TILE
}

/// Did the player's center cross `tx` during the step ending at `x`?
/// The window is exactly one step of horizontal travel.
pub fn crossed(tx: f32, x: f32) -> bool {
    x >= tx && x - STEP_SPEED < tx
}

/// Fire a trigger: snap instantly at duration zero, otherwise enqueue an
/// effect interpolating from the channel's current display color.
pub fn fire(
    data: &TriggerData,
    colors: &mut DisplayColors,
    effects: &mut Vec<ColorEffect>,
    frame: u64,
) {
    if data.duration <= 0.0 {
        colors.set(data.target, data.color.clone());
        return;
    }
    effects.push(ColorEffect {
        target: data.target,
        start_color: colors.get(data.target).to_string(),
        end_color: data.color.clone(),
        start_frame: frame,
        duration_frames: data.duration * FRAMES_PER_SEC,
    });
}

/// Advance every live effect one frame: write the interpolated color into
/// the display set and drop expired effects.
pub fn update_effects(effects: &mut Vec<ColorEffect>, colors: &mut DisplayColors, frame: u64) {
    for effect in effects.iter() {
        colors.set(effect.target, effect.color_at(frame));
    }
    effects.retain(|e| !e.expired(frame));
}

/// Editor-mode preview: the colors the level would display at the camera's
/// horizontal center, computed by scanning all non-touch triggers left of
/// that point in ascending-x order against the document's base settings.
/// A preview, never persisted.
pub fn preview_colors(doc: &LevelDocument, camera_x: f32) -> DisplayColors {
    let mut colors = DisplayColors::from_settings(&doc.settings);

    let mut fired: Vec<(&f32, &TriggerData)> = doc
        .objects
        .iter()
        .filter_map(|o| {
            let data = o.trigger.as_ref()?;
            (!data.touch_trigger && trigger_x(o.x) <= camera_x).then_some((&o.x, data))
        })
        .collect();
    fired.sort_by(|a, b| a.0.partial_cmp(b.0).unwrap_or(std::cmp::Ordering::Equal));

    for (x, data) in fired {
        let elapsed_frames = (camera_x - trigger_x(*x)) / STEP_SPEED;
        let duration_frames = data.duration * FRAMES_PER_SEC;
        let t = if duration_frames <= 0.0 {
            1.0
        } else {
            (elapsed_frames / duration_frames).clamp(0.0, 1.0)
        };
        let blended = lerp_hex(colors.get(data.target), &data.color, t);
        colors.set(data.target, blended);
    }

    colors
}
