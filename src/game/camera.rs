//! Camera
//!
//! Derives a view transform from player position (play modes) or editor
//! panning (editor mode). Peripheral to the engine contract: nothing in
//! the simulation depends on it except the editor color preview, which
//! reads the horizontal center.

use super::player::Player;
use super::tuning::TILE;

/// Horizontal player lead: the player rides this far left of center
const FOLLOW_LEAD: f32 = 200.0;
/// Vertical dead zone before the camera starts easing toward the player
const FOLLOW_DEADZONE: f32 = TILE * 3.0;
/// Per-frame vertical easing factor
const FOLLOW_EASE: f32 = 0.08;

/// World-space camera, pixel units. `x`/`y` are the view center.
#[derive(Debug, Clone)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    pub zoom: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            x: FOLLOW_LEAD,
            y: TILE * 5.0,
            zoom: 1.0,
        }
    }

    /// Editor panning
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.x += dx / self.zoom;
        self.y += dy / self.zoom;
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(0.25, 4.0);
    }

    /// Follow the player: locked horizontal lead, eased vertical tracking
    /// outside a dead zone.
    pub fn follow(&mut self, player: &Player) {
        self.x = player.x + FOLLOW_LEAD;
        let dy = player.y - self.y;
        if dy.abs() > FOLLOW_DEADZONE {
            let excess = dy - FOLLOW_DEADZONE * dy.signum();
            self.y += excess * FOLLOW_EASE;
        }
    }

    /// Snap behind a freshly reset player
    pub fn snap_to(&mut self, player: &Player) {
        self.x = player.x + FOLLOW_LEAD;
        self.y = player.y.max(TILE * 5.0);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
