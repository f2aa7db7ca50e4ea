//! Player entity
//!
//! Transient simulation state, re-created on every reset and never
//! persisted. Position is the hitbox center in pixel space, world y up.

use crate::world::VehicleMode;
use super::hitbox::Aabb;
use super::tuning;

#[derive(Debug, Clone)]
pub struct Player {
    /// Hitbox center, pixels
    pub x: f32,
    pub y: f32,
    /// Vertical velocity, pixels per step (horizontal speed is fixed)
    pub vy: f32,
    /// Visual rotation, radians
    pub rotation: f32,
    /// Half-extent of the square hitbox
    pub half: f32,
    /// Shrink factor during the completion animation
    pub scale: f32,
    pub on_ground: bool,
    pub dead: bool,
    pub finished: bool,
    pub vehicle: VehicleMode,
    pub gravity_reversed: bool,
}

impl Player {
    pub fn spawn(x: f32, y: f32, vehicle: VehicleMode, gravity_reversed: bool) -> Self {
        Self {
            x,
            y,
            vy: 0.0,
            rotation: 0.0,
            half: tuning::PLAYER_HALF,
            scale: 1.0,
            on_ground: true,
            dead: false,
            finished: false,
            vehicle,
            gravity_reversed,
        }
    }

    /// Direction gravity pulls: -1 toward the floor, +1 toward the ceiling
    pub fn gravity_dir(&self) -> f32 {
        if self.gravity_reversed { 1.0 } else { -1.0 }
    }

    /// Direction opposing gravity (jump/boost direction)
    pub fn up_dir(&self) -> f32 {
        -self.gravity_dir()
    }

    /// Current scaled half-extent
    pub fn scaled_half(&self) -> f32 {
        self.half * self.scale
    }

    /// The player's axis-aligned hitbox
    pub fn aabb(&self) -> Aabb {
        let h = self.scaled_half();
        Aabb::from_center(self.x, self.y, h, h)
    }

    pub fn bottom(&self) -> f32 {
        self.y - self.scaled_half()
    }

    pub fn top(&self) -> f32 {
        self.y + self.scaled_half()
    }
}
