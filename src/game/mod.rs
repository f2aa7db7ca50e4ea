//! Game simulation module
//!
//! The fixed-timestep side of the engine: player physics, collision against
//! the level document, the mode state machine, trigger-driven color effects,
//! the camera, and cosmetic particles. One simulation step runs per display
//! refresh callback; there is no sub-frame stepping.

pub mod camera;
pub mod hitbox;
pub mod mode;
pub mod particles;
pub mod physics;
pub mod player;
pub mod triggers;

pub use camera::Camera;
pub use mode::{GameMode, ScheduledAction, Scheduler};
pub use physics::{SimState, StepEvents};
pub use player::Player;
pub use triggers::{ColorEffect, DisplayColors};

/// Simulation tuning constants. All motion is expressed per frame at the
/// fixed 60 Hz step; pixel units throughout, world y grows upward with the
/// default floor surface at y = 0.
pub mod tuning {
    /// Grid tile size in pixels
    pub const TILE: f32 = 30.0;
    /// Fixed horizontal speed, pixels per step
    pub const STEP_SPEED: f32 = 6.0;
    /// Simulation steps per second
    pub const FRAMES_PER_SEC: f32 = 60.0;

    /// Player half-extent (square hitbox)
    pub const PLAYER_HALF: f32 = TILE * 0.5;
    /// Default spawn when no enabled start position applies
    pub const DEFAULT_SPAWN: (f32, f32) = (0.0, TILE * 0.5);

    // Cube vehicle
    pub const CUBE_GRAVITY: f32 = 0.9;
    pub const CUBE_TERMINAL: f32 = 18.0;
    pub const CUBE_JUMP: f32 = 12.0;
    /// Airborne visual spin, radians per step
    pub const CUBE_SPIN: f32 = 0.12;

    // Ship vehicle
    pub const SHIP_GRAVITY: f32 = 0.35;
    pub const SHIP_THRUST: f32 = 0.7;
    pub const SHIP_TERMINAL: f32 = 8.0;

    /// Landing tolerance floor: previous-frame position may be this far
    /// into the face and still count as a landing
    pub const LANDING_TOLERANCE_MIN: f32 = 5.0;
    /// Horizontal window around the player within which objects are
    /// collision-tested
    pub const COLLISION_MARGIN: f32 = TILE * 4.0;

    /// Ship-mode vertical channel height, in tiles
    pub const CHANNEL_TILES: f32 = 10.0;
    /// Off-screen elevation a disabled ceiling eases toward
    pub const CEILING_OFF: f32 = 10_000.0;
    /// Per-frame easing factor for active floor/ceiling elevations
    pub const ELEVATION_EASE: f32 = 0.1;
    /// Distance beyond floor/ceiling that kills unconditionally
    pub const DEATH_MARGIN: f32 = TILE * 60.0;

    /// Margin past the rightmost object where the finish wall stands
    pub const FINISH_MARGIN: f32 = TILE * 10.0;
    /// The finish wall never sits closer than one viewport width
    pub const MIN_WALL_X: f32 = 1280.0;
    /// Completion animation: travel ease, per-frame shrink, spin rate
    pub const FINISH_EASE: f32 = 0.12;
    pub const FINISH_SHRINK: f32 = 0.90;
    pub const FINISH_SPIN: f32 = 0.3;
    /// Scale below which the completion animation ends
    pub const FINISH_EPSILON: f32 = 0.03;

    /// Observation delay before a verify death resets the attempt
    pub const DEATH_DELAY_FRAMES: u64 = 45;

    // Pad impulses by subtype (blue flips gravity with a guiding push)
    pub const PAD_PINK: f32 = 11.0;
    pub const PAD_YELLOW: f32 = 16.0;
    pub const PAD_RED: f32 = 20.0;
    pub const PAD_BLUE: f32 = 6.0;

    // Orb impulses by subtype (jump-height class, larger than pads' feel
    // because they fire mid-air)
    pub const ORB_PINK: f32 = 9.0;
    pub const ORB_YELLOW: f32 = 12.0;
    pub const ORB_RED: f32 = 15.0;
    pub const ORB_BLUE: f32 = 4.0;
}

/// Player input sampled once per frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// Jump/thrust input currently held
    pub hold: bool,
    /// Fresh press edge this frame
    pub pressed: bool,
}
