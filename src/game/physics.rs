//! Physics and collision engine
//!
//! Advances the player one fixed step per frame against the level
//! document. Landing logic is gravity-direction aware: the engine infers
//! whether the player approached a block's solid face from the previous
//! frame's position (with a speed-proportional tolerance) and either snaps
//! to the face or kills the player; there is no push-out. Pads, orbs, and
//! portals are one-shot per reset, tracked by a used-object id set.

use std::collections::HashSet;

use crate::world::{
    LevelDocument, LevelObject, ObjectKind, OrbKind, PadKind, PortalKind, VehicleMode,
};
use super::hitbox::{object_quad, Quad};
use super::particles::{BurstDef, ParticlePool};
use super::player::Player;
use super::triggers::{self, ColorEffect, DisplayColors};
use super::tuning::*;
use super::FrameInput;

/// What a simulation step reported back to the engine
#[derive(Debug, Clone, Copy, Default)]
pub struct StepEvents {
    /// The player died this step (first death only; kills are idempotent)
    pub died: bool,
    /// The completion animation finished this step
    pub completed: bool,
}

/// Per-run simulation state. Re-created on every player reset.
#[derive(Debug)]
pub struct SimState {
    pub player: Player,

    /// Eased active floor/ceiling elevations and their targets. The active
    /// value moves 10% of the way toward its target every frame.
    pub active_floor: f32,
    pub floor_target: f32,
    pub active_ceiling: f32,
    pub ceiling_target: f32,
    /// Ceiling participates in collision (ship channel, reversed cube rest)
    pub ceiling_on: bool,
    /// Ceiling is easing off-screen before being fully retired
    ceiling_retiring: bool,

    /// Pads/orbs/portals already consumed this run
    pub used_ids: HashSet<String>,
    /// Triggers already fired this run
    pub fired_triggers: HashSet<String>,

    /// X coordinate of the verify finish wall, computed at reset
    pub finish_wall_x: f32,
    /// This run is a verification pass; only verify runs finish at the wall
    verify: bool,

    /// Held input has been consumed since it was last released
    /// (cube orb gating and ground-jump repeat suppression)
    hold_consumed: bool,
}

impl SimState {
    /// Reset for a new run. Spawn comes from the document's default spawn
    /// in verify mode, otherwise from the best enabled start position
    /// (ascending grid x, most recently placed wins ties).
    pub fn reset(doc: &LevelDocument, for_verify: bool) -> Self {
        let start = if for_verify { None } else { doc.best_start_pos() };
        let player = match start {
            Some((obj, data)) => {
                Player::spawn(obj.x * TILE, obj.y * TILE, data.mode, data.reverse_gravity)
            }
            None => Player::spawn(
                DEFAULT_SPAWN.0,
                DEFAULT_SPAWN.1,
                doc.settings.start_mode,
                doc.settings.start_reverse_gravity,
            ),
        };

        let finish_wall_x = doc
            .rightmost_x()
            .map(|x| (x + 1.0) * TILE + FINISH_MARGIN)
            .unwrap_or(0.0)
            .max(MIN_WALL_X);

        // A ship spawn gets its vertical channel pre-sized instead of
        // easing in from nothing.
        let ship = player.vehicle == VehicleMode::Ship;
        let ceiling = if ship { CHANNEL_TILES * TILE } else { CEILING_OFF };

        Self {
            player,
            active_floor: 0.0,
            floor_target: 0.0,
            active_ceiling: ceiling,
            ceiling_target: ceiling,
            ceiling_on: ship,
            ceiling_retiring: false,
            used_ids: HashSet::new(),
            fired_triggers: HashSet::new(),
            finish_wall_x,
            verify: for_verify,
            hold_consumed: false,
        }
    }

    /// Advance one fixed step. Runs only in Playtest and Verify.
    pub fn step(
        &mut self,
        doc: &LevelDocument,
        input: FrameInput,
        frame: u64,
        colors: &mut DisplayColors,
        effects: &mut Vec<ColorEffect>,
        particles: &mut ParticlePool,
    ) -> StepEvents {
        let mut events = StepEvents::default();
        if self.player.dead {
            return events;
        }
        if self.player.finished {
            self.finish_step(&mut events);
            return events;
        }

        let prev_y = self.player.y;
        if !input.hold {
            self.hold_consumed = false;
        }

        self.ease_elevations();

        // Fixed horizontal advance, no acceleration
        self.player.x += STEP_SPEED;

        self.integrate_vertical(input);
        self.player.y += self.player.vy;

        let mut killed = self.resolve_bounds();

        // Positional triggers fire on x-crossing regardless of overlap
        for obj in &doc.objects {
            let Some(data) = &obj.trigger else { continue };
            if data.touch_trigger || self.fired_triggers.contains(&obj.id) {
                continue;
            }
            if triggers::crossed(triggers::trigger_x(obj.x), self.player.x) {
                self.fired_triggers.insert(obj.id.clone());
                triggers::fire(data, colors, effects, frame);
            }
        }

        // Object collision, only within a horizontal margin of the player
        if !killed {
            killed = self.collide_objects(doc, input, prev_y, frame, colors, effects, particles);
        }

        // Death boundary: a safety net against infinite fall
        let upper = if self.ceiling_on {
            self.active_ceiling
        } else {
            CHANNEL_TILES * TILE
        };
        if self.player.y < self.active_floor - DEATH_MARGIN
            || self.player.y > upper + DEATH_MARGIN
        {
            killed = true;
        }

        if killed {
            events.died = self.kill(particles);
            return events;
        }

        // Finish wall, verification runs only
        if self.verify && self.player.x >= self.finish_wall_x {
            self.player.finished = true;
        }

        events
    }

    /// Mark the player dead. Idempotent: a second call is a no-op.
    /// Returns true only on the first call.
    pub fn kill(&mut self, particles: &mut ParticlePool) -> bool {
        if self.player.dead {
            return false;
        }
        self.player.dead = true;
        particles.spawn_burst(&BurstDef::death("#00e0a0"), self.player.x, self.player.y);
        true
    }

    /// Per-vehicle vertical integration and jump input
    fn integrate_vertical(&mut self, input: FrameInput) {
        let p = &mut self.player;
        match p.vehicle {
            VehicleMode::Cube => {
                // Grounded jump: any held input applies the impulse at once
                if p.on_ground && input.hold {
                    p.vy = CUBE_JUMP * p.up_dir();
                    p.on_ground = false;
                    self.hold_consumed = true;
                }
                p.vy += CUBE_GRAVITY * p.gravity_dir();
                p.vy = p.vy.clamp(-CUBE_TERMINAL, CUBE_TERMINAL);
                if !p.on_ground {
                    p.rotation -= CUBE_SPIN * p.up_dir();
                }
            }
            VehicleMode::Ship => {
                p.vy += SHIP_GRAVITY * p.gravity_dir();
                if input.hold {
                    p.vy += SHIP_THRUST * p.up_dir();
                }
                p.vy = p.vy.clamp(-SHIP_TERMINAL, SHIP_TERMINAL);
                // Nose tilt follows the velocity vector
                p.rotation = (p.vy / STEP_SPEED).atan();
                p.on_ground = false;
            }
        }
    }

    /// Ease active floor/ceiling toward their targets; retire a ceiling
    /// once it has eased far enough off-screen.
    fn ease_elevations(&mut self) {
        self.active_floor += (self.floor_target - self.active_floor) * ELEVATION_EASE;
        self.active_ceiling += (self.ceiling_target - self.active_ceiling) * ELEVATION_EASE;
        if self.ceiling_retiring && self.active_ceiling > CEILING_OFF * 0.9 {
            self.ceiling_on = false;
            self.ceiling_retiring = false;
        }
    }

    /// Floor/ceiling collision (no blocks involved).
    /// Returns true when the contact is fatal.
    fn resolve_bounds(&mut self) -> bool {
        let half = self.player.scaled_half();
        match self.player.vehicle {
            VehicleMode::Cube => {
                if !self.player.gravity_reversed {
                    if self.player.bottom() <= self.active_floor {
                        self.player.y = self.active_floor + half;
                        self.player.vy = 0.0;
                        self.player.on_ground = true;
                        self.player.rotation = 0.0;
                    }
                } else {
                    // Reversed cube rests on an enabled ceiling...
                    if self.ceiling_on && self.player.top() >= self.active_ceiling {
                        self.player.y = self.active_ceiling - half;
                        self.player.vy = 0.0;
                        self.player.on_ground = true;
                        self.player.rotation = 0.0;
                    }
                    // ...and dies if it nonetheless reaches the normal floor
                    if self.player.bottom() <= self.active_floor {
                        return true;
                    }
                }
            }
            VehicleMode::Ship => {
                // Symmetric clamp against both active elevations
                if self.player.bottom() < self.active_floor {
                    self.player.y = self.active_floor + half;
                    self.player.vy = self.player.vy.max(0.0);
                }
                if self.ceiling_on && self.player.top() > self.active_ceiling {
                    self.player.y = self.active_ceiling - half;
                    self.player.vy = self.player.vy.min(0.0);
                }
            }
        }
        false
    }

    /// Test and resolve overlap with every nearby collidable object.
    /// Returns true when the player must die.
    #[allow(clippy::too_many_arguments)]
    fn collide_objects(
        &mut self,
        doc: &LevelDocument,
        input: FrameInput,
        prev_y: f32,
        frame: u64,
        colors: &mut DisplayColors,
        effects: &mut Vec<ColorEffect>,
        particles: &mut ParticlePool,
    ) -> bool {
        for obj in &doc.objects {
            if !obj.kind.has_hitbox() {
                continue;
            }
            if ((obj.x + 0.5) * TILE - self.player.x).abs() > COLLISION_MARGIN {
                continue;
            }
            let Some(quad) = object_quad(obj) else { continue };
            if !quad.overlaps_aabb(&self.player.aabb()) {
                continue;
            }

            match obj.kind {
                ObjectKind::Spike(_) => return true,
                ObjectKind::Block(_) => {
                    if self.resolve_block(&quad, prev_y) {
                        return true;
                    }
                }
                ObjectKind::Pad(kind) => self.hit_pad(obj, kind, particles),
                ObjectKind::Orb(kind) => self.hit_orb(obj, kind, input, particles),
                ObjectKind::Portal(kind) => self.hit_portal(obj, kind),
                ObjectKind::Trigger => {
                    // Touch triggers fire on overlap, then the object is
                    // skipped for gameplay collision
                    if let Some(data) = &obj.trigger {
                        if data.touch_trigger && !self.fired_triggers.contains(&obj.id) {
                            self.fired_triggers.insert(obj.id.clone());
                            triggers::fire(data, colors, effects, frame);
                        }
                    }
                }
                ObjectKind::Deco(_) | ObjectKind::StartPos => {}
            }

            if self.player.dead {
                return true;
            }
        }
        false
    }

    /// Block contact: land on the gravity-appropriate face if the previous
    /// frame's position was consistent with approaching it, otherwise die.
    /// Slab sub-faces fall out of the rotated hitbox extents (a slab at
    /// rotation 180 presents its solid face at the tile middle).
    /// Returns true when the contact is fatal.
    fn resolve_block(&mut self, quad: &Quad, prev_y: f32) -> bool {
        let p = &mut self.player;
        let half = p.scaled_half();
        let tol = LANDING_TOLERANCE_MIN.max(p.vy.abs());
        let ship = p.vehicle == VehicleMode::Ship;

        if !p.gravity_reversed {
            let top = quad.top();
            let was_above = prev_y - half >= top - tol;
            if was_above && p.vy <= 0.0 {
                p.y = top + half;
                p.vy = 0.0;
                if !ship {
                    p.on_ground = true;
                    p.rotation = snap_rotation(p.rotation);
                }
                return false;
            }
        } else {
            let bottom = quad.bottom();
            let was_below = prev_y + half <= bottom + tol;
            if was_below && p.vy >= 0.0 {
                p.y = bottom - half;
                p.vy = 0.0;
                if !ship {
                    p.on_ground = true;
                    p.rotation = snap_rotation(p.rotation);
                }
                return false;
            }
        }
        // Side or corner impact is fatal; there is no push-out
        true
    }

    /// Pads fire once per reset on overlap, no input needed
    fn hit_pad(&mut self, obj: &LevelObject, kind: PadKind, particles: &mut ParticlePool) {
        if !self.used_ids.insert(obj.id.clone()) {
            return;
        }
        let p = &mut self.player;
        match kind {
            PadKind::Blue => {
                p.gravity_reversed = !p.gravity_reversed;
                p.vy = PAD_BLUE * p.up_dir();
            }
            PadKind::Pink => p.vy = PAD_PINK * p.up_dir(),
            PadKind::Yellow => p.vy = PAD_YELLOW * p.up_dir(),
            PadKind::Red => p.vy = PAD_RED * p.up_dir(),
        }
        p.on_ground = false;
        particles.spawn_burst(&BurstDef::boost(), p.x, p.y);
    }

    /// Orbs are one-shot like pads but additionally gated on activation
    /// input: ship on a fresh press edge, cube on held input not yet
    /// consumed since it was last released.
    fn hit_orb(
        &mut self,
        obj: &LevelObject,
        kind: OrbKind,
        input: FrameInput,
        particles: &mut ParticlePool,
    ) {
        if self.used_ids.contains(&obj.id) {
            return;
        }
        let activated = match self.player.vehicle {
            VehicleMode::Ship => input.pressed,
            VehicleMode::Cube => input.hold && !self.hold_consumed,
        };
        if !activated {
            return;
        }
        self.used_ids.insert(obj.id.clone());
        self.hold_consumed = true;

        let p = &mut self.player;
        match kind {
            OrbKind::Blue => {
                p.gravity_reversed = !p.gravity_reversed;
                // Small guiding impulse toward the new floor
                p.vy = ORB_BLUE * p.gravity_dir();
            }
            OrbKind::Pink => p.vy = ORB_PINK * p.up_dir(),
            OrbKind::Yellow => p.vy = ORB_YELLOW * p.up_dir(),
            OrbKind::Red => p.vy = ORB_RED * p.up_dir(),
        }
        p.on_ground = false;
        particles.spawn_burst(&BurstDef::boost(), p.x, p.y);
    }

    /// Portals apply instantly to vehicle/gravity state; floor and ceiling
    /// elevation changes ease in over subsequent frames.
    fn hit_portal(&mut self, obj: &LevelObject, kind: PortalKind) {
        if !self.used_ids.insert(obj.id.clone()) {
            return;
        }
        match kind {
            PortalKind::Cube => {
                self.player.vehicle = VehicleMode::Cube;
                self.floor_target = 0.0;
                self.ceiling_target = CEILING_OFF;
                self.ceiling_retiring = self.ceiling_on;
            }
            PortalKind::Ship => {
                self.player.vehicle = VehicleMode::Ship;
                let row = obj.y + 0.5;
                // Channel from the ground up, unless the portal sits near
                // the channel top: then center the channel on its row
                self.floor_target = if row > CHANNEL_TILES - 2.0 {
                    (row - CHANNEL_TILES / 2.0) * TILE
                } else {
                    0.0
                };
                self.ceiling_target = self.floor_target + CHANNEL_TILES * TILE;
                self.ceiling_on = true;
                self.ceiling_retiring = false;
            }
            PortalKind::GravityReverse => self.player.gravity_reversed = true,
            PortalKind::GravityNormal => self.player.gravity_reversed = false,
            PortalKind::GravityFlip => {
                self.player.gravity_reversed = !self.player.gravity_reversed
            }
        }
    }

    /// Completion animation: ease toward the wall, shrink, and spin until
    /// negligibly small.
    fn finish_step(&mut self, events: &mut StepEvents) {
        let p = &mut self.player;
        p.x += (self.finish_wall_x - p.x) * FINISH_EASE;
        p.scale *= FINISH_SHRINK;
        p.rotation += FINISH_SPIN;
        if p.scale < FINISH_EPSILON {
            events.completed = true;
        }
    }
}

/// Snap a rotation in radians to the nearest right angle
fn snap_rotation(rotation: f32) -> f32 {
    let quarter = std::f32::consts::FRAC_PI_2;
    (rotation / quarter).round() * quarter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{BlockKind, LevelSettings, SpikeKind, StartPosData, TriggerData, TriggerTarget};

    struct Harness {
        doc: LevelDocument,
        sim: SimState,
        colors: DisplayColors,
        effects: Vec<ColorEffect>,
        particles: ParticlePool,
        frame: u64,
    }

    impl Harness {
        fn new(doc: LevelDocument, for_verify: bool) -> Self {
            let sim = SimState::reset(&doc, for_verify);
            let colors = DisplayColors::from_settings(&doc.settings);
            Self {
                doc,
                sim,
                colors,
                effects: Vec::new(),
                particles: ParticlePool::new(),
                frame: 0,
            }
        }

        fn step(&mut self, input: FrameInput) -> StepEvents {
            let events = self.sim.step(
                &self.doc,
                input,
                self.frame,
                &mut self.colors,
                &mut self.effects,
                &mut self.particles,
            );
            self.frame += 1;
            events
        }
    }

    fn obj(id: &str, kind: ObjectKind, x: f32, y: f32) -> LevelObject {
        LevelObject::new(id.to_string(), kind, x, y)
    }

    fn doc_with(objects: Vec<LevelObject>) -> LevelDocument {
        LevelDocument {
            settings: LevelSettings::default(),
            objects,
        }
    }

    const HOLD: FrameInput = FrameInput { hold: true, pressed: true };
    const IDLE: FrameInput = FrameInput { hold: false, pressed: false };

    #[test]
    fn test_cube_lands_square_on_block_top() {
        let block = obj("b", ObjectKind::Block(BlockKind::Solid), 3.0, 0.0);
        let mut h = Harness::new(doc_with(vec![block]), false);

        // Place the player just above the block's top face, descending
        h.sim.player.x = 3.5 * TILE - STEP_SPEED;
        h.sim.player.y = TILE + h.sim.player.half + 3.0;
        h.sim.player.vy = -4.0;
        h.sim.player.on_ground = false;

        let events = h.step(IDLE);
        assert!(!events.died);
        assert!(h.sim.player.on_ground);
        assert_eq!(h.sim.player.vy, 0.0);
        assert_eq!(h.sim.player.rotation, 0.0);
        assert!((h.sim.player.bottom() - TILE).abs() < 1e-3);
    }

    #[test]
    fn test_cube_side_impact_on_block_is_fatal() {
        let block = obj("b", ObjectKind::Block(BlockKind::Solid), 3.0, 0.0);
        let mut h = Harness::new(doc_with(vec![block]), false);

        // Grounded, approaching the block's left face at its own height
        h.sim.player.x = 3.0 * TILE - h.sim.player.half - 2.0;
        h.sim.player.y = 0.5 * TILE;
        h.sim.player.on_ground = true;

        let events = h.step(IDLE);
        assert!(events.died);
        assert!(h.sim.player.dead);
    }

    #[test]
    fn test_spike_overlap_kills() {
        let spike = obj("s", ObjectKind::Spike(SpikeKind::Large), 2.0, 0.0);
        let mut h = Harness::new(doc_with(vec![spike]), false);
        h.sim.player.x = 2.5 * TILE - STEP_SPEED;
        h.sim.player.y = 0.5 * TILE;

        let events = h.step(IDLE);
        assert!(events.died);
        // Kill is idempotent: stepping dead reports nothing new
        let again = h.step(IDLE);
        assert!(!again.died);
    }

    #[test]
    fn test_reversed_cube_dies_on_normal_floor() {
        let mut h = Harness::new(doc_with(vec![]), false);
        h.sim.player.gravity_reversed = true;
        h.sim.player.on_ground = false;
        h.sim.player.y = h.sim.player.half + 1.0;
        h.sim.player.vy = -6.0;

        let events = h.step(IDLE);
        assert!(events.died);
    }

    #[test]
    fn test_grounded_jump_applies_impulse_once() {
        let mut h = Harness::new(doc_with(vec![]), false);
        assert!(h.sim.player.on_ground);

        h.step(HOLD);
        assert!(!h.sim.player.on_ground);
        assert!(h.sim.player.vy > 0.0);
        let vy_after_jump = h.sim.player.vy;

        // Airborne frames only accumulate gravity
        h.step(HOLD);
        assert!(h.sim.player.vy < vy_after_jump);
    }

    #[test]
    fn test_pad_is_one_shot_per_reset() {
        let pad = obj("p", ObjectKind::Pad(PadKind::Yellow), 2.0, 0.0);
        let mut h = Harness::new(doc_with(vec![pad]), false);
        h.sim.player.x = 2.5 * TILE - STEP_SPEED;
        h.sim.player.y = 0.5 * TILE;

        h.step(IDLE);
        assert!(h.sim.player.vy > CUBE_JUMP);
        assert!(h.sim.used_ids.contains("p"));

        // Force a re-overlap: the pad must not fire again
        h.sim.player.x = 2.5 * TILE - STEP_SPEED;
        h.sim.player.y = 0.2 * TILE;
        h.sim.player.vy = 0.0;
        h.sim.player.on_ground = false;
        h.step(IDLE);
        assert!(h.sim.player.vy < PAD_YELLOW);
    }

    #[test]
    fn test_blue_pad_reverses_gravity() {
        let pad = obj("p", ObjectKind::Pad(PadKind::Blue), 2.0, 0.0);
        let mut h = Harness::new(doc_with(vec![pad]), false);
        h.sim.player.x = 2.5 * TILE - STEP_SPEED;
        h.sim.player.y = 0.5 * TILE;

        h.step(IDLE);
        assert!(h.sim.player.gravity_reversed);
    }

    #[test]
    fn test_cube_orb_requires_unconsumed_hold() {
        let orb = obj("o", ObjectKind::Orb(OrbKind::Yellow), 4.0, 3.0);
        let mut h = Harness::new(doc_with(vec![orb]), false);

        // Drift through the orb without input: nothing happens
        h.sim.player.x = 4.5 * TILE - STEP_SPEED;
        h.sim.player.y = 3.5 * TILE;
        h.sim.player.vy = 0.0;
        h.sim.player.on_ground = false;
        h.step(IDLE);
        assert!(!h.sim.used_ids.contains("o"));

        // Same overlap with held input activates it
        h.sim.player.x = 4.5 * TILE - STEP_SPEED;
        h.sim.player.y = 3.5 * TILE;
        h.step(FrameInput { hold: true, pressed: false });
        assert!(h.sim.used_ids.contains("o"));
        assert!(h.sim.player.vy > 0.0);
    }

    #[test]
    fn test_ship_portal_sets_channel_targets_that_ease() {
        let portal = obj("pt", ObjectKind::Portal(PortalKind::Ship), 2.0, 1.0);
        let mut h = Harness::new(doc_with(vec![portal]), false);
        h.sim.player.x = 2.5 * TILE - STEP_SPEED;
        h.sim.player.y = 1.5 * TILE;
        h.sim.player.on_ground = false;
        h.sim.player.vy = 0.0;

        h.step(IDLE);
        assert_eq!(h.sim.player.vehicle, VehicleMode::Ship);
        assert!(h.sim.ceiling_on);
        assert_eq!(h.sim.ceiling_target, CHANNEL_TILES * TILE);
        // The active ceiling has not snapped; it eases toward the target
        assert!(h.sim.active_ceiling > h.sim.ceiling_target);

        let before = h.sim.active_ceiling;
        h.step(IDLE);
        assert!(h.sim.active_ceiling < before);
    }

    #[test]
    fn test_reset_uses_best_start_pos_outside_verify() {
        let mut sp = obj("sp", ObjectKind::StartPos, 0.0, 5.0);
        sp.start_pos = Some(StartPosData {
            mode: VehicleMode::Ship,
            reverse_gravity: false,
            enabled: true,
        });
        let doc = doc_with(vec![sp]);

        let sim = SimState::reset(&doc, false);
        assert_eq!(sim.player.vehicle, VehicleMode::Ship);
        assert!(!sim.player.gravity_reversed);
        assert!(sim.player.on_ground);
        assert_eq!(sim.player.x, 0.0);
        assert_eq!(sim.player.y, 5.0 * TILE);

        // Verify ignores alternate spawns
        let verify = SimState::reset(&doc, true);
        assert_eq!(verify.player.vehicle, VehicleMode::Cube);
        assert_eq!(verify.player.y, DEFAULT_SPAWN.1);
    }

    #[test]
    fn test_start_pos_tie_break_prefers_most_recent() {
        let a = obj("a", ObjectKind::StartPos, 3.0, 0.0);
        let b = obj("b", ObjectKind::StartPos, 3.0, 2.0);
        let doc = doc_with(vec![a, b]);
        let sim = SimState::reset(&doc, false);
        assert_eq!(sim.player.y, 2.0 * TILE);
    }

    #[test]
    fn test_finish_shrinks_until_complete() {
        let mut h = Harness::new(doc_with(vec![]), true);
        h.sim.player.x = h.sim.finish_wall_x + 1.0;
        h.sim.player.finished = true;

        let mut completions = 0;
        for _ in 0..200 {
            if h.step(IDLE).completed {
                completions += 1;
            }
        }
        assert!(completions >= 1);
        assert!(h.sim.player.scale < FINISH_EPSILON);
    }

    #[test]
    fn test_crossing_finish_wall_marks_finished() {
        let mut h = Harness::new(doc_with(vec![]), true);
        h.sim.player.x = h.sim.finish_wall_x - STEP_SPEED * 0.5;
        h.step(IDLE);
        assert!(h.sim.player.finished);
    }

    #[test]
    fn test_playtest_run_passes_the_wall_unfinished() {
        let mut h = Harness::new(doc_with(vec![]), false);
        h.sim.player.x = h.sim.finish_wall_x - STEP_SPEED * 0.5;
        h.step(IDLE);
        h.step(IDLE);
        assert!(!h.sim.player.finished);
        assert!(h.sim.player.x > h.sim.finish_wall_x);
    }

    #[test]
    fn test_death_boundary_catches_infinite_fall() {
        let mut h = Harness::new(doc_with(vec![]), false);
        h.sim.player.gravity_reversed = true;
        h.sim.player.on_ground = false;
        h.sim.player.y = CHANNEL_TILES * TILE + DEATH_MARGIN + 10.0;
        let events = h.step(IDLE);
        assert!(events.died);
    }

    #[test]
    fn test_positional_trigger_fires_once() {
        let mut t = obj("t", ObjectKind::Trigger, 1.0, 3.0);
        t.trigger = Some(TriggerData {
            target: TriggerTarget::Ground,
            color: "#112233".to_string(),
            duration: 0.0,
            touch_trigger: false,
        });
        let mut h = Harness::new(doc_with(vec![t]), false);
        h.sim.player.x = triggers::trigger_x(1.0) - STEP_SPEED * 0.5;

        h.step(IDLE);
        assert_eq!(h.colors.ground, "#112233");
        assert!(h.sim.fired_triggers.contains("t"));
    }
}
