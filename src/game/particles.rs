//! Particle system
//!
//! Cosmetic effects using a fixed-size pool. Bursts are fire-and-forget:
//! gameplay events spawn them but never depend on them. Rendering reads
//! the pool; simulation only ages and integrates it.

use crate::world::parse_hex;

/// Maximum number of live particles
pub const MAX_PARTICLES: usize = 256;

/// A single particle in the pool
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    /// World position, pixels
    pub x: f32,
    pub y: f32,
    /// Velocity, pixels per frame
    pub vx: f32,
    pub vy: f32,
    /// Remaining life in frames
    pub life: f32,
    /// Total lifetime (for color interpolation)
    pub max_life: f32,
    /// Start color (RGB 0-255)
    pub color_start: [u8; 3],
    /// End color (RGB 0-255)
    pub color_end: [u8; 3],
    /// Radius in pixels
    pub size: f32,
    /// Is this particle slot active?
    pub alive: bool,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            life: 0.0,
            max_life: 1.0,
            color_start: [255, 255, 255],
            color_end: [128, 128, 128],
            size: 2.0,
            alive: false,
        }
    }
}

/// Burst parameters for one-shot effects
#[derive(Debug, Clone, Copy)]
pub struct BurstDef {
    pub count: usize,
    pub speed_min: f32,
    pub speed_max: f32,
    /// Per-frame downward pull applied to particles
    pub gravity: f32,
    pub life_min: f32,
    pub life_max: f32,
    pub color_start: [u8; 3],
    pub color_end: [u8; 3],
    pub size: f32,
}

impl BurstDef {
    /// Death explosion in the player's color
    pub fn death(color: &str) -> Self {
        Self {
            count: 40,
            speed_min: 2.0,
            speed_max: 7.0,
            gravity: 0.15,
            life_min: 20.0,
            life_max: 45.0,
            color_start: parse_hex(color),
            color_end: [40, 40, 40],
            size: 3.0,
        }
    }

    /// Pad or orb activation flash
    pub fn boost() -> Self {
        Self {
            count: 12,
            speed_min: 1.0,
            speed_max: 4.0,
            gravity: 0.05,
            life_min: 10.0,
            life_max: 22.0,
            color_start: [255, 240, 120],
            color_end: [255, 120, 0],
            size: 2.0,
        }
    }
}

/// Fixed-capacity pool of live particles
pub struct ParticlePool {
    pub particles: [Particle; MAX_PARTICLES],
    /// Simple PRNG state for randomization
    rng_state: u32,
}

impl ParticlePool {
    pub fn new() -> Self {
        Self {
            particles: [Particle::default(); MAX_PARTICLES],
            rng_state: 12345,
        }
    }

    /// Fast xorshift PRNG (no external deps, deterministic)
    fn next_random(&mut self) -> f32 {
        self.rng_state ^= self.rng_state << 13;
        self.rng_state ^= self.rng_state >> 17;
        self.rng_state ^= self.rng_state << 5;
        (self.rng_state as f32) / (u32::MAX as f32)
    }

    fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_random() * (max - min)
    }

    fn find_free_slot(&self) -> Option<usize> {
        self.particles.iter().position(|p| !p.alive)
    }

    /// Spawn a burst of particles radiating from a point
    pub fn spawn_burst(&mut self, def: &BurstDef, x: f32, y: f32) {
        for _ in 0..def.count {
            let Some(idx) = self.find_free_slot() else { return };
            let speed = self.random_range(def.speed_min, def.speed_max);
            let angle = self.random_range(0.0, std::f32::consts::TAU);
            let life = self.random_range(def.life_min, def.life_max);
            self.particles[idx] = Particle {
                x,
                y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                life,
                max_life: life,
                color_start: def.color_start,
                color_end: def.color_end,
                size: def.size,
                alive: true,
            };
        }
    }

    /// Age and integrate all live particles one frame
    pub fn update(&mut self, gravity: f32) {
        for particle in &mut self.particles {
            if !particle.alive {
                continue;
            }
            particle.life -= 1.0;
            if particle.life <= 0.0 {
                particle.alive = false;
                continue;
            }
            particle.vy -= gravity;
            particle.x += particle.vx;
            particle.y += particle.vy;
        }
    }

    /// Iterate live particles with their interpolated color
    pub fn iter_alive(&self) -> impl Iterator<Item = (&Particle, [u8; 3])> {
        self.particles.iter().filter(|p| p.alive).map(|p| {
            let t = 1.0 - (p.life / p.max_life);
            let lerp = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t) as u8;
            (
                p,
                [
                    lerp(p.color_start[0], p.color_end[0]),
                    lerp(p.color_start[1], p.color_end[1]),
                    lerp(p.color_start[2], p.color_end[2]),
                ],
            )
        })
    }

    pub fn alive_count(&self) -> usize {
        self.particles.iter().filter(|p| p.alive).count()
    }

    /// Kill all particles
    pub fn clear(&mut self) {
        for p in &mut self.particles {
            p.alive = false;
        }
    }
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_spawns_and_expires() {
        let mut pool = ParticlePool::new();
        pool.spawn_burst(&BurstDef::boost(), 10.0, 10.0);
        assert_eq!(pool.alive_count(), BurstDef::boost().count);

        for _ in 0..100 {
            pool.update(0.1);
        }
        assert_eq!(pool.alive_count(), 0);
    }

    #[test]
    fn test_pool_never_exceeds_capacity() {
        let mut pool = ParticlePool::new();
        for _ in 0..30 {
            pool.spawn_burst(&BurstDef::death("#00ff00"), 0.0, 0.0);
        }
        assert!(pool.alive_count() <= MAX_PARTICLES);
        pool.clear();
        assert_eq!(pool.alive_count(), 0);
    }
}
