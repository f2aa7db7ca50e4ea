//! Hitbox tables and rotated-rectangle collision
//!
//! Every collidable object kind maps to a fixed axis-aligned rectangle in
//! tile-local coordinates. A rotated object's hitbox corners are rotated
//! about the tile center before testing. Unrotated collision is plain AABB
//! overlap; rotated collision is a Separating Axis Test over both
//! rectangles' edge normals.

use crate::world::{BlockKind, LevelObject, ObjectKind, PadKind, SpikeKind};
use super::tuning::TILE;

/// An axis-aligned box in pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Aabb {
    pub fn from_center(cx: f32, cy: f32, half_w: f32, half_h: f32) -> Self {
        Self {
            min_x: cx - half_w,
            min_y: cy - half_h,
            max_x: cx + half_w,
            max_y: cy + half_h,
        }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }
}

/// A possibly-rotated rectangle, stored as its four corners
/// (counter-clockwise, pixel space)
#[derive(Debug, Clone, Copy)]
pub struct Quad {
    pub corners: [(f32, f32); 4],
    /// True when the source rotation was an axis-aligned multiple of 90
    axis_aligned: bool,
}

impl Quad {
    /// Highest corner y (the "top face" under normal gravity)
    pub fn top(&self) -> f32 {
        self.corners.iter().map(|c| c.1).fold(f32::MIN, f32::max)
    }

    /// Lowest corner y (the "bottom face", solid under reversed gravity)
    pub fn bottom(&self) -> f32 {
        self.corners.iter().map(|c| c.1).fold(f32::MAX, f32::min)
    }

    fn bounds(&self) -> Aabb {
        let xs: Vec<f32> = self.corners.iter().map(|c| c.0).collect();
        Aabb {
            min_x: xs.iter().cloned().fold(f32::MAX, f32::min),
            max_x: xs.iter().cloned().fold(f32::MIN, f32::max),
            min_y: self.bottom(),
            max_y: self.top(),
        }
    }

    /// Overlap test against an axis-aligned box. Falls back to plain AABB
    /// overlap when this quad is axis-aligned; otherwise runs the SAT over
    /// the quad's two edge normals and the two world axes.
    pub fn overlaps_aabb(&self, aabb: &Aabb) -> bool {
        if self.axis_aligned {
            return self.bounds().overlaps(aabb);
        }

        let box_corners = [
            (aabb.min_x, aabb.min_y),
            (aabb.max_x, aabb.min_y),
            (aabb.max_x, aabb.max_y),
            (aabb.min_x, aabb.max_y),
        ];

        // World axes (the AABB's normals)
        let mut axes = vec![(1.0, 0.0), (0.0, 1.0)];
        // The quad's two edge normals
        for i in 0..2 {
            let a = self.corners[i];
            let b = self.corners[i + 1];
            let edge = (b.0 - a.0, b.1 - a.1);
            axes.push((-edge.1, edge.0));
        }

        for axis in axes {
            let (quad_min, quad_max) = project(&self.corners, axis);
            let (box_min, box_max) = project(&box_corners, axis);
            // A gap on any tested axis means no collision
            if quad_max < box_min || box_max < quad_min {
                return false;
            }
        }
        true
    }
}

fn project(corners: &[(f32, f32)], axis: (f32, f32)) -> (f32, f32) {
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for c in corners {
        let d = c.0 * axis.0 + c.1 * axis.1;
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

/// A hitbox in tile-local coordinates: offset of the rectangle's center
/// from the tile center plus half extents, all in tile fractions.
#[derive(Debug, Clone, Copy)]
struct LocalBox {
    dx: f32,
    dy: f32,
    half_w: f32,
    half_h: f32,
}

/// Fixed hitbox table. Decorations and start positions have none.
fn local_hitbox(kind: ObjectKind) -> Option<LocalBox> {
    let b = |dx, dy, half_w, half_h| Some(LocalBox { dx, dy, half_w, half_h });
    match kind {
        ObjectKind::Block(BlockKind::Solid) | ObjectKind::Block(BlockKind::Brick) => {
            b(0.0, 0.0, 0.5, 0.5)
        }
        // Half-height slab occupying the top half of the tile
        ObjectKind::Block(BlockKind::Slab) => b(0.0, 0.25, 0.5, 0.25),
        ObjectKind::Spike(SpikeKind::Large) => b(0.0, 0.0, 0.16, 0.32),
        ObjectKind::Spike(SpikeKind::Medium) => b(0.0, 0.0, 0.12, 0.22),
        ObjectKind::Spike(SpikeKind::Small) => b(0.0, 0.0, 0.10, 0.12),
        // Thin strip along the bottom of the tile
        ObjectKind::Pad(PadKind::Pink)
        | ObjectKind::Pad(PadKind::Yellow)
        | ObjectKind::Pad(PadKind::Red)
        | ObjectKind::Pad(PadKind::Blue) => b(0.0, -0.4, 0.45, 0.1),
        ObjectKind::Orb(_) => b(0.0, 0.0, 0.36, 0.36),
        // Tall vertical band spanning three tiles
        ObjectKind::Portal(_) => b(0.0, 0.0, 0.23, 1.3),
        ObjectKind::Trigger => b(0.0, 0.0, 0.5, 0.5),
        ObjectKind::Deco(_) | ObjectKind::StartPos => None,
    }
}

/// Build the world-space hitbox quad for an object, rotating the local
/// rectangle's corners about the tile center. Returns None for kinds
/// without a hitbox.
pub fn object_quad(obj: &LevelObject) -> Option<Quad> {
    let local = local_hitbox(obj.kind)?;
    let (cx, cy) = obj.center();
    let (cx, cy) = (cx * TILE, cy * TILE);

    let bx = local.dx * TILE;
    let by = local.dy * TILE;
    let hw = local.half_w * TILE;
    let hh = local.half_h * TILE;

    let locals = [
        (bx - hw, by - hh),
        (bx + hw, by - hh),
        (bx + hw, by + hh),
        (bx - hw, by + hh),
    ];

    let radians = obj.rotation.to_radians();
    let (sin, cos) = radians.sin_cos();
    let mut corners = [(0.0, 0.0); 4];
    for (i, (lx, ly)) in locals.iter().enumerate() {
        corners[i] = (cx + lx * cos - ly * sin, cy + lx * sin + ly * cos);
    }

    Some(Quad {
        corners,
        axis_aligned: obj.rotation.rem_euclid(90.0) < f32::EPSILON,
    })
}
