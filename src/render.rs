//! Shape renderer
//!
//! Draws the world as flat colored shapes: background gradient and ground
//! from the current display colors, grid in editor mode, objects by kind,
//! the player, and particles. Purely a view over engine state; nothing in
//! the simulation depends on it.

use macroquad::prelude::*;

use crate::engine::Engine;
use crate::game::hitbox::object_quad;
use crate::game::mode::GameMode;
use crate::game::tuning::TILE;
use crate::world::{
    parse_hex, BlockKind, LevelObject, ObjectKind, PadKind, PortalKind, SpikeKind, VehicleMode,
};

/// Vertical bands used to approximate the background gradient
const GRADIENT_BANDS: usize = 24;
/// Grid lines drawn around the camera in editor mode
const GRID_RADIUS: i32 = 40;

fn hex_color(hex: &str) -> Color {
    let [r, g, b] = parse_hex(hex);
    Color::from_rgba(r, g, b, 255)
}

fn rgb_color(rgb: [u8; 3], alpha: u8) -> Color {
    Color::from_rgba(rgb[0], rgb[1], rgb[2], alpha)
}

/// World-to-screen transform derived from the camera. World y grows
/// upward; screen y grows downward.
struct View {
    cx: f32,
    cy: f32,
    zoom: f32,
    half_w: f32,
    half_h: f32,
}

impl View {
    fn new(engine: &Engine) -> Self {
        Self {
            cx: engine.camera.x,
            cy: engine.camera.y,
            zoom: engine.camera.zoom,
            half_w: screen_width() / 2.0,
            half_h: screen_height() / 2.0,
        }
    }

    fn to_screen(&self, wx: f32, wy: f32) -> (f32, f32) {
        (
            (wx - self.cx) * self.zoom + self.half_w,
            self.half_h - (wy - self.cy) * self.zoom,
        )
    }

    fn scale(&self, v: f32) -> f32 {
        v * self.zoom
    }
}

pub fn draw(engine: &Engine) {
    let view = View::new(engine);

    draw_background(engine);
    draw_ground(engine, &view);
    if engine.mode == GameMode::Editor {
        draw_grid(&view);
    }

    for obj in &engine.doc.objects {
        draw_object(engine, &view, obj);
    }

    if engine.mode.is_verify_family() {
        let (wall_x, _) = view.to_screen(engine.sim.finish_wall_x, 0.0);
        draw_line(wall_x, 0.0, wall_x, screen_height(), 3.0, WHITE);
    }

    if engine.mode != GameMode::Editor {
        draw_player(engine, &view);
    }
    draw_particles(engine, &view);

    if engine.hitbox_debug {
        draw_hitboxes(engine, &view);
    }
}

fn draw_background(engine: &Engine) {
    let top = parse_hex(&engine.colors.bg_top);
    let bottom = parse_hex(&engine.colors.bg_bottom);
    let band_h = screen_height() / GRADIENT_BANDS as f32;
    for i in 0..GRADIENT_BANDS {
        let t = i as f32 / (GRADIENT_BANDS - 1) as f32;
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
        let color = rgb_color(
            [
                lerp(top[0], bottom[0]),
                lerp(top[1], bottom[1]),
                lerp(top[2], bottom[2]),
            ],
            255,
        );
        draw_rectangle(0.0, i as f32 * band_h, screen_width(), band_h + 1.0, color);
    }
}

fn draw_ground(engine: &Engine, view: &View) {
    let floor = if engine.mode == GameMode::Editor {
        0.0
    } else {
        engine.sim.active_floor
    };
    let (_, surface_y) = view.to_screen(0.0, floor);
    if surface_y < screen_height() {
        draw_rectangle(
            0.0,
            surface_y,
            screen_width(),
            screen_height() - surface_y,
            hex_color(&engine.colors.ground),
        );
    }
    draw_line(
        0.0,
        surface_y,
        screen_width(),
        surface_y,
        view.scale(2.0).max(1.0),
        hex_color(&engine.colors.line),
    );

    // Active ceiling during play
    if engine.mode != GameMode::Editor && engine.sim.ceiling_on {
        let (_, ceiling_y) = view.to_screen(0.0, engine.sim.active_ceiling);
        if ceiling_y > 0.0 {
            draw_rectangle(
                0.0,
                0.0,
                screen_width(),
                ceiling_y,
                hex_color(&engine.colors.ground),
            );
            draw_line(
                0.0,
                ceiling_y,
                screen_width(),
                ceiling_y,
                view.scale(2.0).max(1.0),
                hex_color(&engine.colors.line),
            );
        }
    }
}

fn draw_grid(view: &View) {
    let line = Color::from_rgba(255, 255, 255, 26);
    let center_cell = (view.cx / TILE).floor() as i32;
    for i in (center_cell - GRID_RADIUS)..=(center_cell + GRID_RADIUS) {
        let (x, _) = view.to_screen(i as f32 * TILE, 0.0);
        draw_line(x, 0.0, x, screen_height(), 1.0, line);
    }
    let center_row = (view.cy / TILE).floor() as i32;
    for j in (center_row - GRID_RADIUS)..=(center_row + GRID_RADIUS) {
        let (_, y) = view.to_screen(0.0, j as f32 * TILE);
        draw_line(0.0, y, screen_width(), y, 1.0, line);
    }
}

fn object_color(kind: ObjectKind) -> Color {
    match kind {
        ObjectKind::Block(BlockKind::Solid) => Color::from_rgba(60, 60, 70, 255),
        ObjectKind::Block(BlockKind::Brick) => Color::from_rgba(120, 70, 50, 255),
        ObjectKind::Block(BlockKind::Slab) => Color::from_rgba(90, 90, 100, 255),
        ObjectKind::Spike(_) => Color::from_rgba(30, 30, 35, 255),
        ObjectKind::Pad(PadKind::Pink) => PINK,
        ObjectKind::Pad(PadKind::Yellow) => YELLOW,
        ObjectKind::Pad(PadKind::Red) => RED,
        ObjectKind::Pad(PadKind::Blue) => SKYBLUE,
        ObjectKind::Orb(kind) => match kind {
            crate::world::OrbKind::Pink => PINK,
            crate::world::OrbKind::Yellow => YELLOW,
            crate::world::OrbKind::Red => RED,
            crate::world::OrbKind::Blue => SKYBLUE,
        },
        ObjectKind::Deco(_) => Color::from_rgba(200, 200, 210, 180),
        ObjectKind::Portal(PortalKind::Cube) => GREEN,
        ObjectKind::Portal(PortalKind::Ship) => PURPLE,
        ObjectKind::Portal(_) => ORANGE,
        ObjectKind::Trigger => Color::from_rgba(255, 255, 255, 120),
        ObjectKind::StartPos => LIME,
    }
}

fn draw_object(engine: &Engine, view: &View, obj: &LevelObject) {
    let (wx, wy) = obj.center();
    let (sx, sy) = view.to_screen(wx * TILE, wy * TILE);
    if sx < -TILE * 2.0 || sx > screen_width() + TILE * 2.0 {
        return;
    }
    let size = view.scale(TILE);
    let color = object_color(obj.kind);
    let rotation = -obj.rotation.to_radians();

    match obj.kind {
        ObjectKind::Block(BlockKind::Slab) => {
            // Top-half slab drawn in its unrotated frame; rotation is
            // conveyed by the rectangle transform
            draw_rectangle_ex(
                sx,
                sy - size * 0.25,
                size,
                size * 0.5,
                DrawRectangleParams {
                    offset: vec2(0.5, 0.5),
                    rotation,
                    color,
                },
            );
        }
        ObjectKind::Block(_) | ObjectKind::Trigger | ObjectKind::StartPos => {
            draw_rectangle_ex(
                sx,
                sy,
                size,
                size,
                DrawRectangleParams {
                    offset: vec2(0.5, 0.5),
                    rotation,
                    color,
                },
            );
        }
        ObjectKind::Spike(kind) => {
            let w = match kind {
                SpikeKind::Large => 0.9,
                SpikeKind::Medium => 0.6,
                SpikeKind::Small => 0.4,
            } * size;
            let h = size;
            draw_triangle(
                vec2(sx - w / 2.0, sy + h / 2.0),
                vec2(sx + w / 2.0, sy + h / 2.0),
                vec2(sx, sy - h / 2.0),
                color,
            );
        }
        ObjectKind::Pad(_) => {
            draw_rectangle(sx - size * 0.45, sy + size * 0.3, size * 0.9, size * 0.2, color);
        }
        ObjectKind::Orb(_) => {
            draw_circle_lines(sx, sy, size * 0.36, 3.0, color);
            draw_circle(sx, sy, size * 0.15, color);
        }
        ObjectKind::Portal(_) => {
            draw_rectangle(sx - size * 0.23, sy - size * 1.3, size * 0.46, size * 2.6, color);
        }
        ObjectKind::Deco(_) => {
            draw_circle(sx, sy, size * 0.2, color);
        }
    }

    if engine.editor.is_selected(&obj.id) {
        let emphasis = if engine.editor.pasted_selection { GOLD } else { WHITE };
        draw_rectangle_lines(sx - size / 2.0, sy - size / 2.0, size, size, 2.0, emphasis);
    }
}

fn draw_player(engine: &Engine, view: &View) {
    let player = &engine.sim.player;
    if player.dead {
        return;
    }
    let (sx, sy) = view.to_screen(player.x, player.y);
    let size = view.scale(player.scaled_half() * 2.0);

    match player.vehicle {
        VehicleMode::Cube => {
            draw_rectangle_ex(
                sx,
                sy,
                size,
                size,
                DrawRectangleParams {
                    offset: vec2(0.5, 0.5),
                    rotation: -player.rotation,
                    color: Color::from_rgba(0, 224, 160, 255),
                },
            );
        }
        VehicleMode::Ship => {
            let tilt = -player.rotation;
            let (sin, cos) = tilt.sin_cos();
            let h = size / 2.0;
            let rot = |dx: f32, dy: f32| vec2(sx + dx * cos - dy * sin, sy + dx * sin + dy * cos);
            draw_triangle(
                rot(h, 0.0),
                rot(-h, -h * 0.8),
                rot(-h, h * 0.8),
                Color::from_rgba(0, 224, 160, 255),
            );
        }
    }
}

fn draw_particles(engine: &Engine, view: &View) {
    for (particle, rgb) in engine.particles.iter_alive() {
        let (sx, sy) = view.to_screen(particle.x, particle.y);
        let alpha = ((particle.life / particle.max_life) * 255.0) as u8;
        draw_circle(sx, sy, view.scale(particle.size), rgb_color(rgb, alpha));
    }
}

fn draw_hitboxes(engine: &Engine, view: &View) {
    let color = Color::from_rgba(255, 64, 64, 200);
    for obj in &engine.doc.objects {
        let Some(quad) = object_quad(obj) else { continue };
        let pts: Vec<(f32, f32)> = quad
            .corners
            .iter()
            .map(|&(x, y)| view.to_screen(x, y))
            .collect();
        for i in 0..4 {
            let (x0, y0) = pts[i];
            let (x1, y1) = pts[(i + 1) % 4];
            draw_line(x0, y0, x1, y1, 1.5, color);
        }
    }
    if engine.mode != GameMode::Editor && !engine.sim.player.dead {
        let player = &engine.sim.player;
        let half = view.scale(player.scaled_half());
        let (sx, sy) = view.to_screen(player.x, player.y);
        draw_rectangle_lines(sx - half, sy - half, half * 2.0, half * 2.0, 1.5, color);
    }
}
