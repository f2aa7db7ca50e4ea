//! DASHCRAFT: a 2D platformer creator
//!
//! Build levels on a grid, playtest them instantly, and verify a full
//! completion run. One simulation step per display refresh; all editing
//! goes through the engine's operation contracts.

mod editor;
mod engine;
mod game;
mod render;
mod world;

use macroquad::prelude::*;

use editor::EditorTool;
use engine::{Engine, EngineEvent};
use game::mode::GameMode;
use game::tuning::TILE;
use game::FrameInput;
use world::{
    load_document, save_document, BlockKind, ObjectKind, OrbKind, PadKind, PortalKind,
    SettingsPatch, SpikeKind, StartPosPatch, TriggerPatch, TriggerTarget,
};

/// Drag distance below which a select gesture counts as a click
const CLICK_THRESHOLD_PX: f32 = 4.0;
/// Default path for quick save/load
const LEVEL_PATH: &str = "level.json";
/// Bundled demo level, loadable with F1
const DEMO_LEVEL: &str = include_str!("../demos/demo.json");
/// Background presets cycled with B
const BG_PRESETS: [&str; 4] = ["#287dff", "#7d28ff", "#ff6b28", "#101018"];

fn window_conf() -> Conf {
    Conf {
        window_title: "dashcraft".to_string(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

/// In-progress editor pointer gesture
#[derive(Default)]
struct Gesture {
    select_origin: Option<(f32, f32)>,
}

fn mouse_world(engine: &Engine) -> (f32, f32) {
    let (mx, my) = mouse_position();
    let cam = &engine.camera;
    (
        (mx - screen_width() / 2.0) / cam.zoom + cam.x,
        cam.y - (my - screen_height() / 2.0) / cam.zoom,
    )
}

fn world_cell(w: (f32, f32)) -> (i32, i32) {
    ((w.0 / TILE).floor() as i32, (w.1 / TILE).floor() as i32)
}

fn handle_mode_keys(engine: &mut Engine) {
    if is_key_pressed(KeyCode::Enter) {
        if engine.mode.is_playing() {
            engine.pause();
        } else {
            engine.enter_playtest();
        }
    }
    if is_key_pressed(KeyCode::F5) {
        engine.enter_verify();
    }
    if is_key_pressed(KeyCode::Escape) && engine.mode != GameMode::Editor {
        engine.stop_to_editor();
    }
    if is_key_pressed(KeyCode::H) {
        engine.toggle_hitbox_debug();
    }
}

fn handle_editor_keys(engine: &mut Engine) {
    let tools: [(KeyCode, EditorTool); 10] = [
        (KeyCode::Key1, EditorTool::Select),
        (KeyCode::Key2, EditorTool::Erase),
        (KeyCode::Key3, EditorTool::Place(ObjectKind::Block(BlockKind::Solid))),
        (KeyCode::Key4, EditorTool::Place(ObjectKind::Spike(SpikeKind::Large))),
        (KeyCode::Key5, EditorTool::Place(ObjectKind::Pad(PadKind::Yellow))),
        (KeyCode::Key6, EditorTool::Place(ObjectKind::Orb(OrbKind::Yellow))),
        (KeyCode::Key7, EditorTool::Place(ObjectKind::Portal(PortalKind::Ship))),
        (KeyCode::Key8, EditorTool::Place(ObjectKind::Trigger)),
        (KeyCode::Key9, EditorTool::Place(ObjectKind::StartPos)),
        (KeyCode::Key0, EditorTool::Place(ObjectKind::Pad(PadKind::Blue))),
    ];
    for (key, tool) in tools {
        if is_key_pressed(key) {
            engine.editor.set_tool(tool);
        }
    }

    let ctrl = is_key_down(KeyCode::LeftControl) || is_key_down(KeyCode::RightControl);
    if ctrl && is_key_pressed(KeyCode::Z) {
        engine.undo();
    }
    if ctrl && is_key_pressed(KeyCode::Y) {
        engine.redo();
    }
    if ctrl && is_key_pressed(KeyCode::C) {
        engine.copy_selection();
    }
    if ctrl && is_key_pressed(KeyCode::V) {
        engine.paste(1.0, 0.0);
    }
    if ctrl && is_key_pressed(KeyCode::D) {
        engine.duplicate_selection();
    }
    if is_key_pressed(KeyCode::Delete) || is_key_pressed(KeyCode::Backspace) {
        engine.delete_selection();
    }
    if is_key_pressed(KeyCode::R) {
        engine.rotate_selection(90.0, false);
    }

    if is_key_pressed(KeyCode::Left) {
        engine.move_selection(-1.0, 0.0);
    }
    if is_key_pressed(KeyCode::Right) {
        engine.move_selection(1.0, 0.0);
    }
    if is_key_pressed(KeyCode::Up) {
        engine.move_selection(0.0, 1.0);
    }
    if is_key_pressed(KeyCode::Down) {
        engine.move_selection(0.0, -1.0);
    }

    if ctrl && is_key_pressed(KeyCode::S) {
        match save_document(&engine.doc, LEVEL_PATH) {
            Ok(()) => println!("saved {}", LEVEL_PATH),
            Err(e) => eprintln!("save failed: {}", e),
        }
    }
    if ctrl && is_key_pressed(KeyCode::O) {
        match load_document(LEVEL_PATH) {
            Ok(doc) => engine.load(doc, true),
            Err(e) => eprintln!("load failed: {}", e),
        }
    }
    if ctrl && is_key_pressed(KeyCode::E) {
        match engine.export_json() {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("export failed: {}", e),
        }
    }
    if ctrl && is_key_pressed(KeyCode::N) {
        engine.clear_level();
    }
    if is_key_pressed(KeyCode::F1) {
        if let Err(e) = engine.import_json(DEMO_LEVEL) {
            eprintln!("demo level failed to load: {}", e);
        }
    }

    // Property tweaks on the current selection
    if is_key_pressed(KeyCode::T) {
        let next = engine
            .editor
            .selection
            .first()
            .and_then(|id| engine.doc.get(id))
            .and_then(|o| o.trigger.as_ref())
            .map(|d| {
                let all = TriggerTarget::ALL;
                let idx = all.iter().position(|t| *t == d.target).unwrap_or(0);
                all[(idx + 1) % all.len()]
            });
        if let Some(target) = next {
            engine.update_trigger(TriggerPatch {
                target: Some(target),
                ..TriggerPatch::default()
            });
        }
    }
    if is_key_pressed(KeyCode::G) {
        let enabled = engine
            .editor
            .selection
            .first()
            .and_then(|id| engine.doc.get(id))
            .and_then(|o| o.start_pos.as_ref())
            .map(|d| d.enabled);
        if let Some(enabled) = enabled {
            engine.update_start_pos(StartPosPatch {
                enabled: Some(!enabled),
                ..StartPosPatch::default()
            });
        }
    }
    if is_key_pressed(KeyCode::B) {
        let current = engine.doc.settings.bg_color_top.as_str();
        let idx = BG_PRESETS
            .iter()
            .position(|p| *p == current)
            .map(|i| (i + 1) % BG_PRESETS.len())
            .unwrap_or(0);
        engine.update_settings(SettingsPatch {
            bg_color_top: Some(BG_PRESETS[idx].to_string()),
            ..SettingsPatch::default()
        });
    }

    // Camera pan
    let pan = 8.0;
    if is_key_down(KeyCode::A) {
        engine.camera.pan(-pan, 0.0);
    }
    if is_key_down(KeyCode::D) && !ctrl {
        engine.camera.pan(pan, 0.0);
    }
    if is_key_down(KeyCode::W) {
        engine.camera.pan(0.0, pan);
    }
    if is_key_down(KeyCode::S) && !ctrl {
        engine.camera.pan(0.0, -pan);
    }
    let (_, wheel) = mouse_wheel();
    if wheel != 0.0 {
        let zoom = engine.camera.zoom * if wheel > 0.0 { 1.1 } else { 0.9 };
        engine.camera.set_zoom(zoom);
    }
}

fn handle_editor_mouse(engine: &mut Engine, gesture: &mut Gesture) {
    let additive = is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift);
    let w = mouse_world(engine);
    let cell = world_cell(w);

    match engine.editor.tool {
        EditorTool::Place(_) => {
            if is_mouse_button_pressed(MouseButton::Left) {
                engine.place_at(cell);
            }
        }
        EditorTool::Erase => {
            if is_mouse_button_pressed(MouseButton::Left) {
                engine.editor.begin_delete_stroke();
            }
            if is_mouse_button_down(MouseButton::Left) {
                engine.delete_at(cell);
            }
        }
        EditorTool::Select => {
            if is_mouse_button_pressed(MouseButton::Left) {
                gesture.select_origin = Some(w);
            }
            if is_mouse_button_released(MouseButton::Left) {
                if let Some(origin) = gesture.select_origin.take() {
                    let drag = ((w.0 - origin.0).powi(2) + (w.1 - origin.1).powi(2)).sqrt();
                    if drag * engine.camera.zoom < CLICK_THRESHOLD_PX {
                        engine.click_select(cell, additive);
                    } else {
                        let min = (origin.0.min(w.0), origin.1.min(w.1));
                        let max = (origin.0.max(w.0), origin.1.max(w.1));
                        engine.box_select(min, max, additive);
                    }
                }
            }
        }
    }
}

fn draw_status(engine: &Engine) {
    let label = match engine.mode {
        GameMode::Editor => "EDITOR  [Enter] playtest  [F5] verify",
        GameMode::Playtest => "PLAYTEST  [Enter] pause  [Esc] stop",
        GameMode::Paused => "PAUSED  [Enter] resume  [Esc] stop",
        GameMode::Verify => "VERIFY  [Enter] pause  [Esc] stop",
        GameMode::VerifyPaused => "VERIFY PAUSED  [Enter] resume",
        GameMode::Complete => "LEVEL COMPLETE  [Esc] back to editor",
    };
    draw_text(label, 12.0, 24.0, 22.0, WHITE);
}

#[macroquad::main(window_conf)]
async fn main() {
    println!("dashcraft {}", env!("CARGO_PKG_VERSION"));

    let mut engine = Engine::new();
    let mut gesture = Gesture::default();

    loop {
        handle_mode_keys(&mut engine);
        if engine.mode == GameMode::Editor {
            handle_editor_keys(&mut engine);
            handle_editor_mouse(&mut engine, &mut gesture);
        }

        let input = FrameInput {
            hold: is_key_down(KeyCode::Space)
                || is_key_down(KeyCode::Up)
                || is_mouse_button_down(MouseButton::Left),
            pressed: is_key_pressed(KeyCode::Space)
                || is_key_pressed(KeyCode::Up)
                || is_mouse_button_pressed(MouseButton::Left),
        };
        engine.update(input);

        for event in engine.drain_events() {
            if let EngineEvent::Completed { hitbox_debug } = event {
                println!("level verified (hitbox overlay: {})", hitbox_debug);
            }
        }

        render::draw(&engine);
        draw_status(&engine);

        next_frame().await
    }
}
