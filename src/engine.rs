//! Engine facade
//!
//! One owned struct holding every piece of mutable state: document,
//! history, editor state, simulation, mode, color state, scheduler,
//! particles, camera. External callers (the app shell) talk only through
//! its methods; outbound notifications are queued as events and drained
//! once per frame.

use crate::editor::EditorState;
use crate::game::{
    mode::{GameMode, ScheduledAction, Scheduler},
    particles::ParticlePool,
    physics::SimState,
    triggers::{self, ColorEffect, DisplayColors},
    tuning::DEATH_DELAY_FRAMES,
    Camera, FrameInput,
};
use crate::world::{History, LevelDocument, LevelError};

/// Outbound notification for the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    SelectionChanged {
        count: usize,
        has_block: bool,
        single_id: Option<String>,
    },
    HistoryChanged {
        can_undo: bool,
        can_redo: bool,
    },
    Completed {
        hitbox_debug: bool,
    },
}

pub struct Engine {
    pub doc: LevelDocument,
    pub history: History,
    pub editor: EditorState,
    pub sim: SimState,
    pub mode: GameMode,
    pub colors: DisplayColors,
    pub effects: Vec<ColorEffect>,
    pub scheduler: Scheduler,
    pub particles: ParticlePool,
    pub camera: Camera,
    /// Frame counter, reset with the player
    pub frame: u64,
    /// Hitbox overlay toggle, reported on completion
    pub hitbox_debug: bool,
    /// A death consequence fired while paused; consumed on the next
    /// playing tick
    pending_reset: bool,
    pub(crate) next_id: u64,
    events: Vec<EngineEvent>,
}

impl Engine {
    pub fn new() -> Self {
        let doc = LevelDocument::new();
        let sim = SimState::reset(&doc, false);
        let colors = DisplayColors::from_settings(&doc.settings);
        let history = History::new(doc.clone());
        Self {
            doc,
            history,
            editor: EditorState::new(),
            sim,
            mode: GameMode::Editor,
            colors,
            effects: Vec::new(),
            scheduler: Scheduler::new(),
            particles: ParticlePool::new(),
            camera: Camera::new(),
            frame: 0,
            hitbox_debug: false,
            pending_reset: false,
            next_id: 1,
            events: Vec::new(),
        }
    }

    /// Drain queued notifications. Called once per frame by the shell.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Replace the document atomically. With `keep_history` the previous
    /// state stays reachable through undo; without it the stack resets to
    /// a single entry. Selection is always invalidated.
    pub fn load(&mut self, doc: LevelDocument, keep_history: bool) {
        self.doc = doc;
        if keep_history {
            self.history.snapshot(self.doc.clone());
        } else {
            self.history.reset(self.doc.clone());
        }
        self.editor.clear_selection();
        self.mode = GameMode::Editor;
        self.colors = DisplayColors::from_settings(&self.doc.settings);
        self.notify_selection();
        self.notify_history();
    }

    /// Parse, sanitize, and load a JSON level
    pub fn import_json(&mut self, text: &str) -> Result<(), LevelError> {
        let doc = crate::world::parse_document(text)?;
        self.load(doc, false);
        Ok(())
    }

    pub fn export_json(&self) -> Result<String, LevelError> {
        crate::world::serialize_document(&self.doc)
    }

    pub fn undo(&mut self) {
        if let Some(state) = self.history.undo() {
            self.doc = state;
            self.editor.clear_selection();
            self.notify_selection();
        }
        self.notify_history();
    }

    pub fn redo(&mut self) {
        if let Some(state) = self.history.redo() {
            self.doc = state;
            self.editor.clear_selection();
            self.notify_selection();
        }
        self.notify_history();
    }

    /// Record the current document state after a mutating editing
    /// operation.
    pub(crate) fn commit(&mut self) {
        self.history.snapshot(self.doc.clone());
        self.notify_history();
    }

    pub(crate) fn notify_history(&mut self) {
        let event = EngineEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        };
        self.events.push(event);
    }

    pub(crate) fn notify_selection(&mut self) {
        let count = self.editor.selection.len();
        let has_block = self
            .editor
            .selection
            .iter()
            .filter_map(|id| self.doc.get(id))
            .any(|o| o.kind.is_block());
        let single_id = if count == 1 {
            self.editor.selection.first().cloned()
        } else {
            None
        };
        self.events.push(EngineEvent::SelectionChanged {
            count,
            has_block,
            single_id,
        });
    }

    /// Generate a fresh object id, skipping any id a loaded document
    /// already uses.
    pub(crate) fn fresh_id(&mut self) -> String {
        loop {
            let id = format!("obj-{}", self.next_id);
            self.next_id += 1;
            if self.doc.get(&id).is_none() {
                return id;
            }
        }
    }

    // --- Mode transitions ---

    /// Enter playtest, resuming without reset when paused
    pub fn enter_playtest(&mut self) {
        if self.mode == GameMode::Paused {
            self.mode = GameMode::Playtest;
            return;
        }
        self.reset_player(false);
        self.mode = GameMode::Playtest;
    }

    /// Enter verify, resuming without reset when verify-paused
    pub fn enter_verify(&mut self) {
        if self.mode == GameMode::VerifyPaused {
            self.mode = GameMode::Verify;
            return;
        }
        self.reset_player(true);
        self.mode = GameMode::Verify;
    }

    pub fn pause(&mut self) {
        self.mode = match self.mode {
            GameMode::Playtest => GameMode::Paused,
            GameMode::Verify => GameMode::VerifyPaused,
            other => other,
        };
    }

    /// Stop physics and return to the editor from any play state
    pub fn stop_to_editor(&mut self) {
        self.mode = GameMode::Editor;
        self.scheduler.clear();
        self.pending_reset = false;
        self.effects.clear();
        self.colors = DisplayColors::from_settings(&self.doc.settings);
    }

    /// Full player reset. Clears selection, transient per-run state, and
    /// the frame counter; reinitializes display colors from settings.
    pub fn reset_player(&mut self, for_verify: bool) {
        self.editor.clear_selection();
        self.notify_selection();
        self.sim = SimState::reset(&self.doc, for_verify);
        self.colors = DisplayColors::from_settings(&self.doc.settings);
        self.effects.clear();
        self.particles.clear();
        self.scheduler.clear();
        self.pending_reset = false;
        self.frame = 0;
        self.camera.snap_to(&self.sim.player);
    }

    pub fn toggle_hitbox_debug(&mut self) {
        self.hitbox_debug = !self.hitbox_debug;
    }

    // --- Per-frame update ---

    /// Advance one frame. Runs in every mode; physics integrates only in
    /// the playing modes.
    pub fn update(&mut self, input: FrameInput) {
        // A death consequence that fired while paused waits here
        if self.pending_reset && self.mode == GameMode::Verify {
            self.pending_reset = false;
            self.reset_player(true);
        }

        if !self.scheduler.is_empty() {
            for action in self.scheduler.take_due(self.frame) {
                match action {
                    ScheduledAction::DeathConsequence => self.death_consequence(),
                }
            }
        }

        match self.mode {
            GameMode::Editor => {
                // No live player: display colors are a simulation of what
                // the level would show at the camera center
                self.colors = triggers::preview_colors(&self.doc, self.camera.x);
            }
            GameMode::Playtest | GameMode::Verify => {
                let events = self.sim.step(
                    &self.doc,
                    input,
                    self.frame,
                    &mut self.colors,
                    &mut self.effects,
                    &mut self.particles,
                );
                triggers::update_effects(&mut self.effects, &mut self.colors, self.frame);

                if events.died {
                    self.on_death();
                }
                if events.completed && self.mode == GameMode::Verify {
                    self.mode = GameMode::Complete;
                    self.events.push(EngineEvent::Completed {
                        hitbox_debug: self.hitbox_debug,
                    });
                }
                self.camera.follow(&self.sim.player);
            }
            GameMode::Paused | GameMode::VerifyPaused | GameMode::Complete => {}
        }

        self.particles.update(0.15);
        self.frame += 1;
    }

    /// First-death handling: playtest exits promptly, verify freezes the
    /// color effects and schedules a delayed retry.
    fn on_death(&mut self) {
        match self.mode {
            GameMode::Playtest => {
                self.scheduler
                    .schedule(self.frame + 1, ScheduledAction::DeathConsequence);
            }
            GameMode::Verify => {
                self.effects.clear();
                self.scheduler.schedule(
                    self.frame + DEATH_DELAY_FRAMES,
                    ScheduledAction::DeathConsequence,
                );
            }
            _ => {}
        }
    }

    /// Decided against the mode current when the scheduled event fires,
    /// not the mode at death time.
    fn death_consequence(&mut self) {
        match self.mode {
            GameMode::Playtest => self.stop_to_editor(),
            GameMode::Verify => self.reset_player(true),
            mode if mode.is_paused() => self.pending_reset = true,
            _ => {}
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{BlockKind, LevelObject, ObjectKind, SpikeKind};

    const IDLE: FrameInput = FrameInput { hold: false, pressed: false };

    fn engine_with_spike_ahead() -> Engine {
        let mut engine = Engine::new();
        // A spike directly in the spawn path
        engine.doc.objects.push(LevelObject::new(
            "s".into(),
            ObjectKind::Spike(SpikeKind::Large),
            1.0,
            0.0,
        ));
        engine
    }

    #[test]
    fn test_playtest_death_returns_to_editor() {
        let mut engine = engine_with_spike_ahead();
        engine.enter_playtest();
        assert_eq!(engine.mode, GameMode::Playtest);

        for _ in 0..30 {
            engine.update(IDLE);
            if engine.mode == GameMode::Editor {
                return;
            }
        }
        panic!("death never returned to the editor");
    }

    #[test]
    fn test_verify_death_resets_for_another_attempt() {
        let mut engine = engine_with_spike_ahead();
        engine.enter_verify();

        let mut died_frame = None;
        for i in 0..200u64 {
            engine.update(IDLE);
            if engine.sim.player.dead && died_frame.is_none() {
                died_frame = Some(i);
            }
            // After the observation delay the attempt restarts
            if died_frame.is_some() && !engine.sim.player.dead {
                assert_eq!(engine.mode, GameMode::Verify);
                assert_eq!(engine.frame, 1);
                return;
            }
        }
        panic!("verify death never reset the attempt");
    }

    #[test]
    fn test_death_consequence_defers_while_paused() {
        let mut engine = engine_with_spike_ahead();
        engine.enter_verify();

        while !engine.sim.player.dead {
            engine.update(IDLE);
        }
        engine.pause();
        for _ in 0..100 {
            engine.update(IDLE);
        }
        // Still showing the dead attempt while paused
        assert!(engine.sim.player.dead);

        engine.enter_verify();
        engine.update(IDLE);
        assert!(!engine.sim.player.dead);
    }

    #[test]
    fn test_pause_resume_does_not_reset() {
        let mut engine = Engine::new();
        engine.enter_playtest();
        for _ in 0..10 {
            engine.update(IDLE);
        }
        let x = engine.sim.player.x;
        engine.pause();
        engine.update(IDLE);
        assert_eq!(engine.sim.player.x, x);
        engine.enter_playtest();
        assert_eq!(engine.sim.player.x, x);
    }

    #[test]
    fn test_verify_completes_exactly_once() {
        let mut engine = Engine::new();
        engine.enter_verify();

        let mut completions = 0;
        for _ in 0..2000 {
            engine.update(IDLE);
            for event in engine.drain_events() {
                if matches!(event, EngineEvent::Completed { .. }) {
                    completions += 1;
                }
            }
        }
        assert_eq!(engine.mode, GameMode::Complete);
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_load_resets_history_and_selection() {
        let mut engine = Engine::new();
        let mut doc = LevelDocument::new();
        doc.objects.push(LevelObject::new(
            "b".into(),
            ObjectKind::Block(BlockKind::Solid),
            0.0,
            0.0,
        ));
        engine.editor.selection.push("stale".to_string());
        engine.load(doc, false);
        assert!(engine.editor.selection.is_empty());
        assert!(!engine.history.can_undo());
        assert_eq!(engine.doc.objects.len(), 1);
    }

    #[test]
    fn test_load_keeping_history_allows_undo_to_prior_state() {
        let mut engine = Engine::new();
        let mut doc = LevelDocument::new();
        doc.objects.push(LevelObject::new(
            "b".into(),
            ObjectKind::Block(BlockKind::Solid),
            0.0,
            0.0,
        ));
        engine.load(doc, true);
        assert!(engine.history.can_undo());
        engine.undo();
        assert!(engine.doc.objects.is_empty());
    }

    #[test]
    fn test_import_json_round_trip() {
        let mut engine = Engine::new();
        engine.doc.objects.push(LevelObject::new(
            "b".into(),
            ObjectKind::Block(BlockKind::Slab),
            4.0,
            1.0,
        ));
        let text = engine.export_json().unwrap();

        let mut other = Engine::new();
        other.import_json(&text).unwrap();
        assert_eq!(other.doc, engine.doc);
    }
}
