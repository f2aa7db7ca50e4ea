//! Mode state machine and the frame-checked event scheduler
//!
//! Modes govern which engine behaviors run each frame. Deferred effects
//! (the death-sequence delay) go through an explicit scheduled-event queue
//! checked once per frame, so a mode change during the delay is observed
//! deterministically instead of racing a timer callback.

/// Engine mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    #[default]
    Editor,
    Playtest,
    Paused,
    Verify,
    VerifyPaused,
    Complete,
}

impl GameMode {
    /// Physics integration runs only in these modes
    pub fn is_playing(&self) -> bool {
        matches!(self, GameMode::Playtest | GameMode::Verify)
    }

    /// Any state reachable from the verify entry point
    pub fn is_verify_family(&self) -> bool {
        matches!(self, GameMode::Verify | GameMode::VerifyPaused | GameMode::Complete)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, GameMode::Paused | GameMode::VerifyPaused)
    }
}

/// A deferred engine action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
    /// Consequence of a death: exit to editor (playtest) or reset the
    /// attempt (verify), decided against the mode current when it fires
    DeathConsequence,
}

/// Frame-indexed event queue. Events fire on the first update whose frame
/// counter is at or past their due frame.
#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<(u64, ScheduledAction)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_frame: u64, action: ScheduledAction) {
        self.pending.push((due_frame, action));
    }

    /// Remove and return every action due at `frame`
    pub fn take_due(&mut self, frame: u64) -> Vec<ScheduledAction> {
        let mut due = Vec::new();
        self.pending.retain(|(when, action)| {
            if *when <= frame {
                due.push(*action);
                false
            } else {
                true
            }
        });
        due
    }

    /// Drop all pending events (a reset supersedes them)
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_fires_at_due_frame() {
        let mut sched = Scheduler::new();
        sched.schedule(10, ScheduledAction::DeathConsequence);
        assert!(sched.take_due(9).is_empty());
        assert_eq!(sched.take_due(10), vec![ScheduledAction::DeathConsequence]);
        // Consumed: does not fire twice
        assert!(sched.take_due(11).is_empty());
        assert!(sched.is_empty());
    }

    #[test]
    fn test_scheduler_clear_supersedes() {
        let mut sched = Scheduler::new();
        sched.schedule(5, ScheduledAction::DeathConsequence);
        sched.clear();
        assert!(sched.take_due(100).is_empty());
    }

    #[test]
    fn test_mode_predicates() {
        assert!(GameMode::Playtest.is_playing());
        assert!(GameMode::Verify.is_playing());
        assert!(!GameMode::Paused.is_playing());
        assert!(GameMode::VerifyPaused.is_verify_family());
        assert!(GameMode::Complete.is_verify_family());
        assert!(!GameMode::Editor.is_verify_family());
    }
}
