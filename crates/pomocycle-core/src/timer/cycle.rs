use serde::{Deserialize, Serialize};

use crate::session::SessionKind;

/// Pomodoros per cycle before the long break.
pub const POMODOROS_PER_CYCLE: u8 = 4;

/// Cycle counters. Lives only as long as the engine; nothing here is
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CycleState {
    pub pomodoros_in_cycle: u8,
    pub total_pomodoros: u32,
    pub current_streak: u32,
}

impl CycleState {
    /// Credit a finished session and pick the one that follows it.
    ///
    /// Only `pomodoro` moves the counters. The fourth pomodoro of a cycle
    /// leads to a long break and starts a fresh cycle.
    pub fn complete(&mut self, kind: SessionKind) -> SessionKind {
        match kind {
            SessionKind::Pomodoro => {
                self.pomodoros_in_cycle = (self.pomodoros_in_cycle + 1).min(POMODOROS_PER_CYCLE);
                self.total_pomodoros = self.total_pomodoros.saturating_add(1);
                self.current_streak = self.current_streak.saturating_add(1);
                if self.pomodoros_in_cycle >= POMODOROS_PER_CYCLE {
                    self.pomodoros_in_cycle = 0;
                    SessionKind::LongBreak
                } else {
                    SessionKind::ShortBreak
                }
            }
            SessionKind::ShortBreak | SessionKind::LongBreak => SessionKind::Pomodoro,
            SessionKind::LongFocus => SessionKind::LongBreak,
            SessionKind::Refocus2 => SessionKind::Pomodoro,
        }
    }

    /// Human-readable progress through the current cycle.
    pub fn caption(&self) -> String {
        format!("{} de {} pomodoros", self.pomodoros_in_cycle, POMODOROS_PER_CYCLE)
    }
}
