use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{Category, SessionKind};
use crate::storage::HistoryEntry;

/// Every state change in the engine produces one or more Events.
/// The presentation layer receives them through an [`EventSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Remaining time formatted as `MM:SS`.
    Display { text: String },
    /// `remaining / total`, 1.0 at session start and 0.0 at expiry.
    Progress { fraction: f64 },
    Badge {
        label: String,
        category: Category,
    },
    CycleDots {
        filled: u8,
        active_index: u8,
        caption: String,
    },
    Activity { activity: Activity },
    Stats {
        work_sessions: usize,
        total_minutes: u64,
        current_streak: u32,
    },
    History { entries: Vec<HistoryEntry> },
    Cue { cue: Cue, volume: u8 },
    /// Request a new background pick from the image pool.
    ImageRefresh { index: usize },
    Pulse { duration_ms: u64 },
    SessionCompleted {
        session: SessionKind,
        next: SessionKind,
        auto_start: bool,
        at: DateTime<Utc>,
    },
    /// The post-completion cooldown finished and `session` is now current.
    NextArmed {
        session: SessionKind,
        auto_started: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Ready,
    Focused,
    Paused,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    Beep,
    Alarm,
}

/// Receiver of outbound engine events.
pub trait EventSink {
    fn emit(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) {
        self.push(event);
    }
}

/// Drops everything. Used by one-shot CLI commands that only need the stores.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: Event) {}
}
