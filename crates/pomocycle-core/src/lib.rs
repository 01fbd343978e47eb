//! # Pomocycle Core Library
//!
//! Core logic for the Pomocycle Pomodoro timer: the session catalog, the
//! cycle state machine and the two persisted records (today's history and
//! the user settings). Presentation is somebody else's job; the engine only
//! emits [`Event`]s into an [`EventSink`].
//!
//! ## Architecture
//!
//! - **Session catalog**: kind -> duration/label/category table
//! - **Cycle engine**: tick-driven state machine with a cancellable
//!   post-completion cooldown
//! - **Storage**: whole-record key/value backends (SQLite or memory) plus
//!   the TOML application config
//!
//! ## Key Components
//!
//! - [`CycleEngine`]: session/cycle state machine
//! - [`HistoryStore`]: today's completed sessions
//! - [`SettingsStore`]: user durations, auto-start flags and volume
//! - [`TickSource`]: once-per-second tick producer

pub mod error;
pub mod events;
pub mod session;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, StorageError, TimerError, ValidationError};
pub use events::{Activity, Cue, Event, EventSink, NullSink};
pub use session::{Category, SessionCatalog, SessionKind, SessionSpec};
pub use storage::{
    Config, HistoryEntry, HistoryStats, HistoryStore, MemoryStore, Settings, SettingsStore,
    SqliteStore, Storage,
};
pub use timer::{
    CooldownHandle, CooldownScheduler, CycleEngine, CycleState, EngineOptions, TickSource,
    TimerPhase, TimerState,
};
