//! Cycle engine implementation.
//!
//! The engine is a tick-driven state machine. It does not use internal
//! threads: a [`TickSource`] is asked to start or stop ticking, and the
//! caller delivers each tick through [`CycleEngine::on_tick`]. Completion
//! schedules a cancellable cooldown; the caller reports its expiry through
//! [`CycleEngine::on_cooldown_elapsed`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle <-> Running -> Completed -(cooldown)-> Idle | Running
//! ```
//!
//! Every call must come from one logical thread of control; the engine is
//! not reentrant.

use std::time::Duration;

use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use super::cycle::CycleState;
use super::tick::{CooldownHandle, CooldownScheduler, TickSource};
use crate::error::{TimerError, ValidationError};
use crate::events::{Activity, Cue, Event, EventSink};
use crate::session::{SessionCatalog, SessionKind};
use crate::storage::{Config, HistoryEntry, HistoryStats, HistoryStore, Settings, SettingsStore};

const PULSE_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    /// Stopped. Also covers "paused" when time has already elapsed.
    Idle,
    Running,
    /// Session just finished; waiting for the cooldown.
    Completed,
}

/// Snapshot of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub current: SessionKind,
    pub total_secs: u64,
    pub remaining_secs: u64,
    pub running: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Legacy single auto-start toggle.
    pub auto_mode: bool,
    pub cooldown: Duration,
    pub image_pool: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for EngineOptions {
    fn from(config: &Config) -> Self {
        Self {
            auto_mode: config.timer.auto_mode,
            cooldown: Duration::from_secs(config.timer.cooldown_secs),
            image_pool: config.presentation.image_pool,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTransition {
    handle: CooldownHandle,
    next: SessionKind,
    auto_start: bool,
}

pub struct CycleEngine<E: EventSink> {
    catalog: SessionCatalog,
    history: HistoryStore,
    settings: SettingsStore,
    ticker: Box<dyn TickSource>,
    scheduler: Box<dyn CooldownScheduler>,
    sink: E,
    rng: Pcg64,
    options: EngineOptions,
    phase: TimerPhase,
    current: SessionKind,
    total_secs: u64,
    remaining_secs: u64,
    cycle: CycleState,
    pending: Option<PendingTransition>,
}

impl<E: EventSink> CycleEngine<E> {
    /// Build an idle engine on a fresh `pomodoro`, with the catalog already
    /// carrying the stored durations.
    pub fn new(
        history: HistoryStore,
        settings: SettingsStore,
        ticker: Box<dyn TickSource>,
        scheduler: Box<dyn CooldownScheduler>,
        sink: E,
        options: EngineOptions,
    ) -> Self {
        let mut catalog = SessionCatalog::default();
        settings.get().apply_durations(&mut catalog);
        let current = SessionKind::Pomodoro;
        let total_secs = catalog.duration_secs(current);
        Self {
            catalog,
            history,
            settings,
            ticker,
            scheduler,
            sink,
            rng: Pcg64::from_entropy(),
            options,
            phase: TimerPhase::Idle,
            current,
            total_secs,
            remaining_secs: total_secs,
            cycle: CycleState::default(),
            pending: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            current: self.current,
            total_secs: self.total_secs,
            remaining_secs: self.remaining_secs,
            running: self.is_running(),
        }
    }

    pub fn cycle(&self) -> CycleState {
        self.cycle
    }

    pub fn catalog(&self) -> &SessionCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &Settings {
        self.settings.get()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    pub fn stats(&self) -> HistoryStats {
        self.history.compute_stats(&self.catalog, self.cycle.current_streak)
    }

    pub fn auto_mode(&self) -> bool {
        self.options.auto_mode
    }

    pub fn ticker_active(&self) -> bool {
        self.ticker.is_active()
    }

    /// Handle of the cooldown currently waiting to fire, if any.
    pub fn pending_cooldown(&self) -> Option<CooldownHandle> {
        self.pending.map(|p| p.handle)
    }

    /// Session that the pending cooldown will arm.
    pub fn pending_next(&self) -> Option<SessionKind> {
        self.pending.map(|p| p.next)
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut E {
        &mut self.sink
    }

    /// Emit the full presentation state: timer, activity, history, stats.
    pub fn publish_all(&mut self) {
        self.publish_timer();
        let activity = match self.phase {
            TimerPhase::Running => Activity::Focused,
            TimerPhase::Completed => Activity::Complete,
            TimerPhase::Idle if self.remaining_secs < self.total_secs => Activity::Paused,
            TimerPhase::Idle => Activity::Ready,
        };
        self.sink.emit(Event::Activity { activity });
        self.publish_history();
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or pause. During the cooldown, starts the next session right
    /// away.
    pub fn toggle(&mut self) -> TimerPhase {
        match self.phase {
            TimerPhase::Running => {
                self.ticker.pause();
                self.phase = TimerPhase::Idle;
                tracing::debug!(session = %self.current, remaining = self.remaining_secs, "paused");
                self.publish_timer();
                self.sink.emit(Event::Activity {
                    activity: Activity::Paused,
                });
            }
            TimerPhase::Idle => self.start_countdown(),
            TimerPhase::Completed => {
                if let Some(pending) = self.pending.take() {
                    self.scheduler.cancel(pending.handle);
                    self.arm(pending.next);
                }
                self.start_countdown();
            }
        }
        self.phase
    }

    pub fn reset(&mut self) {
        self.cancel_pending();
        self.ticker.reset();
        self.phase = TimerPhase::Idle;
        self.remaining_secs = self.total_secs;
        tracing::debug!(session = %self.current, "reset");
        self.cue(Cue::Beep);
        self.publish_timer();
        self.sink.emit(Event::Activity {
            activity: Activity::Ready,
        });
    }

    /// Select another session kind. Rejected while the countdown runs.
    pub fn change_mode(&mut self, kind: SessionKind) -> Result<(), TimerError> {
        if self.is_running() {
            tracing::debug!(requested = %kind, "mode change rejected while running");
            return Err(TimerError::ChangeWhileRunning);
        }
        self.cancel_pending();
        self.ticker.reset();
        self.cue(Cue::Beep);
        self.arm(kind);
        Ok(())
    }

    /// Finish the current session now. Only works while stopped, and counts
    /// exactly like a natural expiry: full configured minutes go to history
    /// and the cycle advances. Also refused during the post-completion
    /// cooldown, when there is no session left to finish.
    pub fn skip(&mut self) -> bool {
        if self.phase != TimerPhase::Idle {
            return false;
        }
        tracing::debug!(session = %self.current, remaining = self.remaining_secs, "skipped");
        self.complete_session();
        true
    }

    /// One second elapsed. Ignored unless running.
    pub fn on_tick(&mut self) {
        if !self.is_running() {
            tracing::trace!("tick ignored while stopped");
            return;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.complete_session();
        } else {
            self.publish_time();
        }
    }

    /// A scheduled cooldown fired. Stale or cancelled handles are ignored;
    /// returns whether the next session was armed.
    pub fn on_cooldown_elapsed(&mut self, handle: CooldownHandle) -> bool {
        let pending = match self.pending {
            Some(p) if p.handle == handle => p,
            _ => {
                tracing::debug!(?handle, "ignoring stale cooldown");
                return false;
            }
        };
        self.pending = None;
        self.arm(pending.next);
        if pending.auto_start {
            self.start_countdown();
        }
        self.sink.emit(Event::NextArmed {
            session: pending.next,
            auto_started: pending.auto_start,
        });
        true
    }

    /// Save new settings and push the durations into the catalog. A stopped
    /// session picks up its new length at once; a running one keeps its
    /// countdown.
    pub fn save_settings(&mut self, settings: Settings) -> Result<(), ValidationError> {
        self.settings.save(settings)?;
        let changed = self.settings.get().apply_durations(&mut self.catalog);
        if changed && self.phase == TimerPhase::Idle {
            self.total_secs = self.catalog.duration_secs(self.current);
            self.remaining_secs = self.total_secs;
            self.publish_timer();
        }
        Ok(())
    }

    pub fn adjust_volume(&mut self, volume: u8) -> u8 {
        self.settings.set_volume(volume)
    }

    pub fn set_auto_mode(&mut self, enabled: bool) {
        self.options.auto_mode = enabled;
    }

    /// Clear today's history when `confirm` agrees.
    pub fn clear_history<F>(&mut self, confirm: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        let cleared = self.history.clear(confirm);
        if cleared {
            self.publish_history();
        }
        cleared
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn start_countdown(&mut self) {
        self.ticker.start();
        self.phase = TimerPhase::Running;
        tracing::debug!(session = %self.current, remaining = self.remaining_secs, "started");
        self.publish_timer();
        self.sink.emit(Event::Activity {
            activity: Activity::Focused,
        });
    }

    fn complete_session(&mut self) {
        self.ticker.pause();
        self.phase = TimerPhase::Completed;
        self.remaining_secs = 0;

        let completed = self.current;
        let category = self.catalog.category(completed);
        let next = self.cycle.complete(completed);

        self.cue(Cue::Alarm);
        self.sink.emit(Event::Pulse {
            duration_ms: PULSE_MS,
        });
        self.history.append(completed, &self.catalog);
        self.publish_history();
        self.publish_timer();

        let auto_start = self
            .settings
            .get()
            .should_auto_start(category, self.options.auto_mode);
        let handle = self.scheduler.schedule(self.options.cooldown);
        self.pending = Some(PendingTransition {
            handle,
            next,
            auto_start,
        });

        tracing::info!(session = %completed, next = %next, auto_start, "session complete");
        self.sink.emit(Event::SessionCompleted {
            session: completed,
            next,
            auto_start,
            at: Utc::now(),
        });
        self.sink.emit(Event::Activity {
            activity: Activity::Complete,
        });
    }

    /// Make `kind` the current, stopped session at full length.
    fn arm(&mut self, kind: SessionKind) {
        self.current = kind;
        self.total_secs = self.catalog.duration_secs(kind);
        self.remaining_secs = self.total_secs;
        self.phase = TimerPhase::Idle;
        if self.options.image_pool > 0 {
            let index = self.rng.gen_range(0..self.options.image_pool);
            self.sink.emit(Event::ImageRefresh { index });
        }
        self.publish_timer();
        self.sink.emit(Event::Activity {
            activity: Activity::Ready,
        });
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.scheduler.cancel(pending.handle);
            tracing::debug!(next = %pending.next, "cooldown cancelled");
        }
    }

    fn cue(&mut self, cue: Cue) {
        let volume = self.settings.get().volume;
        self.sink.emit(Event::Cue { cue, volume });
    }

    fn publish_time(&mut self) {
        self.sink.emit(Event::Display {
            text: format_clock(self.remaining_secs),
        });
        self.sink.emit(Event::Progress {
            fraction: progress_fraction(self.remaining_secs, self.total_secs),
        });
    }

    fn publish_timer(&mut self) {
        self.publish_time();
        let spec = self.catalog.spec(self.current);
        self.sink.emit(Event::Badge {
            label: spec.label.clone(),
            category: spec.category,
        });
        self.sink.emit(Event::CycleDots {
            filled: self.cycle.pomodoros_in_cycle,
            active_index: self.cycle.pomodoros_in_cycle,
            caption: self.cycle.caption(),
        });
    }

    fn publish_history(&mut self) {
        self.sink.emit(Event::History {
            entries: self.history.entries().to_vec(),
        });
        let stats = self.stats();
        self.sink.emit(Event::Stats {
            work_sessions: stats.work_sessions,
            total_minutes: stats.total_minutes,
            current_streak: stats.current_streak,
        });
    }
}

/// `MM:SS`; minutes keep growing past 99.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn progress_fraction(remaining: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    remaining as f64 / total as f64
}
