//! Seams between the engine and whatever delivers time to it.
//!
//! The engine never sleeps or spawns. It asks a [`TickSource`] to start or
//! stop once-per-second ticks, and a [`CooldownScheduler`] for one-shot
//! wakeups. The caller feeds the resulting ticks and wakeups back through
//! `CycleEngine::on_tick` and `CycleEngine::on_cooldown_elapsed`.

use std::collections::HashSet;
use std::time::Duration;

/// Producer of one tick per second while active.
///
/// `start` must not tick synchronously; the first tick arrives one interval
/// later. `pause` and `reset` are idempotent, and once either returns no
/// further tick may be delivered.
pub trait TickSource {
    fn start(&mut self);
    fn pause(&mut self);
    fn reset(&mut self);
    fn is_active(&self) -> bool;
}

/// Identifies one scheduled cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CooldownHandle(pub u64);

/// One-shot delayed wakeups that can be cancelled before they fire.
pub trait CooldownScheduler {
    fn schedule(&mut self, delay: Duration) -> CooldownHandle;
    fn cancel(&mut self, handle: CooldownHandle);
}

/// Tick source whose ticks are delivered by hand.
#[derive(Debug, Default)]
pub struct ManualTicker {
    active: bool,
    starts: u32,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `start` actually switched the ticker on.
    pub fn starts(&self) -> u32 {
        self.starts
    }
}

impl TickSource for ManualTicker {
    fn start(&mut self) {
        if !self.active {
            self.active = true;
            self.starts += 1;
        }
    }

    fn pause(&mut self) {
        self.active = false;
    }

    fn reset(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Scheduler that only hands out handles; the caller decides when a
/// cooldown "fires".
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    live: HashSet<CooldownHandle>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_live(&self, handle: CooldownHandle) -> bool {
        self.live.contains(&handle)
    }
}

impl CooldownScheduler for ManualScheduler {
    fn schedule(&mut self, _delay: Duration) -> CooldownHandle {
        self.next_id += 1;
        let handle = CooldownHandle(self.next_id);
        self.live.insert(handle);
        handle
    }

    fn cancel(&mut self, handle: CooldownHandle) {
        self.live.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_ticker_start_is_idempotent() {
        let mut ticker = ManualTicker::new();
        ticker.start();
        ticker.start();
        assert!(ticker.is_active());
        assert_eq!(ticker.starts(), 1);
        ticker.pause();
        ticker.pause();
        assert!(!ticker.is_active());
        ticker.start();
        assert_eq!(ticker.starts(), 2);
        ticker.reset();
        assert!(!ticker.is_active());
    }

    #[test]
    fn manual_scheduler_handles_are_unique() {
        let mut sched = ManualScheduler::new();
        let a = sched.schedule(Duration::from_secs(3));
        let b = sched.schedule(Duration::from_secs(3));
        assert_ne!(a, b);
        sched.cancel(a);
        assert!(!sched.is_live(a));
        assert!(sched.is_live(b));
    }
}
