//! Tokio-backed tick source and cooldown scheduler.
//!
//! Both post [`Signal`]s onto one unbounded channel so the caller can drive
//! the engine from a single `select!` loop. Ticks carry the epoch they were
//! produced in; stopping the ticker bumps the epoch and [`SignalReceiver`]
//! drops anything older, so a tick already queued at pause time is never
//! delivered.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::tick::{CooldownHandle, CooldownScheduler, TickSource};

const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Tick,
    CooldownElapsed(CooldownHandle),
}

#[derive(Debug)]
enum Raw {
    Tick { epoch: u64 },
    Cooldown(CooldownHandle),
}

/// Build a connected ticker, scheduler and receiver.
pub fn signal_channel() -> (IntervalTicker, TokioScheduler, SignalReceiver) {
    signal_channel_with_period(TICK_PERIOD)
}

/// Same as [`signal_channel`] with a custom tick period.
pub fn signal_channel_with_period(
    period: Duration,
) -> (IntervalTicker, TokioScheduler, SignalReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let epoch = Arc::new(AtomicU64::new(0));
    let ticker = IntervalTicker {
        tx: tx.clone(),
        period,
        epoch: Arc::clone(&epoch),
        task: None,
    };
    let scheduler = TokioScheduler {
        tx,
        next_id: 0,
        tasks: HashMap::new(),
    };
    (ticker, scheduler, SignalReceiver { rx, epoch })
}

pub struct SignalReceiver {
    rx: mpsc::UnboundedReceiver<Raw>,
    epoch: Arc<AtomicU64>,
}

impl SignalReceiver {
    /// Next live signal, or `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<Signal> {
        loop {
            match self.rx.recv().await? {
                Raw::Tick { epoch } if epoch == self.epoch.load(Ordering::SeqCst) => {
                    return Some(Signal::Tick)
                }
                Raw::Tick { .. } => {
                    tracing::trace!("dropping tick from a stopped ticker");
                }
                Raw::Cooldown(handle) => return Some(Signal::CooldownElapsed(handle)),
            }
        }
    }
}

pub struct IntervalTicker {
    tx: mpsc::UnboundedSender<Raw>,
    period: Duration,
    epoch: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl IntervalTicker {
    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }
}

impl TickSource for IntervalTicker {
    fn start(&mut self) {
        if self.task.is_some() {
            return;
        }
        let tx = self.tx.clone();
        let period = self.period;
        let epoch = self.epoch.load(Ordering::SeqCst);
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(Raw::Tick { epoch }).is_err() {
                    break;
                }
            }
        }));
    }

    fn pause(&mut self) {
        self.stop();
    }

    fn reset(&mut self) {
        self.stop();
    }

    fn is_active(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for IntervalTicker {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<Raw>,
    next_id: u64,
    tasks: HashMap<CooldownHandle, JoinHandle<()>>,
}

impl CooldownScheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration) -> CooldownHandle {
        self.tasks.retain(|_, task| !task.is_finished());
        self.next_id += 1;
        let handle = CooldownHandle(self.next_id);
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Raw::Cooldown(handle));
        });
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: CooldownHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ticks_arrive_after_start_and_stop_after_pause() {
        let (mut ticker, _sched, mut rx) = signal_channel_with_period(Duration::from_millis(20));
        ticker.start();
        assert!(ticker.is_active());
        assert_eq!(rx.recv().await, Some(Signal::Tick));

        ticker.pause();
        assert!(!ticker.is_active());
        let next = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(next.is_err(), "no tick may follow a pause");
    }

    #[tokio::test]
    async fn cancelled_cooldown_never_fires() {
        let (_ticker, mut sched, mut rx) = signal_channel_with_period(Duration::from_millis(20));
        let cancelled = sched.schedule(Duration::from_millis(10));
        let kept = sched.schedule(Duration::from_millis(30));
        sched.cancel(cancelled);
        assert_eq!(rx.recv().await, Some(Signal::CooldownElapsed(kept)));
    }
}
