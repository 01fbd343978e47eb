mod cycle;
pub mod driver;
mod engine;
mod tick;

pub use cycle::{CycleState, POMODOROS_PER_CYCLE};
pub use driver::{signal_channel, signal_channel_with_period, Signal, SignalReceiver};
pub use engine::{format_clock, CycleEngine, EngineOptions, TimerPhase, TimerState};
pub use tick::{CooldownHandle, CooldownScheduler, ManualScheduler, ManualTicker, TickSource};
