//! Interactive timer loop.
//!
//! Ticks, cooldown expiries and keyboard lines are all handled in one
//! `select!` loop, so the engine only ever sees one call at a time.

use pomocycle_core::timer::{signal_channel, Signal};
use pomocycle_core::{
    Config, CycleEngine, EngineOptions, EventSink, HistoryStore, MemoryStore, SessionKind,
    Settings, SettingsStore,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{is_yes, open_stores, CliResult};
use crate::presenter::TerminalPresenter;

const HELP: &str = "commands: [enter]/t start-pause, r reset, s skip, m <kind> change session, \
a toggle auto mode, v <0-100> volume, d <kind> <minutes> set duration, c clear history, q quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Toggle,
    Reset,
    Skip,
    Mode(SessionKind),
    AutoMode,
    Volume(u8),
    Duration(SessionKind, u32),
    Clear,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Result<Input, String> {
    let mut parts = line.split_whitespace();
    let cmd = parts.next().unwrap_or("t");
    let arg = parts.next();
    if matches!(cmd, "d" | "duration") {
        return parse_duration(arg, parts.next());
    }
    match (cmd, arg) {
        ("t" | "toggle", None) => Ok(Input::Toggle),
        ("r" | "reset", None) => Ok(Input::Reset),
        ("s" | "skip", None) => Ok(Input::Skip),
        ("m" | "mode", Some(kind)) => kind
            .parse::<SessionKind>()
            .map(Input::Mode)
            .map_err(|e| e.to_string()),
        ("a" | "auto", None) => Ok(Input::AutoMode),
        ("v" | "volume", Some(level)) => level
            .parse::<u8>()
            .ok()
            .filter(|v| *v <= 100)
            .map(Input::Volume)
            .ok_or_else(|| format!("volume must be 0-100, got '{level}'")),
        ("c" | "clear", None) => Ok(Input::Clear),
        ("h" | "help" | "?", None) => Ok(Input::Help),
        ("q" | "quit", None) => Ok(Input::Quit),
        _ => Err(format!("unrecognized command '{}'", line.trim())),
    }
}

fn parse_duration(kind: Option<&str>, minutes: Option<&str>) -> Result<Input, String> {
    let (Some(kind), Some(minutes)) = (kind, minutes) else {
        return Err("usage: d <pomodoro|short-break|long-break> <minutes>".to_string());
    };
    let kind = kind.parse::<SessionKind>().map_err(|e| e.to_string())?;
    if !matches!(
        kind,
        SessionKind::Pomodoro | SessionKind::ShortBreak | SessionKind::LongBreak
    ) {
        return Err(format!("{kind} has a fixed duration"));
    }
    match minutes.parse::<u32>() {
        Ok(m) if m > 0 => Ok(Input::Duration(kind, m)),
        _ => Err(format!("duration must be a positive number of minutes, got '{minutes}'")),
    }
}

pub fn run(mode: &str, ephemeral: bool, config: &Config) -> CliResult {
    let kind: SessionKind = mode.parse()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_loop(kind, ephemeral, config))
}

async fn run_loop(kind: SessionKind, ephemeral: bool, config: &Config) -> CliResult {
    let (history, settings) = if ephemeral {
        let mem = MemoryStore::new();
        (
            HistoryStore::load(Box::new(mem.clone())),
            SettingsStore::load(Box::new(mem)),
        )
    } else {
        open_stores()?
    };

    let (ticker, scheduler, mut signals) = signal_channel();
    let mut engine = CycleEngine::new(
        history,
        settings,
        Box::new(ticker),
        Box::new(scheduler),
        TerminalPresenter::stdout(config.presentation.bell),
        EngineOptions::from(config),
    );
    if kind != SessionKind::Pomodoro {
        engine.change_mode(kind)?;
    }
    tracing::info!(session = %kind, ephemeral, "timer ready");
    println!("{HELP}");
    engine.publish_all();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut awaiting_clear = false;

    loop {
        tokio::select! {
            signal = signals.recv() => match signal {
                Some(Signal::Tick) => engine.on_tick(),
                Some(Signal::CooldownElapsed(handle)) => {
                    engine.on_cooldown_elapsed(handle);
                }
                None => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if awaiting_clear {
                    awaiting_clear = false;
                    let yes = is_yes(&line);
                    if !engine.clear_history(|| yes) {
                        println!("history kept");
                    }
                    continue;
                }
                match parse_input(&line) {
                    Ok(Input::Quit) => break,
                    Ok(input) => {
                        if dispatch(&mut engine, input) {
                            awaiting_clear = true;
                        }
                    }
                    Err(message) => println!("{message}"),
                }
            }
        }
    }

    println!();
    Ok(())
}

/// Apply one command. Returns true when the next line must answer a
/// clear-history confirmation.
fn dispatch<E: EventSink>(engine: &mut CycleEngine<E>, input: Input) -> bool {
    match input {
        Input::Toggle => {
            engine.toggle();
        }
        Input::Reset => engine.reset(),
        Input::Skip => {
            if !engine.skip() {
                println!("pause the timer before skipping");
            }
        }
        Input::Mode(kind) => {
            if let Err(e) = engine.change_mode(kind) {
                println!("{e}");
            }
        }
        Input::AutoMode => {
            let enabled = !engine.auto_mode();
            engine.set_auto_mode(enabled);
            println!("auto mode {}", if enabled { "on" } else { "off" });
        }
        Input::Volume(level) => {
            let level = engine.adjust_volume(level);
            println!("volume {level}");
        }
        Input::Duration(kind, minutes) => {
            let mut settings: Settings = engine.settings().clone();
            match kind {
                SessionKind::Pomodoro => settings.pomodoro_min = minutes,
                SessionKind::ShortBreak => settings.short_break_min = minutes,
                SessionKind::LongBreak => settings.long_break_min = minutes,
                _ => return false,
            }
            match engine.save_settings(settings) {
                Ok(()) => println!("{kind} set to {minutes} min"),
                Err(e) => println!("{e}"),
            }
        }
        Input::Clear => {
            println!("Clear today's history? [y/N]");
            return true;
        }
        Input::Help => println!("{HELP}"),
        Input::Quit => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomocycle_core::timer::{ManualScheduler, ManualTicker};
    use pomocycle_core::{Event, TimerPhase};

    #[test]
    fn empty_line_toggles() {
        assert_eq!(parse_input(""), Ok(Input::Toggle));
        assert_eq!(parse_input("  t "), Ok(Input::Toggle));
    }

    #[test]
    fn mode_requires_known_kind() {
        assert_eq!(
            parse_input("m long-break"),
            Ok(Input::Mode(SessionKind::LongBreak))
        );
        let err = parse_input("m nap").unwrap_err();
        assert!(err.contains("unknown session kind"));
        assert!(parse_input("m").is_err());
    }

    #[test]
    fn volume_is_bounded() {
        assert_eq!(parse_input("v 75"), Ok(Input::Volume(75)));
        assert!(parse_input("v 101").is_err());
        assert!(parse_input("v loud").is_err());
    }

    #[test]
    fn duration_only_for_configurable_kinds() {
        assert_eq!(
            parse_input("d short-break 7"),
            Ok(Input::Duration(SessionKind::ShortBreak, 7))
        );
        assert!(parse_input("d long-focus 30").is_err());
        assert!(parse_input("d pomodoro 0").is_err());
        assert!(parse_input("d pomodoro").is_err());
    }

    #[test]
    fn dispatch_duration_resizes_idle_session() {
        let mem = MemoryStore::new();
        let mut engine = CycleEngine::new(
            HistoryStore::load(Box::new(mem.clone())),
            SettingsStore::load(Box::new(mem)),
            Box::new(ManualTicker::new()),
            Box::new(ManualScheduler::new()),
            Vec::<Event>::new(),
            EngineOptions::default(),
        );
        dispatch(&mut engine, Input::Duration(SessionKind::Pomodoro, 30));
        assert_eq!(engine.settings().pomodoro_min, 30);
        assert_eq!(engine.state().total_secs, 30 * 60);
        assert_eq!(engine.state().remaining_secs, 30 * 60);

        dispatch(&mut engine, Input::Toggle);
        dispatch(&mut engine, Input::Duration(SessionKind::Pomodoro, 45));
        assert_eq!(engine.settings().pomodoro_min, 45);
        assert_eq!(engine.state().total_secs, 30 * 60);
    }

    #[test]
    fn dispatch_drives_engine() {
        let mem = MemoryStore::new();
        let mut engine = CycleEngine::new(
            HistoryStore::load(Box::new(mem.clone())),
            SettingsStore::load(Box::new(mem)),
            Box::new(ManualTicker::new()),
            Box::new(ManualScheduler::new()),
            Vec::<Event>::new(),
            EngineOptions::default(),
        );
        assert!(!dispatch(&mut engine, Input::Toggle));
        assert_eq!(engine.phase(), TimerPhase::Running);
        dispatch(&mut engine, Input::Toggle);
        dispatch(&mut engine, Input::Skip);
        assert_eq!(engine.history().len(), 1);
        assert!(dispatch(&mut engine, Input::Clear));
        dispatch(&mut engine, Input::AutoMode);
        assert!(engine.auto_mode());
    }
}
