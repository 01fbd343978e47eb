use clap::Subcommand;
use pomocycle_core::{Settings, SettingsStore, SqliteStore};

use super::CliResult;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the current settings as JSON
    Show,
    /// Change one or more settings and save
    Set {
        #[arg(long)]
        pomodoro: Option<u32>,
        #[arg(long)]
        short_break: Option<u32>,
        #[arg(long)]
        long_break: Option<u32>,
        #[arg(long)]
        auto_start_breaks: Option<bool>,
        #[arg(long)]
        auto_start_pomodoros: Option<bool>,
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        volume: Option<u8>,
    },
    /// Set the alarm volume (0-100)
    Volume {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        level: u8,
    },
    /// Restore default settings
    Reset,
}

pub fn run(action: SettingsAction) -> CliResult {
    let mut store = SettingsStore::load(Box::new(SqliteStore::open()?));

    match action {
        SettingsAction::Show => {}
        SettingsAction::Set {
            pomodoro,
            short_break,
            long_break,
            auto_start_breaks,
            auto_start_pomodoros,
            volume,
        } => {
            let current = store.get();
            let updated = Settings {
                pomodoro_min: pomodoro.unwrap_or(current.pomodoro_min),
                short_break_min: short_break.unwrap_or(current.short_break_min),
                long_break_min: long_break.unwrap_or(current.long_break_min),
                auto_start_breaks: auto_start_breaks.unwrap_or(current.auto_start_breaks),
                auto_start_pomodoros: auto_start_pomodoros.unwrap_or(current.auto_start_pomodoros),
                volume: volume.unwrap_or(current.volume),
            };
            store.save(updated)?;
        }
        SettingsAction::Volume { level } => {
            store.set_volume(level);
        }
        SettingsAction::Reset => {
            store.save(Settings::default())?;
        }
    }

    println!("{}", serde_json::to_string_pretty(store.get())?);
    Ok(())
}
