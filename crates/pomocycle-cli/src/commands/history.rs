use chrono::{Local, TimeZone};
use clap::Subcommand;
use pomocycle_core::HistoryEntry;

use super::{confirm_on_stdin, open_stores, CliResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List today's completed sessions, newest first
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete today's history
    Clear {
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: HistoryAction) -> CliResult {
    let (mut history, _settings) = open_stores()?;

    match action {
        HistoryAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(history.entries())?);
            } else if history.is_empty() {
                println!("no sessions today");
            } else {
                for entry in history.entries() {
                    println!("{}", format_entry(entry));
                }
            }
        }
        HistoryAction::Clear { yes } => {
            let cleared = history.clear(|| yes || confirm_on_stdin("Clear today's history?"));
            if cleared {
                println!("history cleared");
            } else {
                println!("history kept");
            }
        }
    }
    Ok(())
}

fn format_entry(entry: &HistoryEntry) -> String {
    let time = Local
        .timestamp_millis_opt(entry.timestamp)
        .single()
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string());
    format!(
        "{time}  {} {:<12} {:>3} min",
        entry.icon, entry.session, entry.duration
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomocycle_core::SessionKind;

    #[test]
    fn entry_line_shows_kind_and_minutes() {
        let entry = HistoryEntry {
            session: SessionKind::ShortBreak,
            timestamp: Local::now().timestamp_millis(),
            duration: 5,
            icon: "☕".into(),
        };
        let line = format_entry(&entry);
        assert!(line.contains("short-break"));
        assert!(line.ends_with("  5 min"));
    }
}
