pub mod config;
pub mod history;
pub mod run;
pub mod settings;
pub mod stats;

use std::io::{BufRead, Write};

use pomocycle_core::{HistoryStore, SettingsStore, SqliteStore};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open both stores on the SQLite file in the data directory.
pub fn open_stores() -> Result<(HistoryStore, SettingsStore), Box<dyn std::error::Error>> {
    let history = HistoryStore::load(Box::new(SqliteStore::open()?));
    let settings = SettingsStore::load(Box::new(SqliteStore::open()?));
    Ok((history, settings))
}

/// Ask a yes/no question on stdin. Anything but y/yes (including EOF) is no.
pub fn confirm_on_stdin(prompt: &str) -> bool {
    eprint!("{prompt} [y/N] ");
    let _ = std::io::stderr().flush();
    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_yes(&answer),
        Err(_) => false,
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
