mod config;
pub mod database;
pub mod history;
pub mod memory;
pub mod settings;

pub use config::{Config, LogConfig, PresentationConfig, TimerConfig};
pub use database::SqliteStore;
pub use history::{HistoryEntry, HistoryStats, HistoryStore};
pub use memory::MemoryStore;
pub use settings::{Settings, SettingsStore};

use std::path::PathBuf;

use crate::error::{ConfigError, StorageError};

/// Storage key of the history record.
pub const HISTORY_KEY: &str = "history";
/// Storage key of the settings record.
pub const SETTINGS_KEY: &str = "settings";

/// Whole-record key/value storage. Each record is read whole and written
/// whole; there are no partial updates.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Returns `~/.config/pomocycle[-dev]/` based on POMOCYCLE_ENV.
///
/// Set POMOCYCLE_ENV=dev to use the development data directory, or
/// POMOCYCLE_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("POMOCYCLE_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMOCYCLE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomocycle-dev")
            } else {
                base_dir.join("pomocycle")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
