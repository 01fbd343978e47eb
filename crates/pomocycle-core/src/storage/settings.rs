//! User settings: durations, auto-start flags and alarm volume.
//!
//! Stored as one camelCase JSON object under the `settings` key. Loading
//! overlays whatever keys are present on top of the defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Storage, SETTINGS_KEY};
use crate::error::ValidationError;
use crate::session::{Category, SessionCatalog, SessionKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(rename = "pomodoro", default = "default_pomodoro")]
    pub pomodoro_min: u32,
    #[serde(rename = "shortBreak", default = "default_short_break")]
    pub short_break_min: u32,
    #[serde(rename = "longBreak", default = "default_long_break")]
    pub long_break_min: u32,
    #[serde(default)]
    pub auto_start_breaks: bool,
    #[serde(default)]
    pub auto_start_pomodoros: bool,
    #[serde(default = "default_volume")]
    pub volume: u8,
}

fn default_pomodoro() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_volume() -> u8 {
    50
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pomodoro_min: default_pomodoro(),
            short_break_min: default_short_break(),
            long_break_min: default_long_break(),
            auto_start_breaks: false,
            auto_start_pomodoros: false,
            volume: default_volume(),
        }
    }
}

impl Settings {
    /// Reject zero durations and clamp the volume into 0..=100.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        for (field, value) in [
            ("pomodoro", self.pomodoro_min),
            ("shortBreak", self.short_break_min),
            ("longBreak", self.long_break_min),
        ] {
            if value == 0 {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    message: "duration must be at least one minute".to_string(),
                });
            }
        }
        self.volume = self.volume.min(100);
        Ok(self)
    }

    /// Overlay a stored record onto the defaults. Keys are checked one by
    /// one: a missing, null or invalid key keeps its default without
    /// affecting the others. Volumes above 100 are clamped.
    pub fn overlay(record: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        let duration = |key: &str, fallback: u32| match record.get(key) {
            None | Some(Value::Null) => fallback,
            Some(value) => match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
                Some(minutes) if minutes > 0 => minutes,
                _ => {
                    tracing::warn!(key, %value, "ignoring invalid persisted duration");
                    fallback
                }
            },
        };
        let flag = |key: &str, fallback: bool| match record.get(key) {
            None | Some(Value::Null) => fallback,
            Some(Value::Bool(b)) => *b,
            Some(value) => {
                tracing::warn!(key, %value, "ignoring invalid persisted flag");
                fallback
            }
        };
        let volume = match record.get("volume") {
            None | Some(Value::Null) => defaults.volume,
            Some(value) => match value.as_u64() {
                Some(level) => level.min(100) as u8,
                None => {
                    tracing::warn!(%value, "ignoring invalid persisted volume");
                    defaults.volume
                }
            },
        };
        Self {
            pomodoro_min: duration("pomodoro", defaults.pomodoro_min),
            short_break_min: duration("shortBreak", defaults.short_break_min),
            long_break_min: duration("longBreak", defaults.long_break_min),
            auto_start_breaks: flag("autoStartBreaks", defaults.auto_start_breaks),
            auto_start_pomodoros: flag("autoStartPomodoros", defaults.auto_start_pomodoros),
            volume,
        }
    }

    /// Whether the session after one of `completed` category starts on its
    /// own. The per-category flag wins; `legacy_auto_mode` is only consulted
    /// when that flag is off.
    pub fn should_auto_start(&self, completed: Category, legacy_auto_mode: bool) -> bool {
        let flag = match completed {
            Category::Work => self.auto_start_breaks,
            Category::Break => self.auto_start_pomodoros,
        };
        if flag {
            return true;
        }
        legacy_auto_mode
    }

    /// Push the configurable durations into the catalog. Returns whether
    /// any duration changed.
    pub fn apply_durations(&self, catalog: &mut SessionCatalog) -> bool {
        let a = catalog.set_duration(SessionKind::Pomodoro, self.pomodoro_min);
        let b = catalog.set_duration(SessionKind::ShortBreak, self.short_break_min);
        let c = catalog.set_duration(SessionKind::LongBreak, self.long_break_min);
        a || b || c
    }
}

pub struct SettingsStore {
    storage: Box<dyn Storage>,
    settings: Settings,
}

impl SettingsStore {
    /// Load persisted settings over the defaults. Unknown keys are ignored,
    /// bad keys keep their defaults and unreadable records fall back to the
    /// defaults entirely.
    pub fn load(storage: Box<dyn Storage>) -> Self {
        let settings = match storage.get(SETTINGS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(record)) => Settings::overlay(&record),
                Ok(_) => {
                    tracing::warn!("settings record is not an object, using defaults");
                    Settings::default()
                }
                Err(e) => {
                    tracing::warn!(error = %e, "discarding corrupt settings record");
                    Settings::default()
                }
            },
            Ok(None) => Settings::default(),
            Err(e) => {
                tracing::warn!(error = %e, "settings record unreadable, using defaults");
                Settings::default()
            }
        };
        Self { storage, settings }
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Replace and persist the whole settings object.
    pub fn save(&mut self, settings: Settings) -> Result<&Settings, ValidationError> {
        self.settings = settings.validated()?;
        self.persist();
        Ok(&self.settings)
    }

    /// Volume slider. Clamped to 100 and written immediately.
    pub fn set_volume(&mut self, volume: u8) -> u8 {
        self.settings.volume = volume.min(100);
        self.persist();
        self.settings.volume
    }

    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.settings) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode settings");
                return;
            }
        };
        if let Err(e) = self.storage.set(SETTINGS_KEY, &json) {
            tracing::warn!(error = %e, "failed to persist settings");
        }
    }
}
