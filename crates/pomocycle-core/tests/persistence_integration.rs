//! History and settings records on a real SQLite file.

use chrono::{Duration, Local};
use pomocycle_core::storage::{HISTORY_KEY, SETTINGS_KEY};
use pomocycle_core::{
    HistoryEntry, HistoryStore, SessionCatalog, SessionKind, Settings, SettingsStore, SqliteStore,
    Storage,
};
use tempfile::TempDir;

fn open(dir: &TempDir) -> SqliteStore {
    SqliteStore::open_at(&dir.path().join("pomocycle.db")).unwrap()
}

#[test]
fn history_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let catalog = SessionCatalog::default();
    {
        let mut history = HistoryStore::load(Box::new(open(&dir)));
        history.append(SessionKind::Pomodoro, &catalog);
        history.append(SessionKind::ShortBreak, &catalog);
    }

    let history = HistoryStore::load(Box::new(open(&dir)));
    let sessions: Vec<_> = history.entries().iter().map(|e| e.session).collect();
    assert_eq!(sessions, vec![SessionKind::ShortBreak, SessionKind::Pomodoro]);
}

#[test]
fn yesterdays_entries_are_pruned_on_load() {
    let dir = TempDir::new().unwrap();
    let now = Local::now();
    let stale = vec![
        HistoryEntry {
            session: SessionKind::Pomodoro,
            timestamp: now.timestamp_millis(),
            duration: 25,
            icon: "🍅".into(),
        },
        HistoryEntry {
            session: SessionKind::LongBreak,
            timestamp: (now - Duration::days(1)).timestamp_millis(),
            duration: 15,
            icon: "🌿".into(),
        },
    ];
    let mut store = open(&dir);
    store
        .set(HISTORY_KEY, &serde_json::to_string(&stale).unwrap())
        .unwrap();

    let history = HistoryStore::load_at(Box::new(open(&dir)), now);
    assert_eq!(history.entries().len(), 1);
    assert_eq!(history.entries()[0].session, SessionKind::Pomodoro);
}

#[test]
fn settings_survive_reopen_and_drive_catalog() {
    let dir = TempDir::new().unwrap();
    {
        let mut settings = SettingsStore::load(Box::new(open(&dir)));
        settings
            .save(Settings {
                pomodoro_min: 45,
                long_break_min: 20,
                auto_start_pomodoros: true,
                volume: 80,
                ..Settings::default()
            })
            .unwrap();
    }

    let settings = SettingsStore::load(Box::new(open(&dir)));
    assert_eq!(settings.get().pomodoro_min, 45);
    assert!(settings.get().auto_start_pomodoros);
    assert_eq!(settings.get().volume, 80);

    let mut catalog = SessionCatalog::default();
    settings.get().apply_durations(&mut catalog);
    assert_eq!(catalog.duration_secs(SessionKind::Pomodoro), 45 * 60);
    assert_eq!(catalog.duration_secs(SessionKind::LongBreak), 20 * 60);
}

#[test]
fn corrupt_settings_record_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let mut store = open(&dir);
    store.set(SETTINGS_KEY, "{\"pomodoro\": \"many\"}").unwrap();

    let settings = SettingsStore::load(Box::new(open(&dir)));
    assert_eq!(settings.get(), &Settings::default());
}
