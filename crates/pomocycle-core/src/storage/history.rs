//! Today's completed sessions.
//!
//! The record is a JSON array, newest first, rewritten whole on every
//! mutation. Entries older than the start of the current local day are
//! dropped on every load and append.

use chrono::{DateTime, Local, NaiveTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use super::{Storage, HISTORY_KEY};
use crate::session::{Category, SessionCatalog, SessionKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub session: SessionKind,
    /// Completion time, epoch milliseconds.
    pub timestamp: i64,
    /// Minutes configured for the kind when the entry was written.
    pub duration: u32,
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryStats {
    pub work_sessions: usize,
    pub total_minutes: u64,
    pub current_streak: u32,
}

pub struct HistoryStore {
    storage: Box<dyn Storage>,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Load today's history. Missing or corrupt data yields an empty list.
    pub fn load(storage: Box<dyn Storage>) -> Self {
        Self::load_at(storage, Local::now())
    }

    pub fn load_at<Tz: TimeZone>(storage: Box<dyn Storage>, now: DateTime<Tz>) -> Self {
        let entries = match storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(error = %e, "discarding corrupt history record");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "history record unreadable, starting empty");
                Vec::new()
            }
        };
        let mut store = Self { storage, entries };
        store.retain_day_of(&now);
        store
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a completed session using the catalog as it is right now.
    pub fn append(&mut self, kind: SessionKind, catalog: &SessionCatalog) -> &[HistoryEntry] {
        self.append_at(kind, catalog, Local::now())
    }

    pub fn append_at<Tz: TimeZone>(
        &mut self,
        kind: SessionKind,
        catalog: &SessionCatalog,
        now: DateTime<Tz>,
    ) -> &[HistoryEntry] {
        let spec = catalog.spec(kind);
        let entry = HistoryEntry {
            session: kind,
            timestamp: now.timestamp_millis(),
            duration: spec.duration_min,
            icon: spec.icon.clone(),
        };
        self.entries.insert(0, entry);
        self.retain_day_of(&now);
        self.persist();
        &self.entries
    }

    /// Empty the history if `confirm` says yes. Returns whether it cleared.
    pub fn clear<F>(&mut self, confirm: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        if !confirm() {
            return false;
        }
        self.entries.clear();
        self.persist();
        true
    }

    /// Counts over the retained entries. The streak belongs to the cycle
    /// engine and is passed through untouched.
    pub fn compute_stats(&self, catalog: &SessionCatalog, current_streak: u32) -> HistoryStats {
        let work_sessions = self
            .entries
            .iter()
            .filter(|e| catalog.category(e.session) == Category::Work)
            .count();
        let total_minutes = self.entries.iter().map(|e| u64::from(e.duration)).sum();
        HistoryStats {
            work_sessions,
            total_minutes,
            current_streak,
        }
    }

    fn retain_day_of<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) {
        let cutoff = start_of_day_ms(now);
        self.entries.retain(|e| e.timestamp >= cutoff);
    }

    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.entries) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode history");
                return;
            }
        };
        if let Err(e) = self.storage.set(HISTORY_KEY, &json) {
            tracing::warn!(error = %e, "failed to persist history");
        }
    }
}

/// Epoch milliseconds of local midnight for the day containing `now`.
pub(crate) fn start_of_day_ms<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    match now.timezone().from_local_datetime(&midnight).earliest() {
        Some(start) => start.timestamp_millis(),
        // Midnight skipped by a DST jump.
        None => {
            let since_midnight = i64::from(now.time().num_seconds_from_midnight()) * 1000;
            now.timestamp_millis() - since_midnight
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::{Duration, FixedOffset};

    fn noon() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2026, 3, 14, 12, 0, 0)
            .unwrap()
    }

    #[test]
    fn start_of_day_is_local_midnight() {
        let now = noon();
        let expected = now - Duration::hours(12);
        assert_eq!(start_of_day_ms(&now), expected.timestamp_millis());
    }

    #[test]
    fn append_prepends_and_persists() {
        let mem = MemoryStore::new();
        let catalog = SessionCatalog::default();
        let mut store = HistoryStore::load_at(Box::new(mem.clone()), noon());

        store.append_at(SessionKind::Pomodoro, &catalog, noon());
        store.append_at(SessionKind::ShortBreak, &catalog, noon() + Duration::minutes(30));

        assert_eq!(store.entries()[0].session, SessionKind::ShortBreak);
        assert_eq!(store.entries()[1].session, SessionKind::Pomodoro);
        assert_eq!(store.entries()[1].duration, 25);
        assert_eq!(store.entries()[1].icon, "🍅");

        let raw = mem.get(HISTORY_KEY).unwrap().unwrap();
        let persisted: Vec<HistoryEntry> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, store.entries());
    }

    #[test]
    fn entries_use_wire_field_names() {
        let entry = HistoryEntry {
            session: SessionKind::Refocus2,
            timestamp: 1_700_000_000_000,
            duration: 2,
            icon: "🔁".into(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["session"], "refocus-2");
        assert_eq!(json["timestamp"], 1_700_000_000_000_i64);
        assert_eq!(json["duration"], 2);
    }

    #[test]
    fn yesterday_is_dropped_on_append() {
        let catalog = SessionCatalog::default();
        let yesterday = noon() - Duration::days(1);
        let mut store = HistoryStore::load_at(Box::new(MemoryStore::new()), yesterday);
        store.append_at(SessionKind::Pomodoro, &catalog, yesterday);
        assert_eq!(store.entries().len(), 1);

        store.append_at(SessionKind::LongBreak, &catalog, noon());
        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.entries()[0].session, SessionKind::LongBreak);
    }

    #[test]
    fn corrupt_record_loads_empty() {
        let mem = MemoryStore::new().with_value(HISTORY_KEY, "{not json");
        let store = HistoryStore::load_at(Box::new(mem), noon());
        assert!(store.is_empty());
    }

    #[test]
    fn clear_requires_confirmation() {
        let mem = MemoryStore::new();
        let catalog = SessionCatalog::default();
        let mut store = HistoryStore::load_at(Box::new(mem.clone()), noon());
        store.append_at(SessionKind::Pomodoro, &catalog, noon());

        assert!(!store.clear(|| false));
        assert_eq!(store.entries().len(), 1);

        assert!(store.clear(|| true));
        assert!(store.is_empty());
        assert_eq!(mem.get(HISTORY_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn stats_count_work_and_sum_all_minutes() {
        let catalog = SessionCatalog::default();
        let mut store = HistoryStore::load_at(Box::new(MemoryStore::new()), noon());
        store.append_at(SessionKind::Pomodoro, &catalog, noon());
        store.append_at(SessionKind::ShortBreak, &catalog, noon());
        store.append_at(SessionKind::LongFocus, &catalog, noon());

        let stats = store.compute_stats(&catalog, 7);
        assert_eq!(stats.work_sessions, 2);
        assert_eq!(stats.total_minutes, 25 + 5 + 50);
        assert_eq!(stats.current_streak, 7);
    }
}
