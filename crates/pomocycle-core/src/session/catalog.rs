//! Session kinds and the catalog that maps each kind to its duration,
//! label, category and history icon.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionKind {
    Pomodoro,
    LongFocus,
    ShortBreak,
    LongBreak,
    #[serde(rename = "refocus-2")]
    Refocus2,
}

impl SessionKind {
    pub const ALL: [SessionKind; 5] = [
        SessionKind::Pomodoro,
        SessionKind::LongFocus,
        SessionKind::ShortBreak,
        SessionKind::LongBreak,
        SessionKind::Refocus2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Pomodoro => "pomodoro",
            SessionKind::LongFocus => "long-focus",
            SessionKind::ShortBreak => "short-break",
            SessionKind::LongBreak => "long-break",
            SessionKind::Refocus2 => "refocus-2",
        }
    }

    fn index(self) -> usize {
        match self {
            SessionKind::Pomodoro => 0,
            SessionKind::LongFocus => 1,
            SessionKind::ShortBreak => 2,
            SessionKind::LongBreak => 3,
            SessionKind::Refocus2 => 4,
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SessionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::UnknownSessionKind(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Break,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Break => "break",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSpec {
    /// Duration in minutes. Always positive.
    pub duration_min: u32,
    pub label: String,
    pub category: Category,
    pub icon: String,
}

impl SessionSpec {
    fn new(duration_min: u32, label: &str, category: Category, icon: &str) -> Self {
        Self {
            duration_min,
            label: label.into(),
            category,
            icon: icon.into(),
        }
    }

    /// Duration in seconds, saturating on absurd minute values.
    pub fn duration_secs(&self) -> u64 {
        u64::from(self.duration_min).saturating_mul(60)
    }
}

/// Kind -> spec table. Only the `pomodoro`, `short-break` and `long-break`
/// durations change at runtime, through [`SessionCatalog::set_duration`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCatalog {
    specs: [SessionSpec; 5],
}

impl SessionCatalog {
    pub fn spec(&self, kind: SessionKind) -> &SessionSpec {
        &self.specs[kind.index()]
    }

    pub fn category(&self, kind: SessionKind) -> Category {
        self.spec(kind).category
    }

    pub fn duration_secs(&self, kind: SessionKind) -> u64 {
        self.spec(kind).duration_secs()
    }

    /// Update a configurable duration. Zero minutes and fixed kinds are
    /// ignored; returns whether the catalog changed.
    pub fn set_duration(&mut self, kind: SessionKind, minutes: u32) -> bool {
        if !is_configurable(kind) || minutes == 0 {
            return false;
        }
        let spec = &mut self.specs[kind.index()];
        if spec.duration_min == minutes {
            return false;
        }
        spec.duration_min = minutes;
        true
    }
}

fn is_configurable(kind: SessionKind) -> bool {
    matches!(
        kind,
        SessionKind::Pomodoro | SessionKind::ShortBreak | SessionKind::LongBreak
    )
}

impl Default for SessionCatalog {
    fn default() -> Self {
        Self {
            specs: [
                SessionSpec::new(25, "Pomodoro", Category::Work, "🍅"),
                SessionSpec::new(50, "Foco Longo", Category::Work, "🎯"),
                SessionSpec::new(5, "Pausa Curta", Category::Break, "☕"),
                SessionSpec::new(15, "Pausa Longa", Category::Break, "🌿"),
                SessionSpec::new(2, "Refoco", Category::Work, "🔁"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_round_trip_through_strings() {
        for kind in SessionKind::ALL {
            assert_eq!(kind.as_str().parse::<SessionKind>().unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = "deep-work".parse::<SessionKind>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownSessionKind(ref s) if s == "deep-work"));
        assert_eq!(err.to_string(), "unknown session kind: 'deep-work'");
    }

    #[test]
    fn default_catalog_categories() {
        let catalog = SessionCatalog::default();
        assert_eq!(catalog.category(SessionKind::Pomodoro), Category::Work);
        assert_eq!(catalog.category(SessionKind::LongFocus), Category::Work);
        assert_eq!(catalog.category(SessionKind::Refocus2), Category::Work);
        assert_eq!(catalog.category(SessionKind::ShortBreak), Category::Break);
        assert_eq!(catalog.category(SessionKind::LongBreak), Category::Break);
        assert_eq!(catalog.duration_secs(SessionKind::Pomodoro), 25 * 60);
    }

    #[test]
    fn only_configurable_kinds_accept_new_durations() {
        let mut catalog = SessionCatalog::default();
        assert!(catalog.set_duration(SessionKind::Pomodoro, 30));
        assert!(!catalog.set_duration(SessionKind::LongFocus, 10));
        assert!(!catalog.set_duration(SessionKind::ShortBreak, 0));
        assert_eq!(catalog.spec(SessionKind::Pomodoro).duration_min, 30);
        assert_eq!(catalog.spec(SessionKind::LongFocus).duration_min, 50);
        assert_eq!(catalog.spec(SessionKind::ShortBreak).duration_min, 5);
    }
}
