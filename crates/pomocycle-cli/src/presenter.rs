//! Terminal rendering of engine events.

use std::io::Write;

use pomocycle_core::timer::POMODOROS_PER_CYCLE;
use pomocycle_core::{Activity, Category, Cue, Event, EventSink};

const BAR_WIDTH: usize = 20;

/// Keeps the last known display state and redraws one status line on
/// every progress update. Everything else is printed on its own line.
pub struct TerminalPresenter<W: Write> {
    out: W,
    bell: bool,
    display: String,
    label: String,
    category: Option<Category>,
    caption: String,
}

impl TerminalPresenter<std::io::Stdout> {
    pub fn stdout(bell: bool) -> Self {
        Self::new(std::io::stdout(), bell)
    }
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W, bell: bool) -> Self {
        Self {
            out,
            bell,
            display: String::new(),
            label: String::new(),
            category: None,
            caption: String::new(),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn status_line(&self, fraction: f64) -> String {
        let filled = ((1.0 - fraction.clamp(0.0, 1.0)) * BAR_WIDTH as f64).round() as usize;
        let bar = format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled));
        let tag = match self.category {
            Some(Category::Work) => "work",
            Some(Category::Break) => "break",
            None => "",
        };
        format!(
            "{} [{bar}] {} ({tag}) | {}",
            self.display, self.label, self.caption
        )
    }

    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "\r\x1b[2K{text}");
    }

    fn render(&mut self, event: Event) {
        match event {
            Event::Display { text } => self.display = text,
            Event::Badge { label, category } => {
                self.label = label;
                self.category = Some(category);
            }
            Event::CycleDots {
                filled, caption, ..
            } => {
                let dots: String = (0..POMODOROS_PER_CYCLE)
                    .map(|i| if i < filled { '●' } else { '○' })
                    .collect();
                self.caption = format!("{dots} {caption}");
            }
            Event::Progress { fraction } => {
                let status = self.status_line(fraction);
                let _ = write!(self.out, "\r\x1b[2K{status}");
            }
            Event::Activity { activity } => {
                let text = match activity {
                    Activity::Ready => "ready",
                    Activity::Focused => "focused",
                    Activity::Paused => "paused",
                    Activity::Complete => "complete",
                };
                self.line(&format!("-- {text}"));
            }
            Event::Stats {
                work_sessions,
                total_minutes,
                current_streak,
            } => {
                self.line(&format!(
                    "today: {work_sessions} work sessions, {total_minutes} min, streak {current_streak}"
                ));
            }
            Event::History { entries } => {
                if let Some(latest) = entries.first() {
                    self.line(&format!(
                        "history: {} entries, latest {} {}",
                        entries.len(),
                        latest.icon,
                        latest.session
                    ));
                } else {
                    self.line("history: empty");
                }
            }
            Event::Cue { cue, volume } => {
                // Sound is best effort; a muted terminal just stays quiet.
                if self.bell && volume > 0 && cue == Cue::Alarm {
                    let _ = write!(self.out, "\x07");
                }
            }
            Event::SessionCompleted {
                session,
                next,
                auto_start,
                ..
            } => {
                let then = if auto_start { "starting" } else { "up next" };
                self.line(&format!("{session} done, {then}: {next}"));
            }
            Event::NextArmed { .. } | Event::ImageRefresh { .. } | Event::Pulse { .. } => {}
        }
        let _ = self.out.flush();
    }
}

impl<W: Write> EventSink for TerminalPresenter<W> {
    fn emit(&mut self, event: Event) {
        self.render(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(events: Vec<Event>) -> String {
        let mut presenter = TerminalPresenter::new(Vec::new(), true);
        for event in events {
            presenter.emit(event);
        }
        String::from_utf8(presenter.into_inner()).unwrap()
    }

    #[test]
    fn progress_redraws_status_line() {
        let out = rendered(vec![
            Event::Display {
                text: "12:30".into(),
            },
            Event::Badge {
                label: "Pomodoro".into(),
                category: Category::Work,
            },
            Event::CycleDots {
                filled: 2,
                active_index: 2,
                caption: "2 de 4 pomodoros".into(),
            },
            Event::Progress { fraction: 0.5 },
        ]);
        assert!(out.contains("12:30 [##########----------] Pomodoro (work)"));
        assert!(out.contains("●●○○ 2 de 4 pomodoros"));
    }

    #[test]
    fn cycle_dots_cover_whole_cycle() {
        let out = rendered(vec![
            Event::CycleDots {
                filled: POMODOROS_PER_CYCLE,
                active_index: POMODOROS_PER_CYCLE,
                caption: "4 de 4 pomodoros".into(),
            },
            Event::Progress { fraction: 1.0 },
        ]);
        assert!(out.contains("●●●● 4 de 4 pomodoros"));
    }

    #[test]
    fn alarm_rings_bell_only_when_audible() {
        let out = rendered(vec![Event::Cue {
            cue: Cue::Alarm,
            volume: 40,
        }]);
        assert!(out.contains('\x07'));

        let muted = rendered(vec![Event::Cue {
            cue: Cue::Alarm,
            volume: 0,
        }]);
        assert!(!muted.contains('\x07'));
    }
}
