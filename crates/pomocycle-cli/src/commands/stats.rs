use pomocycle_core::SessionCatalog;

use super::{open_stores, CliResult};

/// Today's stats. The streak only exists inside a running timer, so it is
/// always zero here.
pub fn run(json: bool) -> CliResult {
    let (history, settings) = open_stores()?;
    let mut catalog = SessionCatalog::default();
    settings.get().apply_durations(&mut catalog);
    let stats = history.compute_stats(&catalog, 0);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("work sessions: {}", stats.work_sessions);
        println!("total minutes: {}", stats.total_minutes);
    }
    Ok(())
}
