//! Timeline command: the refresh batch for glanceable surfaces.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};

use fast_core::{TimelineSnapshot, build_timeline};
use fast_db::Database;

use crate::Config;

/// Reads the active-session snapshot, degrading to the idle snapshot on any
/// store failure.
///
/// A glanceable surface asking for its refresh batch must never crash on a
/// broken store; it renders the idle state and tries again at the next
/// reload.
fn load_snapshot(config: &Config) -> TimelineSnapshot {
    let result = Database::open(&config.database_path).and_then(|db| db.active_session());
    match result {
        Ok(session) => TimelineSnapshot::from_active_session(session.as_ref()),
        Err(error) => {
            tracing::warn!(%error, "falling back to idle timeline");
            TimelineSnapshot::empty()
        }
    }
}

pub fn run<W: Write>(writer: &mut W, json: bool, config: &Config, now: DateTime<Utc>) -> Result<()> {
    let snapshot = load_snapshot(config);
    let timeline = build_timeline(&snapshot, now);

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&timeline)?)?;
        return Ok(());
    }

    if snapshot.is_active() {
        let first = &timeline.entries[0];
        writeln!(
            writer,
            "Fast active: {} entries, one per minute.",
            timeline.entries.len()
        )?;
        writeln!(
            writer,
            "Now: {} elapsed, {}m remaining.",
            first.elapsed_text, first.remaining_minutes
        )?;
    } else {
        writeln!(writer, "No fast is running.")?;
    }
    writeln!(
        writer,
        "Reload after {}.",
        timeline.reload_after.format("%Y-%m-%d %H:%M")
    )?;

    Ok(())
}
