//! Status command: the main-view rendition of the current fast.
//!
//! This is also the arithmetic behind the voice "status" phrase: elapsed
//! plus remaining, derived from the same calculator every other surface
//! uses.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use fast_core::{format, progress};
use fast_db::Database;

use crate::Config;

/// Derived status of the current fast, for the `--json` surface.
#[derive(Debug, Serialize)]
struct StatusView {
    active: bool,
    session_id: Option<String>,
    start_time: Option<DateTime<Utc>>,
    elapsed_text: Option<String>,
    goal_minutes: Option<i64>,
    remaining_minutes: i64,
    progress: f64,
    goal_met: bool,
    /// True exactly once per session: the first evaluation that observes
    /// the goal met. Consumers show their celebration on this signal.
    celebrate: bool,
}

impl StatusView {
    fn idle() -> Self {
        Self {
            active: false,
            session_id: None,
            start_time: None,
            elapsed_text: None,
            goal_minutes: None,
            remaining_minutes: 0,
            progress: 0.0,
            goal_met: false,
            celebrate: false,
        }
    }
}

#[allow(clippy::cast_possible_truncation, reason = "progress is in [0, 1]")]
fn percent(progress: f64) -> i64 {
    (progress * 100.0).round() as i64
}

fn goal_text(goal_minutes: i64) -> String {
    format::format_compact(
        progress::hours_from_minutes(goal_minutes),
        progress::minutes_component(goal_minutes),
    )
}

pub fn run<W: Write>(writer: &mut W, json: bool, config: &Config, now: DateTime<Utc>) -> Result<()> {
    let mut db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;

    let Some(session) = db.active_session()? else {
        if json {
            writeln!(writer, "{}", serde_json::to_string_pretty(&StatusView::idle())?)?;
        } else {
            writeln!(writer, "No fast is running.")?;
            if let Some(goal) = db.last_goal_minutes()? {
                writeln!(writer, "Last goal: {}.", goal_text(goal))?;
            }
        }
        return Ok(());
    };

    let elapsed = session.duration(now);
    let goal_met = session.goal_met(now);

    // Present the celebration exactly once per session, no matter how many
    // surfaces evaluate after the goal is reached.
    let celebrate = goal_met && !session.goal_celebration_shown;
    if celebrate {
        db.set_celebration_shown(&session.id)?;
    }

    if json {
        let view = StatusView {
            active: true,
            session_id: Some(session.id.clone()),
            start_time: Some(session.start_time),
            elapsed_text: Some(format::format_interval_compact(elapsed)),
            goal_minutes: session.goal_minutes,
            remaining_minutes: progress::remaining_minutes(elapsed, session.goal_minutes),
            progress: progress::progress(elapsed, session.goal_minutes),
            goal_met,
            celebrate,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&view)?)?;
        return Ok(());
    }

    writeln!(
        writer,
        "Fasting for {} (since {}).",
        format::format_interval_compact(elapsed),
        session.start_time.format("%Y-%m-%d %H:%M")
    )?;

    match session.goal_minutes {
        Some(goal) if goal_met => {
            writeln!(writer, "Goal {} reached.", goal_text(goal))?;
            if celebrate {
                writeln!(writer, "Nice work!")?;
            }
        }
        Some(goal) => {
            let remaining = progress::remaining_minutes(elapsed, session.goal_minutes);
            writeln!(
                writer,
                "Goal {}: {} to go ({}%).",
                goal_text(goal),
                format::format_compact(
                    progress::hours_from_minutes(remaining),
                    progress::minutes_component(remaining)
                ),
                percent(progress::progress(elapsed, session.goal_minutes))
            )?;
        }
        None => writeln!(writer, "No goal set.")?,
    }

    Ok(())
}
