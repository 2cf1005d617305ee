//! Stop command: end the running fast and cancel pending alerts.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use fast_core::{format, notify, progress};
use fast_db::Database;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config, now: DateTime<Utc>) -> Result<()> {
    let mut db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;

    let Some(session) = db.active_session()? else {
        writeln!(writer, "No fast is running.")?;
        return Ok(());
    };

    db.end_fast(&session.id, now)?;

    // Both alert identifiers are cancelled unconditionally; cancelling one
    // that never fired (or was never scheduled) is a no-op downstream.
    let cancelled = notify::cancellation_identifiers();
    tracing::debug!(?cancelled, "cancelled pending alerts");

    let elapsed = now - session.start_time;
    writeln!(
        writer,
        "Stopped after {}.",
        format::format_interval_natural(elapsed)
    )?;
    if progress::is_goal_met(elapsed, session.goal_minutes) {
        if let Some(goal) = session.goal_minutes {
            let goal_text = format::format_compact(
                progress::hours_from_minutes(goal),
                progress::minutes_component(goal),
            );
            writeln!(writer, "Goal reached ({goal_text}).")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone};
    use insta::assert_snapshot;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0)
            .single()
            .expect("valid test timestamp")
    }

    fn test_config(dir: &std::path::Path) -> Config {
        Config {
            database_path: dir.join("fast.db"),
            default_goal_minutes: 960,
        }
    }

    #[test]
    fn stop_reports_elapsed_and_goal() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        let mut db = Database::open(&config.database_path).unwrap();
        db.start_fast(now(), Some(960)).unwrap();
        drop(db);

        let mut output = Vec::new();
        run(
            &mut output,
            &config,
            now() + Duration::hours(16) + Duration::minutes(5),
        )
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Stopped after 16 hours and 5 minutes.
        Goal reached (16h).
        ");
    }

    #[test]
    fn stop_before_goal_omits_goal_line() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        let mut db = Database::open(&config.database_path).unwrap();
        db.start_fast(now(), Some(960)).unwrap();
        drop(db);

        let mut output = Vec::new();
        run(&mut output, &config, now() + Duration::hours(8)).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @"Stopped after 8 hours.");
    }

    #[test]
    fn stop_without_active_fast_is_calm() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());

        let mut output = Vec::new();
        run(&mut output, &config, now()).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @"No fast is running.");
    }

    #[test]
    fn stop_freezes_duration() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        let mut db = Database::open(&config.database_path).unwrap();
        let session = db.start_fast(now(), Some(960)).unwrap();
        drop(db);

        let mut output = Vec::new();
        run(&mut output, &config, now() + Duration::hours(10)).unwrap();

        let db = Database::open(&config.database_path).unwrap();
        let stored = db.session(&session.id).unwrap();
        assert!(!stored.is_active());
        assert_eq!(stored.duration(now()), Duration::hours(10));
    }
}
