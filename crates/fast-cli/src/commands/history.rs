//! History command: completed fasts as a chart plus summary statistics.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use fast_core::{FastingSession, chart_scale_max, format, recent_window, stats};
use fast_db::Database;

use crate::Config;

const BAR_WIDTH: usize = 10;

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// How many recent fasts to chart.
    #[arg(long, default_value_t = 14)]
    pub limit: usize,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct HistoryView<'a> {
    total: usize,
    goals_met: usize,
    success_rate: f64,
    avg_duration_minutes: Option<i64>,
    sessions: Vec<&'a FastingSession>,
}

/// Renders a duration as a fixed-width bar against the chart ceiling.
fn duration_bar(duration: chrono::Duration, scale: chrono::Duration) -> String {
    let scale_ms = scale.num_milliseconds();
    if scale_ms <= 0 {
        return "░".repeat(BAR_WIDTH);
    }
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "ratio is clamped to [0, 1] before scaling to a small width"
    )]
    let filled = ((duration.num_milliseconds() as f64 / scale_ms as f64).clamp(0.0, 1.0)
        * BAR_WIDTH as f64)
        .round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn run<W: Write>(writer: &mut W, args: &HistoryArgs, config: &Config) -> Result<()> {
    let db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;

    // Most recent first from the store; only completed fasts are charted
    let completed: Vec<FastingSession> = db
        .all_sessions()?
        .into_iter()
        .filter(|s| !s.is_active())
        .collect();
    let summary = stats(&completed);
    let window = recent_window(&completed, args.limit);

    if args.json {
        let view = HistoryView {
            total: summary.total,
            goals_met: summary.goals_met,
            success_rate: summary.success_rate,
            avg_duration_minutes: summary.avg_duration.map(|d| d.num_minutes()),
            sessions: window,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&view)?)?;
        return Ok(());
    }

    if summary.total == 0 {
        writeln!(writer, "No completed fasts yet.")?;
        return Ok(());
    }

    let scale = chart_scale_max(&completed);
    for session in &window {
        // Every charted session is completed, so the clock argument is moot
        let duration = session.duration(session.start_time);
        let goal_marker = if session.goal_met(session.start_time) {
            "  goal met"
        } else {
            ""
        };
        writeln!(
            writer,
            "{}  {:>7}  {}{}",
            session.start_time.format("%Y-%m-%d"),
            format::format_interval_compact(duration),
            duration_bar(duration, scale),
            goal_marker
        )?;
    }

    writeln!(writer)?;
    #[allow(clippy::cast_possible_truncation, reason = "rate is in [0, 100]")]
    let rate = summary.success_rate.round() as i64;
    writeln!(
        writer,
        "{} completed {}, {} {} met ({rate}%).",
        summary.total,
        if summary.total == 1 { "fast" } else { "fasts" },
        summary.goals_met,
        if summary.goals_met == 1 { "goal" } else { "goals" }
    )?;
    if let Some(avg) = summary.avg_duration {
        writeln!(writer, "Average: {}.", format::format_interval_natural(avg))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use insta::assert_snapshot;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 20, 0, 0)
            .single()
            .expect("valid test timestamp")
    }

    fn test_config(dir: &std::path::Path) -> Config {
        Config {
            database_path: dir.join("fast.db"),
            default_goal_minutes: 960,
        }
    }

    fn record_fast(db: &mut Database, day: i64, hours: i64, goal_minutes: Option<i64>) {
        let start = base() + Duration::days(day);
        let session = db.start_fast(start, goal_minutes).unwrap();
        db.end_fast(&session.id, start + Duration::hours(hours))
            .unwrap();
    }

    fn args() -> HistoryArgs {
        HistoryArgs {
            limit: 14,
            json: false,
        }
    }

    #[test]
    fn history_charts_oldest_first_with_summary() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        let mut db = Database::open(&config.database_path).unwrap();
        record_fast(&mut db, 0, 16, Some(960));
        record_fast(&mut db, 1, 12, Some(960));
        record_fast(&mut db, 2, 18, Some(960));
        drop(db);

        let mut output = Vec::new();
        run(&mut output, &args(), &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        2025-05-01      16h  █████████░  goal met
        2025-05-02      12h  ███████░░░
        2025-05-03      18h  ██████████  goal met

        3 completed fasts, 2 goals met (67%).
        Average: 15 hours and 20 minutes.
        ");
    }

    #[test]
    fn history_limit_keeps_most_recent() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        let mut db = Database::open(&config.database_path).unwrap();
        for day in 0..5 {
            record_fast(&mut db, day, 16, Some(960));
        }
        drop(db);

        let mut output = Vec::new();
        run(
            &mut output,
            &HistoryArgs {
                limit: 2,
                ..args()
            },
            &config,
        )
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        // Only the two most recent days, oldest of the pair first
        assert!(output.contains("2025-05-04"));
        assert!(output.contains("2025-05-05"));
        assert!(!output.contains("2025-05-03"));
    }

    #[test]
    fn history_without_fasts() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());

        let mut output = Vec::new();
        run(&mut output, &args(), &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @"No completed fasts yet.");
    }

    #[test]
    fn history_ignores_the_running_fast() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        let mut db = Database::open(&config.database_path).unwrap();
        record_fast(&mut db, 0, 16, Some(960));
        db.start_fast(base() + Duration::days(1), Some(960)).unwrap();
        drop(db);

        let mut output = Vec::new();
        run(&mut output, &args(), &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("1 completed fast, 1 goal met"));
        assert!(!output.contains("2025-05-02"));
    }

    #[test]
    fn history_json_reports_stats_and_window() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());
        let mut db = Database::open(&config.database_path).unwrap();
        record_fast(&mut db, 0, 16, Some(960));
        record_fast(&mut db, 1, 12, Some(960));
        drop(db);

        let mut output = Vec::new();
        run(
            &mut output,
            &HistoryArgs {
                json: true,
                ..args()
            },
            &config,
        )
        .unwrap();

        let view: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(view["total"], 2);
        assert_eq!(view["goals_met"], 1);
        assert_eq!(view["avg_duration_minutes"], 14 * 60);
        let sessions = view["sessions"].as_array().unwrap();
        assert_eq!(sessions.len(), 2);
        // Chronological: oldest first
        assert!(
            sessions[0]["start_time"].as_str().unwrap()
                < sessions[1]["start_time"].as_str().unwrap()
        );
    }

    #[test]
    fn history_json_empty_has_absent_average() {
        let temp = tempfile::tempdir().unwrap();
        let config = test_config(temp.path());

        let mut output = Vec::new();
        run(
            &mut output,
            &HistoryArgs {
                json: true,
                ..args()
            },
            &config,
        )
        .unwrap();

        let view: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(view["total"], 0);
        assert!(view["avg_duration_minutes"].is_null());
    }
}
