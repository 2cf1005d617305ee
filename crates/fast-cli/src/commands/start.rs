//! Start command: begin a fast and plan its goal alerts.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use fast_core::notify::{self, AlertRequest};
use fast_core::progress;
use fast_db::Database;

use crate::Config;

#[derive(Debug, Args)]
pub struct StartArgs {
    /// Goal duration in hours; fractional values are allowed (18.5 = 18h30m).
    #[arg(long, conflicts_with = "goal_minutes")]
    pub hours: Option<f64>,

    /// Goal duration in whole minutes.
    #[arg(long)]
    pub goal_minutes: Option<i64>,

    /// Start without any goal.
    #[arg(long, conflicts_with_all = ["hours", "goal_minutes"])]
    pub no_goal: bool,

    /// Print the session and notification plan as JSON.
    #[arg(long)]
    pub json: bool,
}

/// What starting a fast hands to the outside world: the created session plus
/// the cancel-then-reschedule notification sequence.
#[derive(Debug, Serialize)]
struct StartPlan {
    session: fast_core::FastingSession,
    cancel: [&'static str; 2],
    schedule: Vec<AlertRequest>,
}

/// Resolves the goal for a new fast.
///
/// Precedence: explicit `--no-goal`, explicit minutes, explicit (possibly
/// fractional) hours, the stored last-chosen goal, the configured default.
fn resolve_goal(args: &StartArgs, config: &Config, db: &Database) -> Result<Option<i64>> {
    if args.no_goal {
        return Ok(None);
    }
    let goal = match (args.goal_minutes, args.hours) {
        (Some(minutes), _) => minutes,
        (None, Some(hours)) => {
            if !hours.is_finite() {
                bail!("goal hours must be a finite number");
            }
            progress::goal_minutes_from_hours(hours)
        }
        (None, None) => db
            .last_goal_minutes()?
            .unwrap_or(config.default_goal_minutes),
    };
    if goal < 0 {
        bail!("goal must be non-negative, got {goal} minutes");
    }
    if goal > fast_core::MAX_GOAL_MINUTES {
        bail!(
            "goal must be at most {} minutes, got {goal}",
            fast_core::MAX_GOAL_MINUTES
        );
    }
    Ok(Some(goal))
}

pub fn run<W: Write>(
    writer: &mut W,
    args: &StartArgs,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;

    let goal_minutes = resolve_goal(args, config, &db)?;
    let session = db.start_fast(now, goal_minutes)?;
    if let Some(goal) = goal_minutes {
        db.set_last_goal_minutes(goal)?;
    }

    // Cancel-then-reschedule: stale alerts from a previous fast are
    // superseded before the new ones are planned.
    let cancel = notify::cancellation_identifiers();
    let schedule = notify::plan_alerts(session.start_time, session.goal_minutes, now);
    tracing::debug!(?cancel, scheduled = schedule.len(), "notification plan");

    if args.json {
        let plan = StartPlan {
            session,
            cancel,
            schedule,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&plan)?)?;
        return Ok(());
    }

    match session.goal_minutes {
        Some(goal) => {
            let goal_text = fast_core::format::format_compact(
                progress::hours_from_minutes(goal),
                progress::minutes_component(goal),
            );
            writeln!(
                writer,
                "Started a {goal_text} fast at {}.",
                now.format("%H:%M")
            )?;
        }
        None => writeln!(writer, "Started a fast with no goal at {}.", now.format("%H:%M"))?,
    }
    for alert in &schedule {
        writeln!(
            writer,
            "Scheduled \"{}\" for {}.",
            alert.title,
            alert.fire_time.format("%H:%M")
        )?;
    }

    Ok(())
}
