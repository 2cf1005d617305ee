//! Correct command: rewrite a session's recorded times and goal.
//!
//! Validation happens here, at the edit boundary. The store itself writes
//! whatever it is given, so already-persisted oddities (clock skew, old
//! imports) can still be read back and fixed.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;

use fast_core::validate_correction;
use fast_db::Database;

use crate::Config;

#[derive(Debug, Args)]
pub struct CorrectArgs {
    /// Session ID to rewrite.
    pub id: String,

    /// New start time, RFC 3339 (e.g. 2025-06-01T20:00:00Z).
    #[arg(long)]
    pub start: String,

    /// New end time, RFC 3339. Omit to make the session active again.
    #[arg(long)]
    pub end: Option<String>,

    /// New goal in minutes. Omit to clear the goal.
    #[arg(long)]
    pub goal_minutes: Option<i64>,
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("invalid timestamp {value:?}, expected RFC 3339"))?;
    Ok(parsed.with_timezone(&Utc))
}

pub fn run<W: Write>(writer: &mut W, args: &CorrectArgs, config: &Config) -> Result<()> {
    let start_time = parse_time(&args.start)?;
    let end_time = args.end.as_deref().map(parse_time).transpose()?;

    validate_correction(start_time, end_time, args.goal_minutes)?;

    let mut db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    db.correct_session(&args.id, start_time, end_time, args.goal_minutes)?;

    writeln!(writer, "Updated fast {}.", args.id)?;
    Ok(())
}
