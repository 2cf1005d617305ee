//! The fasting session entity and its derived state.
//!
//! A session is the sole persisted fact: when a fast started and what goal
//! duration (if any) was chosen. Everything else shown to the user is
//! re-derived from `(session, evaluation instant)` by the pure functions in
//! [`crate::progress`], so independent consumers always agree.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::progress;

/// Fallback goal applied when the user starts a fast without choosing one.
/// 960 minutes = the classic 16-hour fast.
pub const DEFAULT_GOAL_MINUTES: i64 = 960;

/// Upper bound on an accepted goal: one year in minutes.
///
/// Goal arithmetic turns minutes into `chrono::Duration` seconds and adds
/// them to timestamps; an unbounded goal would overflow those ranges.
/// Rejected at the edit boundaries so stored goals are always safe to
/// schedule and chart.
pub const MAX_GOAL_MINUTES: i64 = 366 * 24 * 60;

/// Rejection reasons for a manual correction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorrectionError {
    /// The corrected end time precedes the corrected start time.
    #[error("end time {end} is before start time {start}")]
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// The corrected goal is negative.
    #[error("goal minutes must be non-negative, got {0}")]
    NegativeGoal(i64),
    /// The corrected goal exceeds the supported range.
    #[error("goal minutes must be at most {MAX_GOAL_MINUTES}, got {0}")]
    GoalTooLarge(i64),
}

/// Validates a manual correction at the edit boundary.
///
/// The derived-state math deliberately does not guard against inverted
/// ranges (it propagates negative durations instead); rejecting them here,
/// before anything is written, is what keeps stored sessions sane.
pub fn validate_correction(
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    goal_minutes: Option<i64>,
) -> Result<(), CorrectionError> {
    if let Some(end) = end_time {
        if end < start_time {
            return Err(CorrectionError::EndBeforeStart {
                start: start_time,
                end,
            });
        }
    }
    if let Some(goal) = goal_minutes {
        if goal < 0 {
            return Err(CorrectionError::NegativeGoal(goal));
        }
        if goal > MAX_GOAL_MINUTES {
            return Err(CorrectionError::GoalTooLarge(goal));
        }
    }
    Ok(())
}

/// A single fasting session.
///
/// `duration` is intentionally not stored; it is derived from `start_time`,
/// `end_time`, and the evaluation instant so that the value is frozen the
/// moment `end_time` is set and live until then.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastingSession {
    /// Stable unique identifier, assigned at creation.
    pub id: String,

    /// Instant the fast began. Immutable except via explicit correction.
    pub start_time: DateTime<Utc>,

    /// Instant the fast ended. `None` while the fast is still running.
    pub end_time: Option<DateTime<Utc>>,

    /// Target duration in minutes. `None` means no goal was set.
    pub goal_minutes: Option<i64>,

    /// Whether the goal-reached celebration has already been presented.
    /// Prevents duplicate celebrations across repeated evaluations.
    #[serde(default)]
    pub goal_celebration_shown: bool,
}

impl FastingSession {
    /// Creates a new active session starting at `start_time`.
    #[must_use]
    pub const fn new(id: String, start_time: DateTime<Utc>, goal_minutes: Option<i64>) -> Self {
        Self {
            id,
            start_time,
            end_time: None,
            goal_minutes,
            goal_celebration_shown: false,
        }
    }

    /// Returns true while the fast has not been stopped.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// Elapsed time of the fast at `now`.
    ///
    /// While active this is `now - start_time`; once stopped it is frozen at
    /// `end_time - start_time`. A future start time (or an inverted range
    /// supplied by manual correction) yields a negative duration rather than
    /// an error; callers must treat negative as "not yet valid".
    #[must_use]
    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        self.end_time.unwrap_or(now) - self.start_time
    }

    /// Whether the goal has been reached at `now`.
    ///
    /// Always false when no goal is set.
    #[must_use]
    pub fn goal_met(&self, now: DateTime<Utc>) -> bool {
        progress::is_goal_met(self.duration(now), self.goal_minutes)
    }

    /// Stops the fast at `now`, freezing its duration.
    ///
    /// Idempotent: stopping an already-stopped session is a no-op, so the
    /// originally recorded end time is never overwritten.
    pub fn stop(&mut self, now: DateTime<Utc>) {
        if self.end_time.is_none() {
            self.end_time = Some(now);
        }
    }
}
