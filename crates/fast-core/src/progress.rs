//! Goal and progress arithmetic shared by every presentation surface.
//!
//! These are pure functions over primitives (`chrono::Duration` plus an
//! optional goal in minutes), deliberately independent of the session entity.
//! The main view, both widget feeds, the complication, and the voice surface
//! all call the same functions with the same inputs, so boundary-sensitive
//! values (is a 16 h goal met at exactly 16h00m00s?) can never drift between
//! consumers.
//!
//! Durations are truncated to whole seconds before any comparison or
//! decomposition; fractional seconds are discarded, not rounded.

use chrono::Duration;

/// Minutes still to go before the goal is reached.
///
/// Never negative: once the goal is passed this stays at 0. Returns 0 when
/// no goal is set.
#[must_use]
pub fn remaining_minutes(duration: Duration, goal_minutes: Option<i64>) -> i64 {
    goal_minutes.map_or(0, |goal| (goal - duration.num_seconds() / 60).max(0))
}

/// Elapsed-time fraction of the goal, clamped to `[0.0, 1.0]`.
///
/// A zero or absent goal yields 0.0 rather than a division by zero or NaN;
/// negative elapsed time (future start) also clamps to 0.0.
#[must_use]
#[allow(clippy::cast_precision_loss, reason = "goal minutes are far below 2^52")]
pub fn progress(duration: Duration, goal_minutes: Option<i64>) -> f64 {
    goal_minutes
        .filter(|&goal| goal > 0)
        .map_or(0.0, |goal| {
            let elapsed_minutes = duration.num_seconds() as f64 / 60.0;
            (elapsed_minutes / goal as f64).clamp(0.0, 1.0)
        })
}

/// Whether the goal has been reached.
///
/// Boundary rule: met at the exact second the whole-second elapsed count
/// reaches `goal * 60`; one second earlier it is not met. Always false when
/// no goal is set. A goal of 0 is trivially met immediately (whole-second
/// truncation makes small negative clock skew count as 0 seconds elapsed).
#[must_use]
pub fn is_goal_met(duration: Duration, goal_minutes: Option<i64>) -> bool {
    goal_minutes.is_some_and(|goal| duration.num_seconds() >= goal.saturating_mul(60))
}

/// Whole hours elapsed (fractional seconds discarded).
#[must_use]
pub const fn elapsed_hours(duration: Duration) -> i64 {
    duration.num_seconds() / 3600
}

/// Minutes past the hour elapsed (fractional seconds discarded).
#[must_use]
pub const fn elapsed_minutes_component(duration: Duration) -> i64 {
    duration.num_seconds() % 3600 / 60
}

/// Whole hours contained in a minute count.
#[must_use]
pub const fn hours_from_minutes(total_minutes: i64) -> i64 {
    total_minutes / 60
}

/// Minutes past the hour contained in a minute count.
#[must_use]
pub const fn minutes_component(total_minutes: i64) -> i64 {
    total_minutes % 60
}

/// Converts a possibly-fractional hour count (voice surface input) to whole
/// minutes by truncation: 18.5 h is exactly 1110 minutes, no rounding.
#[must_use]
#[allow(clippy::cast_possible_truncation, reason = "truncation is the contract")]
pub fn goal_minutes_from_hours(hours: f64) -> i64 {
    (hours * 60.0) as i64
}
