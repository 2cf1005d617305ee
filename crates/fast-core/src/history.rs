//! Summary statistics and chart projections over completed fasts.

use chrono::Duration;

use crate::progress;
use crate::session::FastingSession;

/// Aggregate statistics over a set of completed fasts.
#[derive(Debug, Clone, PartialEq)]
pub struct FastingStats {
    /// Number of completed fasts.
    pub total: usize,
    /// How many of them reached their goal.
    pub goals_met: usize,
    /// Goal success rate in percent. 0 when there is no data.
    pub success_rate: f64,
    /// Mean fast duration. `None` when there is no data: "no fasts yet" must
    /// stay distinguishable from "average of zero".
    pub avg_duration: Option<Duration>,
}

/// Filters to sessions that have been stopped.
#[must_use]
pub fn completed_fasts(sessions: &[FastingSession]) -> Vec<&FastingSession> {
    sessions.iter().filter(|s| !s.is_active()).collect()
}

/// Projects the `n` most recent sessions in chronological order for charting.
///
/// Input is expected most-recent-first (the store's natural read order);
/// the window is reversed so bars render oldest to newest left to right.
/// Consumers use `n = 5` (widget) and `n = 14` (main chart).
#[must_use]
pub fn recent_window(sessions: &[FastingSession], n: usize) -> Vec<&FastingSession> {
    sessions.iter().take(n).rev().collect()
}

/// Frozen duration of a completed session.
///
/// Active sessions contribute zero; they have no frozen duration yet.
fn completed_duration(session: &FastingSession) -> Duration {
    session
        .end_time
        .map_or_else(Duration::zero, |end| end - session.start_time)
}

/// Reduces sessions to summary statistics.
///
/// Active sessions are ignored; only completed fasts count. An empty input
/// yields a zero success rate and an absent average, never a division error.
#[must_use]
pub fn stats(sessions: &[FastingSession]) -> FastingStats {
    let completed = completed_fasts(sessions);
    let total = completed.len();
    if total == 0 {
        return FastingStats {
            total: 0,
            goals_met: 0,
            success_rate: 0.0,
            avg_duration: None,
        };
    }

    let goals_met = completed
        .iter()
        .filter(|s| progress::is_goal_met(completed_duration(s), s.goal_minutes))
        .count();

    let total_ms: i64 = completed
        .iter()
        .map(|s| completed_duration(s).num_milliseconds())
        .sum();

    #[allow(clippy::cast_precision_loss, reason = "session counts are small")]
    let success_rate = goals_met as f64 / total as f64 * 100.0;

    #[allow(clippy::cast_possible_wrap, reason = "total is a small positive count")]
    let avg_ms = total_ms / total as i64;

    FastingStats {
        total,
        goals_met,
        success_rate,
        avg_duration: Some(Duration::milliseconds(avg_ms)),
    }
}

/// The tallest value a duration chart over `sessions` must accommodate.
///
/// Takes the maximum over completed durations and every session's goal
/// duration, so a goal line drawn above the bars never clips. Negative
/// durations (from corrections) contribute nothing.
#[must_use]
pub fn chart_scale_max(sessions: &[FastingSession]) -> Duration {
    let max_duration = sessions
        .iter()
        .filter(|s| !s.is_active())
        .map(completed_duration)
        .max()
        .unwrap_or_else(Duration::zero);

    let max_goal = sessions
        .iter()
        .filter_map(|s| s.goal_minutes)
        .map(|g| Duration::seconds(g.saturating_mul(60)))
        .max()
        .unwrap_or_else(Duration::zero);

    max_duration.max(max_goal).max(Duration::zero())
}
