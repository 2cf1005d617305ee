//! Goal-completion alert scheduling.
//!
//! The core never talks to a notification service directly; it computes
//! absolute fire times and emits [`AlertRequest`] values for the delivery
//! collaborator to schedule best-effort. Scheduling is one-shot and
//! forward-looking: an alert whose fire time is already in the past at
//! planning time is skipped, never delivered retroactively.
//!
//! Identifiers are fixed rather than session-scoped, so at most one alert of
//! each kind can be outstanding system-wide. Starting a new fast supersedes
//! stale alerts from a previous session via the same cancel-then-reschedule
//! sequence.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::{format, progress};

/// Identifier of the "goal reached" alert.
pub const GOAL_MET_ALERT_ID: &str = "fast.goal-met";

/// Identifier of the "one hour remaining" alert.
pub const ONE_HOUR_ALERT_ID: &str = "fast.one-hour-left";

/// Action identifier reported back when the user chooses to keep fasting.
pub const ACTION_CONTINUE: &str = "continue";

/// Action identifier reported back when the user ends the fast from the alert.
pub const ACTION_END_FAST: &str = "end-fast";

/// A schedule request for the notification collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertRequest {
    pub identifier: &'static str,
    pub fire_time: DateTime<Utc>,
    pub title: String,
    pub body: String,
    /// Action identifiers offered on the alert, in presentation order.
    pub actions: &'static [&'static str],
}

/// Computes the alerts to schedule for a fast started at `start_time`.
///
/// Returns zero, one, or two requests depending on how much of the goal
/// window is still ahead of `now`:
/// - the one-hour alert fires at `goal - 1 h`, so goals shorter than an hour
///   never produce one;
/// - the goal-met alert fires at the exact goal instant;
/// - a fast whose goal has already passed produces nothing.
///
/// No goal means nothing to announce.
#[must_use]
pub fn plan_alerts(
    start_time: DateTime<Utc>,
    goal_minutes: Option<i64>,
    now: DateTime<Utc>,
) -> Vec<AlertRequest> {
    let Some(goal) = goal_minutes else {
        return Vec::new();
    };

    let goal_time = start_time + Duration::seconds(goal.saturating_mul(60));
    let goal_text = format::format_compact(
        progress::hours_from_minutes(goal),
        progress::minutes_component(goal),
    );

    let mut requests = Vec::with_capacity(2);

    let one_hour_fire = goal_time - Duration::hours(1);
    if one_hour_fire > now {
        requests.push(AlertRequest {
            identifier: ONE_HOUR_ALERT_ID,
            fire_time: one_hour_fire,
            title: "1 hour to go".to_string(),
            body: format!(
                "Your {goal_text} fast finishes at {}.",
                goal_time.format("%H:%M")
            ),
            actions: &[],
        });
    } else {
        tracing::debug!(%goal_time, "one-hour alert window already past, skipping");
    }

    if goal_time > now {
        requests.push(AlertRequest {
            identifier: GOAL_MET_ALERT_ID,
            fire_time: goal_time,
            title: "Fast complete".to_string(),
            body: format!(
                "You reached your {goal_text} goal ({} – {}).",
                start_time.format("%H:%M"),
                goal_time.format("%H:%M")
            ),
            actions: &[ACTION_CONTINUE, ACTION_END_FAST],
        });
    } else {
        tracing::debug!(%goal_time, "goal time already past, skipping goal alert");
    }

    requests
}

/// Identifiers to cancel when a fast stops or a new one starts.
///
/// Cancellation is unconditional and idempotent: cancelling an alert that
/// was never scheduled is a no-op at the collaborator.
#[must_use]
pub const fn cancellation_identifiers() -> [&'static str; 2] {
    [GOAL_MET_ALERT_ID, ONE_HOUR_ALERT_ID]
}
