//! Duration text rendering.
//!
//! Two registers: a compact form for widgets and notification bodies
//! ("8h 30m") and a natural-language form for spoken responses
//! ("8 hours and 30 minutes"). Both are built from the same hour/minute
//! decomposition so the surfaces can never disagree on the numbers.

use chrono::Duration;

use crate::progress;

/// Formats an hour/minute pair compactly: `"8h 30m"`, `"16h"`, `"45m"`.
///
/// Zero components are elided; the both-zero case renders as `"0m"`.
/// No leading zeros, no padding.
#[must_use]
pub fn format_compact(hours: i64, minutes: i64) -> String {
    if hours > 0 && minutes > 0 {
        format!("{hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h")
    } else {
        format!("{minutes}m")
    }
}

/// Formats an hour/minute pair as natural language: `"1 hour and 30 minutes"`.
///
/// "hour" and "minute" pluralize independently, each singular exactly at 1.
/// A zero component is omitted; both zero yields `"0 minutes"`.
#[must_use]
pub fn format_natural(hours: i64, minutes: i64) -> String {
    let hour_unit = if hours == 1 { "hour" } else { "hours" };
    let minute_unit = if minutes == 1 { "minute" } else { "minutes" };

    if hours > 0 && minutes > 0 {
        format!("{hours} {hour_unit} and {minutes} {minute_unit}")
    } else if hours > 0 {
        format!("{hours} {hour_unit}")
    } else {
        format!("{minutes} {minute_unit}")
    }
}

/// Decomposes a duration into whole hours and minutes past the hour.
///
/// Truncates to whole minutes first (seconds discarded, not rounded).
/// Negative durations are treated as zero so display code never renders
/// a minus sign.
#[must_use]
pub fn hours_and_minutes(duration: Duration) -> (i64, i64) {
    if duration < Duration::zero() {
        return (0, 0);
    }
    let total_minutes = duration.num_seconds() / 60;
    (
        progress::hours_from_minutes(total_minutes),
        progress::minutes_component(total_minutes),
    )
}

/// Compact rendering of a duration: the widget/notification short form.
#[must_use]
pub fn format_interval_compact(duration: Duration) -> String {
    let (hours, minutes) = hours_and_minutes(duration);
    format_compact(hours, minutes)
}

/// Natural-language rendering of a duration: the spoken form.
#[must_use]
pub fn format_interval_natural(duration: Duration) -> String {
    let (hours, minutes) = hours_and_minutes(duration);
    format_natural(hours, minutes)
}
