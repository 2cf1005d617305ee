//! Refresh cadence for glanceable surfaces.
//!
//! Widgets and complications cannot recompute continuously; instead they are
//! handed a batch of precomputed evaluation points plus the instant at which
//! to request a fresh batch. While a fast is active the batch is dense (one
//! entry per minute for the next hour); while idle a single entry suffices
//! and the reload interval stretches out.
//!
//! Every entry independently re-derives the full set of values from
//! [`crate::progress`] at its own timestamp. There is no delta computation,
//! so an entry is self-consistent even when consumed out of order or alone.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::session::FastingSession;
use crate::{format, progress};

/// Number of per-minute entries precomputed while a fast is active.
pub const ACTIVE_ENTRY_COUNT: i64 = 60;

/// Minutes until the next full recomputation while a fast is active.
pub const ACTIVE_RELOAD_MINUTES: i64 = 60;

/// Minutes until the next full recomputation while no fast is active.
pub const IDLE_RELOAD_MINUTES: i64 = 15;

/// The minimal session state a refresh consumer needs.
///
/// A snapshot with no start time represents "nothing active" and doubles as
/// the safe fallback when the store cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineSnapshot {
    pub start_time: Option<DateTime<Utc>>,
    pub goal_minutes: Option<i64>,
}

impl TimelineSnapshot {
    /// The safe default: inactive, no start time, no goal.
    ///
    /// Store read failures at the boundary map to this value so a glanceable
    /// surface renders the idle state instead of crashing.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            start_time: None,
            goal_minutes: None,
        }
    }

    /// Builds a snapshot from the currently active session, if any.
    #[must_use]
    pub fn from_active_session(session: Option<&FastingSession>) -> Self {
        session
            .filter(|s| s.is_active())
            .map_or_else(Self::empty, |s| Self {
                start_time: Some(s.start_time),
                goal_minutes: s.goal_minutes,
            })
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.start_time.is_some()
    }
}

/// One precomputed evaluation point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    /// The instant this entry is valid for.
    pub date: DateTime<Utc>,
    pub elapsed_hours: i64,
    pub elapsed_minutes: i64,
    /// Compact elapsed text ("8h 30m") for surfaces without layout room.
    pub elapsed_text: String,
    pub remaining_minutes: i64,
    pub progress: f64,
    pub goal_met: bool,
}

impl TimelineEntry {
    /// Derives all displayed values at `date` for a fast started at
    /// `start_time`. Every field comes from the shared calculator; nothing
    /// is carried over from neighboring entries.
    fn derive(date: DateTime<Utc>, start_time: DateTime<Utc>, goal_minutes: Option<i64>) -> Self {
        let elapsed = date - start_time;
        let (hours, minutes) = format::hours_and_minutes(elapsed);
        Self {
            date,
            elapsed_hours: hours,
            elapsed_minutes: minutes,
            elapsed_text: format::format_compact(hours, minutes),
            remaining_minutes: progress::remaining_minutes(elapsed, goal_minutes),
            progress: progress::progress(elapsed, goal_minutes),
            goal_met: progress::is_goal_met(elapsed, goal_minutes),
        }
    }

    /// The idle entry: nothing elapsed, nothing remaining, no goal.
    fn idle(date: DateTime<Utc>) -> Self {
        Self {
            date,
            elapsed_hours: 0,
            elapsed_minutes: 0,
            elapsed_text: format::format_compact(0, 0),
            remaining_minutes: 0,
            progress: 0.0,
            goal_met: false,
        }
    }
}

/// A batch of evaluation points and the reload instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub entries: Vec<TimelineEntry>,
    /// When the consumer should request the next full recomputation.
    pub reload_after: DateTime<Utc>,
}

/// Builds the refresh batch for `snapshot` as of `now`.
///
/// Active: 60 per-minute entries starting at `now`, reload after 60 minutes.
/// Inactive: a single entry at `now`, reload after 15 minutes.
#[must_use]
pub fn build_timeline(snapshot: &TimelineSnapshot, now: DateTime<Utc>) -> Timeline {
    snapshot.start_time.map_or_else(
        || Timeline {
            entries: vec![TimelineEntry::idle(now)],
            reload_after: now + Duration::minutes(IDLE_RELOAD_MINUTES),
        },
        |start_time| {
            let entries = (0..ACTIVE_ENTRY_COUNT)
                .map(|minute| {
                    TimelineEntry::derive(
                        now + Duration::minutes(minute),
                        start_time,
                        snapshot.goal_minutes,
                    )
                })
                .collect();
            Timeline {
                entries,
                reload_after: now + Duration::minutes(ACTIVE_RELOAD_MINUTES),
            }
        },
    )
}
