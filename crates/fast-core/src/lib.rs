//! Core domain logic for the fasting tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Session model: the persisted fast and its derived state
//! - Goal/progress arithmetic shared by every presentation surface
//! - Duration text formatting (compact and natural language)
//! - Goal-completion alert scheduling
//! - Refresh timelines for glanceable surfaces
//! - History aggregation for stats and charts
//!
//! Everything here is a deterministic, side-effect-free transformation of
//! its inputs; persistence and notification delivery live in collaborator
//! crates.

pub mod format;
pub mod history;
pub mod notify;
pub mod progress;
pub mod session;
pub mod timeline;

pub use history::{FastingStats, chart_scale_max, completed_fasts, recent_window, stats};
pub use notify::{AlertRequest, cancellation_identifiers, plan_alerts};
pub use session::{
    CorrectionError, DEFAULT_GOAL_MINUTES, FastingSession, MAX_GOAL_MINUTES, validate_correction,
};
pub use timeline::{Timeline, TimelineEntry, TimelineSnapshot, build_timeline};
