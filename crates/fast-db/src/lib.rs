//! Storage layer for the fasting tracker.
//!
//! Owns session lifetime and the single-active-session guarantee: the core
//! crate evaluates whatever snapshot it is handed, while this crate is the
//! only place a session row is created, stopped, corrected, or deleted.
//!
//! # Thread Safety
//!
//! [`Database`] wraps a `rusqlite::Connection`, which is `Send` but not
//! `Sync`. Move it between threads freely, but share it only behind a mutex.
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in ISO 8601 format (e.g.
//! `2025-06-01T20:00:00.000Z`): lexicographic ordering matches chronological
//! ordering, values stay human-readable, and everything is UTC.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;
use uuid::Uuid;

use fast_core::FastingSession;

/// Settings key under which the user's last-chosen goal is stored.
///
/// Every consumer that needs a fallback goal when no session is active reads
/// this same key.
pub const LAST_GOAL_KEY: &str = "last_goal_minutes";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A fast is already running; stop it before starting another.
    #[error("a fast is already active (id {0})")]
    AlreadyActive(String),
    /// No session row with the given ID.
    #[error("no session with id {0}")]
    SessionNotFound(String),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for session {session_id}: {timestamp}")]
    TimestampParse {
        session_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored settings value could not be interpreted.
    #[error("invalid value for setting {key}: {value}")]
    InvalidSetting { key: String, value: String },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection
    /// closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// Idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                start_time TEXT NOT NULL,
                end_time TEXT,
                goal_minutes INTEGER,
                goal_celebration_shown INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_start ON sessions(start_time);
            CREATE INDEX IF NOT EXISTS idx_sessions_active ON sessions(end_time)
                WHERE end_time IS NULL;

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Starts a new fast, enforcing the single-active-session rule.
    ///
    /// Returns the created session. Fails with [`DbError::AlreadyActive`]
    /// when a fast is still running.
    pub fn start_fast(
        &mut self,
        start_time: DateTime<Utc>,
        goal_minutes: Option<i64>,
    ) -> Result<FastingSession, DbError> {
        if let Some(active) = self.active_session()? {
            return Err(DbError::AlreadyActive(active.id));
        }

        let session = FastingSession::new(Uuid::new_v4().to_string(), start_time, goal_minutes);
        self.conn.execute(
            "
            INSERT INTO sessions (id, start_time, end_time, goal_minutes, goal_celebration_shown)
            VALUES (?, ?, NULL, ?, 0)
            ",
            params![
                session.id,
                format_timestamp(session.start_time),
                session.goal_minutes
            ],
        )?;
        tracing::debug!(id = %session.id, ?goal_minutes, "fast started");
        Ok(session)
    }

    /// Returns the currently active session, if any.
    pub fn active_session(&self) -> Result<Option<FastingSession>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, start_time, end_time, goal_minutes, goal_celebration_shown
            FROM sessions
            WHERE end_time IS NULL
            ORDER BY start_time DESC
            LIMIT 1
            ",
        )?;
        let row = stmt
            .query_row([], map_session_row)
            .optional()?
            .transpose()?;
        Ok(row)
    }

    /// Looks up a session by ID.
    pub fn session(&self, id: &str) -> Result<FastingSession, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, start_time, end_time, goal_minutes, goal_celebration_shown
            FROM sessions
            WHERE id = ?
            ",
        )?;
        stmt.query_row([id], map_session_row)
            .optional()?
            .transpose()?
            .ok_or_else(|| DbError::SessionNotFound(id.to_string()))
    }

    /// Stops a fast by setting its end time, freezing its duration.
    ///
    /// Idempotent on the session state: a session that is already stopped is
    /// left untouched and `false` is returned.
    pub fn end_fast(&mut self, id: &str, end_time: DateTime<Utc>) -> Result<bool, DbError> {
        // Existence check first so an unknown ID is an error, not a no-op
        let _ = self.session(id)?;
        let changed = self.conn.execute(
            "UPDATE sessions SET end_time = ? WHERE id = ? AND end_time IS NULL",
            params![format_timestamp(end_time), id],
        )?;
        Ok(changed > 0)
    }

    /// Marks the goal-reached celebration as presented for a session.
    pub fn set_celebration_shown(&mut self, id: &str) -> Result<(), DbError> {
        let changed = self.conn.execute(
            "UPDATE sessions SET goal_celebration_shown = 1 WHERE id = ?",
            params![id],
        )?;
        if changed == 0 {
            return Err(DbError::SessionNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Rewrites a session's start time, end time, and goal together.
    ///
    /// Validation belongs to the edit boundary
    /// ([`fast_core::validate_correction`]); the store writes what it is
    /// given.
    pub fn correct_session(
        &mut self,
        id: &str,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
        goal_minutes: Option<i64>,
    ) -> Result<(), DbError> {
        let changed = self.conn.execute(
            "UPDATE sessions SET start_time = ?, end_time = ?, goal_minutes = ? WHERE id = ?",
            params![
                format_timestamp(start_time),
                end_time.map(format_timestamp),
                goal_minutes,
                id
            ],
        )?;
        if changed == 0 {
            return Err(DbError::SessionNotFound(id.to_string()));
        }
        tracing::debug!(%id, "session corrected");
        Ok(())
    }

    /// Deletes a session row.
    pub fn delete_session(&mut self, id: &str) -> Result<(), DbError> {
        let changed = self
            .conn
            .execute("DELETE FROM sessions WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(DbError::SessionNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Lists all sessions, most recent first.
    ///
    /// This is the read order [`fast_core::recent_window`] expects.
    pub fn all_sessions(&self) -> Result<Vec<FastingSession>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, start_time, end_time, goal_minutes, goal_celebration_shown
            FROM sessions
            ORDER BY start_time DESC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], map_session_row)?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row??);
        }
        Ok(sessions)
    }

    /// Reads the user's last-chosen goal, if one was ever recorded.
    pub fn last_goal_minutes(&self) -> Result<Option<i64>, DbError> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                [LAST_GOAL_KEY],
                |row| row.get(0),
            )
            .optional()?;
        value
            .map(|v| {
                v.parse::<i64>().map_err(|_| DbError::InvalidSetting {
                    key: LAST_GOAL_KEY.to_string(),
                    value: v,
                })
            })
            .transpose()
    }

    /// Records the user's last-chosen goal for future fallback reads.
    pub fn set_last_goal_minutes(&mut self, goal_minutes: i64) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            ",
            params![LAST_GOAL_KEY, goal_minutes.to_string()],
        )?;
        Ok(())
    }
}

type SessionRowResult = Result<Result<FastingSession, DbError>, rusqlite::Error>;

/// Maps a session row; timestamp parse failures surface as [`DbError`].
fn map_session_row(row: &rusqlite::Row<'_>) -> SessionRowResult {
    let id: String = row.get(0)?;
    let start_time: String = row.get(1)?;
    let end_time: Option<String> = row.get(2)?;
    let goal_minutes: Option<i64> = row.get(3)?;
    let celebration: i64 = row.get(4)?;

    Ok(build_session(
        id,
        &start_time,
        end_time.as_deref(),
        goal_minutes,
        celebration != 0,
    ))
}

fn build_session(
    id: String,
    start_time: &str,
    end_time: Option<&str>,
    goal_minutes: Option<i64>,
    goal_celebration_shown: bool,
) -> Result<FastingSession, DbError> {
    let start_time = parse_timestamp(start_time, &id)?;
    let end_time = end_time.map(|t| parse_timestamp(t, &id)).transpose()?;
    Ok(FastingSession {
        id,
        start_time,
        end_time,
        goal_minutes,
        goal_celebration_shown,
    })
}

fn parse_timestamp(timestamp: &str, session_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            session_id: session_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 20, 0, 0)
            .single()
            .expect("valid test timestamp")
    }

    #[test]
    fn open_in_memory_database() {
        assert!(Database::open_in_memory().is_ok());
    }

    #[test]
    fn open_creates_file_and_reopens() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("fast.db");
        {
            let mut db = Database::open(&path).unwrap();
            db.start_fast(t0(), Some(960)).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert!(db.active_session().unwrap().is_some());
    }

    #[test]
    fn start_fast_returns_active_session() {
        let mut db = Database::open_in_memory().unwrap();
        let created = db.start_fast(t0(), Some(960)).unwrap();
        assert!(created.is_active());

        let active = db.active_session().unwrap().expect("session is active");
        assert_eq!(active, created);
    }

    #[test]
    fn start_fast_rejects_second_active() {
        let mut db = Database::open_in_memory().unwrap();
        let first = db.start_fast(t0(), Some(960)).unwrap();

        let err = db.start_fast(t0() + Duration::hours(1), None).unwrap_err();
        assert!(matches!(err, DbError::AlreadyActive(id) if id == first.id));
    }

    #[test]
    fn end_fast_freezes_and_is_idempotent() {
        let mut db = Database::open_in_memory().unwrap();
        let session = db.start_fast(t0(), Some(960)).unwrap();

        let stopped = db.end_fast(&session.id, t0() + Duration::hours(16)).unwrap();
        assert!(stopped);
        assert!(db.active_session().unwrap().is_none());

        // Second stop is a no-op; the recorded end time stays put
        let stopped_again = db.end_fast(&session.id, t0() + Duration::hours(20)).unwrap();
        assert!(!stopped_again);
        let stored = db.session(&session.id).unwrap();
        assert_eq!(stored.end_time, Some(t0() + Duration::hours(16)));
    }

    #[test]
    fn end_fast_unknown_id_is_an_error() {
        let mut db = Database::open_in_memory().unwrap();
        let err = db.end_fast("missing", t0()).unwrap_err();
        assert!(matches!(err, DbError::SessionNotFound(_)));
    }

    #[test]
    fn celebration_flag_persists() {
        let mut db = Database::open_in_memory().unwrap();
        let session = db.start_fast(t0(), Some(960)).unwrap();
        assert!(!session.goal_celebration_shown);

        db.set_celebration_shown(&session.id).unwrap();
        assert!(db.session(&session.id).unwrap().goal_celebration_shown);
    }

    #[test]
    fn correct_session_rewrites_fields_together() {
        let mut db = Database::open_in_memory().unwrap();
        let session = db.start_fast(t0(), Some(960)).unwrap();

        let new_start = t0() - Duration::hours(2);
        let new_end = t0() + Duration::hours(14);
        db.correct_session(&session.id, new_start, Some(new_end), Some(1080))
            .unwrap();

        let stored = db.session(&session.id).unwrap();
        assert_eq!(stored.start_time, new_start);
        assert_eq!(stored.end_time, Some(new_end));
        assert_eq!(stored.goal_minutes, Some(1080));
    }

    #[test]
    fn correct_session_can_store_inverted_range() {
        // The store writes what it is given; validation is the edit
        // boundary's job and the core treats the result as negative duration
        let mut db = Database::open_in_memory().unwrap();
        let session = db.start_fast(t0(), Some(960)).unwrap();
        db.correct_session(&session.id, t0(), Some(t0() - Duration::hours(1)), None)
            .unwrap();

        let stored = db.session(&session.id).unwrap();
        assert!(stored.duration(t0()) < Duration::zero());
    }

    #[test]
    fn delete_session_removes_row() {
        let mut db = Database::open_in_memory().unwrap();
        let session = db.start_fast(t0(), Some(960)).unwrap();
        db.delete_session(&session.id).unwrap();
        assert!(matches!(
            db.session(&session.id),
            Err(DbError::SessionNotFound(_))
        ));
    }

    #[test]
    fn all_sessions_most_recent_first() {
        let mut db = Database::open_in_memory().unwrap();
        for day in 0..3 {
            let start = t0() + Duration::days(day);
            let session = db.start_fast(start, Some(960)).unwrap();
            db.end_fast(&session.id, start + Duration::hours(16)).unwrap();
        }

        let sessions = db.all_sessions().unwrap();
        assert_eq!(sessions.len(), 3);
        assert!(sessions[0].start_time > sessions[1].start_time);
        assert!(sessions[1].start_time > sessions[2].start_time);
    }

    #[test]
    fn last_goal_roundtrip() {
        let mut db = Database::open_in_memory().unwrap();
        assert_eq!(db.last_goal_minutes().unwrap(), None);

        db.set_last_goal_minutes(960).unwrap();
        assert_eq!(db.last_goal_minutes().unwrap(), Some(960));

        db.set_last_goal_minutes(1080).unwrap();
        assert_eq!(db.last_goal_minutes().unwrap(), Some(1080));
    }

    #[test]
    fn goal_is_optional_in_storage() {
        let mut db = Database::open_in_memory().unwrap();
        let session = db.start_fast(t0(), None).unwrap();
        let stored = db.session(&session.id).unwrap();
        assert_eq!(stored.goal_minutes, None);
    }

    #[test]
    fn timestamps_survive_roundtrip_to_the_second() {
        let mut db = Database::open_in_memory().unwrap();
        let start = t0() + Duration::seconds(59);
        let session = db.start_fast(start, Some(960)).unwrap();
        assert_eq!(db.session(&session.id).unwrap().start_time, start);
    }
}
