//! Storage layer for the zone-out tracker.
//!
//! Provides persistence for user profiles and completed sessions using
//! `rusqlite`, and exposes it to the tracker as a [`zt_core::Backend`]
//! through [`SharedDatabase`].
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! The tracker persists from blocking worker threads, so [`SharedDatabase`]
//! serializes access behind a `Mutex`.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 format with nanoseconds
//! (e.g., `2024-01-15T10:30:00.000000000Z`). Fixed-width fractions keep
//! lexicographic ordering equal to chronological ordering.
//!
//! ## Money
//!
//! Earnings are stored as INTEGER cents; hourly rates as REAL.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use zt_core::{
    Activity, Backend, BackendError, CompletedSession, HourlyRate, Money, SessionId, UserId,
    UserProfile,
};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored session timestamp.
    #[error("invalid timestamp for session {session_id}: {timestamp}")]
    TimestampParse {
        session_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row does not describe a valid session or profile.
    #[error("invalid stored data for {id}: {message}")]
    InvalidRow { id: String, message: String },
    /// A value does not fit the column type.
    #[error("value out of range for {field}: {value}")]
    OutOfRange { field: &'static str, value: u64 },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A session row as stored, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SessionRow {
    id: String,
    name: String,
    activity: String,
    duration_seconds: i64,
    notes: String,
    timestamp: String,
    earnings_cents: i64,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- One profile document per user; columns are merged independently
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                hourly_rate REAL,
                updated_at TEXT NOT NULL
            );

            -- Completed sessions; rows are only ever inserted
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                activity TEXT NOT NULL,
                duration_seconds INTEGER NOT NULL,
                notes TEXT NOT NULL DEFAULT '',
                timestamp TEXT NOT NULL,
                earnings_cents INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
            ",
        )?;
        Ok(())
    }

    /// Loads the profile for `user`. Missing users get the empty profile.
    pub fn user_profile(&self, user: &UserId) -> Result<UserProfile, DbError> {
        let rate: Option<Option<f64>> = self
            .conn
            .query_row(
                "SELECT hourly_rate FROM users WHERE id = ?",
                params![user.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let hourly_rate = rate
            .flatten()
            .map(|value| {
                HourlyRate::new(value).map_err(|err| DbError::InvalidRow {
                    id: user.to_string(),
                    message: err.to_string(),
                })
            })
            .transpose()?;
        Ok(UserProfile { hourly_rate })
    }

    /// Sets the hourly rate, creating the profile if needed.
    pub fn set_hourly_rate(&self, user: &UserId, rate: HourlyRate) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO users (id, hourly_rate, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                hourly_rate = excluded.hourly_rate,
                updated_at = excluded.updated_at
            ",
            params![user.as_str(), rate.value(), format_timestamp(Utc::now())],
        )?;
        Ok(())
    }

    /// Inserts a session. Fails if a session with the same ID exists.
    pub fn insert_session(&self, user: &UserId, session: &CompletedSession) -> Result<(), DbError> {
        let duration = i64::try_from(session.duration_seconds).map_err(|_| DbError::OutOfRange {
            field: "duration_seconds",
            value: session.duration_seconds,
        })?;
        self.conn.execute(
            "
            INSERT INTO sessions
            (id, user_id, name, activity, duration_seconds, notes, timestamp, earnings_cents)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                session.id.as_str(),
                user.as_str(),
                session.name,
                session.activity.as_str(),
                duration,
                session.notes,
                format_timestamp(session.timestamp),
                session.earnings.cents(),
            ],
        )?;
        Ok(())
    }

    /// Lists every session of `user`. No ordering is guaranteed.
    ///
    /// Rows that do not decode to a valid session are logged and skipped.
    pub fn list_sessions(&self, user: &UserId) -> Result<Vec<CompletedSession>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, activity, duration_seconds, notes, timestamp, earnings_cents
            FROM sessions
            WHERE user_id = ?
            ",
        )?;
        let rows = stmt.query_map(params![user.as_str()], |row| {
            Ok(SessionRow {
                id: row.get(0)?,
                name: row.get(1)?,
                activity: row.get(2)?,
                duration_seconds: row.get(3)?,
                notes: row.get(4)?,
                timestamp: row.get(5)?,
                earnings_cents: row.get(6)?,
            })
        })?;
        let mut sessions = Vec::new();
        for row in rows {
            match session_from_row(row?) {
                Ok(session) => sessions.push(session),
                Err(err) => tracing::warn!(%user, error = %err, "skipping invalid session row"),
            }
        }
        Ok(sessions)
    }
}

fn session_from_row(row: SessionRow) -> Result<CompletedSession, DbError> {
    let invalid = |message: String| DbError::InvalidRow {
        id: row.id.clone(),
        message,
    };
    let id = SessionId::new(row.id.clone()).map_err(|err| invalid(err.to_string()))?;
    let activity: Activity = row
        .activity
        .parse()
        .map_err(|err: zt_core::ValidationError| invalid(err.to_string()))?;
    let duration_seconds = u64::try_from(row.duration_seconds)
        .map_err(|_| invalid(format!("negative duration {}", row.duration_seconds)))?;
    if row.earnings_cents < 0 {
        return Err(invalid(format!("negative earnings {}", row.earnings_cents)));
    }
    let timestamp = parse_timestamp(&row.timestamp, &row.id)?;
    Ok(CompletedSession {
        id,
        name: row.name,
        activity,
        duration_seconds,
        notes: row.notes,
        timestamp,
        earnings: Money::from_cents(row.earnings_cents),
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
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// A [`Database`] shareable across the tracker's worker threads.
pub struct SharedDatabase {
    db: Mutex<Database>,
}

impl SharedDatabase {
    pub const fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    fn with_db<T>(&self, f: impl FnOnce(&Database) -> Result<T, DbError>) -> Result<T, BackendError> {
        let db = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        f(&db).map_err(BackendError::new)
    }
}

impl Backend for SharedDatabase {
    fn user_profile(&self, user: &UserId) -> Result<UserProfile, BackendError> {
        self.with_db(|db| db.user_profile(user))
    }

    fn set_user_profile(&self, user: &UserId, hourly_rate: HourlyRate) -> Result<(), BackendError> {
        self.with_db(|db| db.set_hourly_rate(user, hourly_rate))
    }

    fn list_sessions(&self, user: &UserId) -> Result<Vec<CompletedSession>, BackendError> {
        self.with_db(|db| db.list_sessions(user))
    }

    fn append_session(
        &self,
        user: &UserId,
        session: &CompletedSession,
    ) -> Result<(), BackendError> {
        self.with_db(|db| db.insert_session(user, session))
    }
}
