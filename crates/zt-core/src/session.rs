//! Completed sessions and the in-memory session log.

use std::collections::HashSet;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::{Activity, default_session_name};
use crate::money::{HourlyRate, Money, earnings};
use crate::types::SessionId;

/// What the user hands over when stopping a timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDraft {
    pub activity: Activity,
    /// Blank names are replaced by [`default_session_name`].
    pub name: String,
    /// Mood note, may be empty.
    pub notes: String,
    /// Snapshot of the timer's elapsed seconds.
    pub duration_seconds: u64,
}

/// One finished, immutable timing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSession {
    pub id: SessionId,
    pub name: String,
    pub activity: Activity,
    pub duration_seconds: u64,
    #[serde(default)]
    pub notes: String,
    /// When the session was saved.
    pub timestamp: DateTime<Utc>,
    /// Computed once at save time from the rate in effect then.
    pub earnings: Money,
}

impl CompletedSession {
    /// Builds a session from a draft, assigning a fresh id and computing
    /// earnings at `rate`.
    pub fn record(draft: SessionDraft, rate: HourlyRate, timestamp: DateTime<Utc>) -> Self {
        let name = if draft.name.trim().is_empty() {
            default_session_name(draft.activity, &timestamp.with_timezone(&Local))
        } else {
            draft.name.trim().to_string()
        };
        Self {
            id: SessionId::generate(),
            name,
            activity: draft.activity,
            duration_seconds: draft.duration_seconds,
            notes: draft.notes,
            timestamp,
            earnings: earnings(draft.duration_seconds, rate),
        }
    }
}

/// Ordered sessions, most recent first.
#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    sessions: Vec<CompletedSession>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts a freshly recorded session at the front.
    pub fn prepend(&mut self, session: CompletedSession) {
        self.sessions.insert(0, session);
    }

    /// Replaces the log with `loaded`, keeping local sessions that storage
    /// does not know about yet.
    ///
    /// Returns how many local sessions were kept.
    pub fn merge_loaded(&mut self, loaded: Vec<CompletedSession>) -> usize {
        let known: HashSet<SessionId> = loaded.iter().map(|s| s.id.clone()).collect();
        let local: Vec<CompletedSession> = std::mem::take(&mut self.sessions)
            .into_iter()
            .filter(|s| !known.contains(&s.id))
            .collect();
        let kept = local.len();
        self.sessions = loaded;
        self.sessions.extend(local);
        sort_newest_first(&mut self.sessions);
        kept
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompletedSession> {
        self.sessions.iter()
    }

    pub fn as_slice(&self) -> &[CompletedSession] {
        &self.sessions
    }

    pub fn get(&self, id: &SessionId) -> Option<&CompletedSession> {
        self.sessions.iter().find(|s| &s.id == id)
    }

    /// Sessions for one activity, most recent first.
    pub fn by_activity(&self, activity: Activity) -> impl Iterator<Item = &CompletedSession> {
        self.sessions.iter().filter(move |s| s.activity == activity)
    }

    /// Sum of all session earnings, recomputed on every call.
    pub fn total_earnings(&self) -> Money {
        self.sessions.iter().map(|s| s.earnings).sum()
    }
}

fn sort_newest_first(sessions: &mut [CompletedSession]) {
    sessions.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| a.id.cmp(&b.id))
    });
}
