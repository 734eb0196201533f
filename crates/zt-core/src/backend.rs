//! The remote document store, as seen by the tracker.
//!
//! Calls are blocking; the tracker runs them off the interactive path and
//! only logs their failures.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::HourlyRate;
use crate::session::CompletedSession;
use crate::types::UserId;

/// A persistence failure, opaque to the tracker.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct BackendError(Box<dyn std::error::Error + Send + Sync>);

impl BackendError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(source.into())
    }
}

/// Per-user settings document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<HourlyRate>,
}

/// Storage for user profiles and their sessions.
pub trait Backend: Send + Sync + 'static {
    /// Fetches the profile, or the empty profile if none was stored.
    fn user_profile(&self, user: &UserId) -> Result<UserProfile, BackendError>;

    /// Merges `hourly_rate` into the profile, leaving other fields alone.
    fn set_user_profile(&self, user: &UserId, hourly_rate: HourlyRate) -> Result<(), BackendError>;

    /// All stored sessions for `user`, in no particular order.
    fn list_sessions(&self, user: &UserId) -> Result<Vec<CompletedSession>, BackendError>;

    /// Stores a new session. Sessions are never updated or deleted.
    fn append_session(&self, user: &UserId, session: &CompletedSession)
    -> Result<(), BackendError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    profiles: HashMap<UserId, UserProfile>,
    sessions: HashMap<UserId, Vec<CompletedSession>>,
}

/// A process-local [`Backend`], for embedding without a database and for
/// tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

impl Backend for MemoryBackend {
    fn user_profile(&self, user: &UserId) -> Result<UserProfile, BackendError> {
        Ok(self.with_state(|s| s.profiles.get(user).copied().unwrap_or_default()))
    }

    fn set_user_profile(&self, user: &UserId, hourly_rate: HourlyRate) -> Result<(), BackendError> {
        self.with_state(|s| {
            s.profiles.entry(user.clone()).or_default().hourly_rate = Some(hourly_rate);
        });
        Ok(())
    }

    fn list_sessions(&self, user: &UserId) -> Result<Vec<CompletedSession>, BackendError> {
        Ok(self.with_state(|s| s.sessions.get(user).cloned().unwrap_or_default()))
    }

    fn append_session(
        &self,
        user: &UserId,
        session: &CompletedSession,
    ) -> Result<(), BackendError> {
        self.with_state(|s| {
            let sessions = s.sessions.entry(user.clone()).or_default();
            if sessions.iter().any(|existing| existing.id == session.id) {
                return Err(BackendError::new(format!(
                    "session {} already exists",
                    session.id
                )));
            }
            sessions.push(session.clone());
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;

    use crate::activity::Activity;
    use crate::session::SessionDraft;

    fn session() -> CompletedSession {
        CompletedSession::record(
            SessionDraft {
                activity: Activity::ZoneOut,
                name: "nap".to_string(),
                notes: String::new(),
                duration_seconds: 30,
            },
            HourlyRate::DEFAULT,
            Utc::now(),
        )
    }

    #[test]
    fn missing_profile_is_empty() {
        let backend = MemoryBackend::new();
        let user = UserId::new("u1").unwrap();
        assert_eq!(backend.user_profile(&user).unwrap(), UserProfile::default());
    }

    #[test]
    fn sessions_are_scoped_per_user() {
        let backend = MemoryBackend::new();
        let alice = UserId::new("alice").unwrap();
        let bob = UserId::new("bob").unwrap();

        backend.append_session(&alice, &session()).unwrap();

        assert_eq!(backend.list_sessions(&alice).unwrap().len(), 1);
        assert!(backend.list_sessions(&bob).unwrap().is_empty());
    }

    #[test]
    fn append_is_create_only() {
        let backend = MemoryBackend::new();
        let user = UserId::new("u1").unwrap();
        let s = session();
        backend.append_session(&user, &s).unwrap();
        assert!(backend.append_session(&user, &s).is_err());
    }

    #[test]
    fn profile_serde_skips_missing_rate() {
        let json = serde_json::to_string(&UserProfile::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
