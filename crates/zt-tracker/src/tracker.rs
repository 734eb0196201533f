//! The per-login store: timers, sessions and the hourly rate, kept in
//! memory and written through to a [`Backend`] in the background.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use zt_core::{
    Activity, ActivityTimer, Backend, BackendError, CompletedSession, HourlyRate, Money,
    SessionDraft, SessionId, SessionLog, TimerStore, UserId, ValidationError, earnings,
};

use crate::TrackerError;
use crate::tick::TickDriver;

/// Tracker settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerConfig {
    /// Period of the tick driver. One tick adds one second to running timers.
    pub tick_interval: Duration,
    /// Rate in effect before a user profile is loaded.
    pub default_hourly_rate: HourlyRate,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            default_hourly_rate: HourlyRate::DEFAULT,
        }
    }
}

#[derive(Debug)]
struct State {
    timers: TimerStore,
    sessions: SessionLog,
    hourly_rate: HourlyRate,
    /// The rate was changed locally since the last sign-in.
    rate_dirty: bool,
    user: Option<UserId>,
    /// Bumped on every user change; loads for an older generation are dropped.
    generation: u64,
}

struct Inner {
    state: Arc<Mutex<State>>,
    backend: Arc<dyn Backend>,
    runtime: Handle,
    default_hourly_rate: HourlyRate,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

/// The in-memory store for one interactive session.
///
/// All operations are synchronous and see the in-memory state immediately.
/// Writes to the backend are detached tasks: a failed write is logged and
/// never rolls back or retries. [`Tracker::flush`] waits for outstanding
/// writes.
///
/// Dropping the tracker stops its tick driver and auth watcher.
pub struct Tracker {
    inner: Arc<Inner>,
    _ticker: TickDriver,
    auth_watch: Mutex<Option<JoinHandle<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Tracker {
    /// Creates the store and starts its tick driver.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(backend: Arc<dyn Backend>, config: TrackerConfig) -> Result<Self, TrackerError> {
        if config.tick_interval.is_zero() {
            return Err(TrackerError::InvalidTickInterval);
        }
        let runtime = Handle::try_current().map_err(TrackerError::NoRuntime)?;
        let state = Arc::new(Mutex::new(State {
            timers: TimerStore::new(),
            sessions: SessionLog::new(),
            hourly_rate: config.default_hourly_rate,
            rate_dirty: false,
            user: None,
            generation: 0,
        }));

        let ticking = Arc::clone(&state);
        let ticker = TickDriver::start(&runtime, config.tick_interval, move || {
            lock(&ticking).timers.tick();
        });

        Ok(Self {
            inner: Arc::new(Inner {
                state,
                backend,
                runtime,
                default_hourly_rate: config.default_hourly_rate,
                pending: Mutex::new(Vec::new()),
            }),
            _ticker: ticker,
            auth_watch: Mutex::new(None),
        })
    }

    fn state(&self) -> MutexGuard<'_, State> {
        lock(&self.inner.state)
    }

    // ========== Timers ==========

    /// Makes `activity` current, creating its timer if needed. Does not
    /// start the clock.
    pub fn select_activity(&self, activity: Activity) {
        self.state().timers.select_activity(activity);
    }

    /// Starts the current timer. No-op without a current activity.
    pub fn resume(&self) {
        self.state().timers.resume();
    }

    /// Stops the current timer. No-op without a current activity.
    pub fn pause(&self) {
        self.state().timers.pause();
    }

    pub fn current_activity(&self) -> Option<Activity> {
        self.state().timers.current_activity()
    }

    pub fn current_timer(&self) -> Option<ActivityTimer> {
        self.state().timers.current_timer().cloned()
    }

    pub fn timers(&self) -> Vec<ActivityTimer> {
        self.state().timers.timers().to_vec()
    }

    /// One tick of the driver, exposed for deterministic tests.
    #[cfg(test)]
    pub(crate) fn tick(&self) -> usize {
        self.state().timers.tick()
    }

    // ========== Sessions ==========

    /// Records a finished timer as a session and drops that timer.
    ///
    /// Earnings use the current hourly rate. Returns `None` without changing
    /// anything if no timer exists for the draft's activity. The session is
    /// written to the backend in the background when a user is signed in.
    pub fn save_session(&self, draft: SessionDraft) -> Option<CompletedSession> {
        let mut state = self.state();
        if state.timers.timer(draft.activity).is_none() {
            debug!(activity = draft.activity.as_str(), "no timer to save, ignoring");
            return None;
        }
        let session = CompletedSession::record(draft, state.hourly_rate, Utc::now());
        state.sessions.prepend(session.clone());
        state.timers.finish(session.activity);
        let user = state.user.clone();
        drop(state);

        info!(
            id = %session.id,
            activity = session.activity.as_str(),
            duration_seconds = session.duration_seconds,
            earnings = %session.earnings,
            "saved session"
        );
        match user {
            Some(user) => {
                let stored = session.clone();
                self.inner.persist("session", move |backend| {
                    backend.append_session(&user, &stored)
                });
            }
            None => debug!("not signed in, session kept in memory only"),
        }
        Some(session)
    }

    /// Sessions, most recent first.
    pub fn sessions(&self) -> Vec<CompletedSession> {
        self.state().sessions.as_slice().to_vec()
    }

    pub fn sessions_for(&self, activity: Activity) -> Vec<CompletedSession> {
        self.state().sessions.by_activity(activity).cloned().collect()
    }

    pub fn session(&self, id: &SessionId) -> Option<CompletedSession> {
        self.state().sessions.get(id).cloned()
    }

    pub fn total_earnings(&self) -> Money {
        self.state().sessions.total_earnings()
    }

    /// What `duration_seconds` would earn at the current rate.
    pub fn calculate_earnings(&self, duration_seconds: u64) -> Money {
        earnings(duration_seconds, self.hourly_rate())
    }

    // ========== Hourly rate ==========

    pub fn hourly_rate(&self) -> HourlyRate {
        self.state().hourly_rate
    }

    /// Changes the hourly rate and writes it to the signed-in user's profile.
    ///
    /// Non-positive or non-finite rates are rejected before anything changes.
    pub fn set_hourly_rate(&self, rate: f64) -> Result<HourlyRate, ValidationError> {
        let rate = HourlyRate::new(rate)?;
        let mut state = self.state();
        state.hourly_rate = rate;
        state.rate_dirty = true;
        let user = state.user.clone();
        drop(state);

        info!(%rate, "hourly rate changed");
        if let Some(user) = user {
            self.inner.persist("hourly rate", move |backend| {
                backend.set_user_profile(&user, rate)
            });
        }
        Ok(rate)
    }

    // ========== Auth ==========

    pub fn user(&self) -> Option<UserId> {
        self.state().user.clone()
    }

    /// Reacts to a sign-in, sign-out or user switch.
    ///
    /// Any change of user clears timers and sessions and resets the rate;
    /// a new user's profile and sessions are then loaded in the background.
    /// Reporting the same user again does nothing.
    pub fn on_auth_changed(&self, user: Option<UserId>) {
        self.inner.on_auth_changed(user);
    }

    /// Follows an auth state stream, replacing any previous one.
    pub fn watch_auth(&self, mut auth: watch::Receiver<Option<UserId>>) {
        let inner = Arc::clone(&self.inner);
        let handle = self.inner.runtime.spawn(async move {
            let user = auth.borrow_and_update().clone();
            inner.on_auth_changed(user);
            while auth.changed().await.is_ok() {
                let user = auth.borrow_and_update().clone();
                inner.on_auth_changed(user);
            }
            debug!("auth stream closed");
        });
        if let Some(previous) = lock(&self.auth_watch).replace(handle) {
            previous.abort();
        }
    }

    /// Waits for every in-flight load and write to finish.
    pub async fn flush(&self) {
        loop {
            let handles = std::mem::take(&mut *lock(&self.inner.pending));
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                if let Err(err) = handle.await {
                    warn!(error = %err, "background task failed");
                }
            }
        }
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.auth_watch).take() {
            handle.abort();
        }
    }
}

impl Inner {
    fn on_auth_changed(&self, user: Option<UserId>) {
        let mut state = lock(&self.state);
        if state.user == user {
            debug!("auth state unchanged");
            return;
        }
        state.generation += 1;
        state.timers.clear();
        state.sessions.clear();
        state.hourly_rate = self.default_hourly_rate;
        state.rate_dirty = false;
        state.user.clone_from(&user);
        let generation = state.generation;
        drop(state);

        match user {
            Some(user) => {
                info!(%user, "signed in, loading profile and sessions");
                self.load(user, generation);
            }
            None => info!("signed out, cleared local state"),
        }
    }

    fn load(&self, user: UserId, generation: u64) {
        let backend = Arc::clone(&self.backend);
        let state = Arc::clone(&self.state);
        let handle = self.runtime.spawn_blocking(move || {
            let profile = backend.user_profile(&user);
            let sessions = backend.list_sessions(&user);

            let mut state = lock(&state);
            if state.generation != generation {
                debug!(%user, "user changed during load, discarding");
                return;
            }
            match profile {
                Ok(profile) => {
                    if let Some(rate) = profile.hourly_rate {
                        if state.rate_dirty {
                            debug!(%rate, "rate changed locally during load, keeping local");
                        } else {
                            state.hourly_rate = rate;
                        }
                    }
                }
                Err(err) => warn!(%user, error = %err, "failed to load profile"),
            }
            match sessions {
                Ok(sessions) => {
                    let loaded = sessions.len();
                    let kept = state.sessions.merge_loaded(sessions);
                    info!(%user, loaded, kept, "loaded sessions");
                }
                Err(err) => warn!(%user, error = %err, "failed to load sessions"),
            }
        });
        self.track(handle);
    }

    /// Runs a backend write in the background, logging failure.
    fn persist(
        &self,
        what: &'static str,
        write: impl FnOnce(&dyn Backend) -> Result<(), BackendError> + Send + 'static,
    ) {
        let backend = Arc::clone(&self.backend);
        let handle = self.runtime.spawn_blocking(move || match write(backend.as_ref()) {
            Ok(()) => debug!(what, "persisted"),
            Err(err) => warn!(what, error = %err, "failed to persist, keeping in-memory state"),
        });
        self.track(handle);
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut pending = lock(&self.pending);
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }
}
