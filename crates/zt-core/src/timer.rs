//! Per-activity stopwatch timers and the currently selected activity.
//!
//! A [`TimerStore`] holds at most one [`ActivityTimer`] per [`Activity`].
//! Elapsed time only moves forward through [`TimerStore::tick`], which the
//! tick driver calls once per second; selecting, resuming and pausing only
//! touch the running flag and the current-activity pointer.

use serde::Serialize;

use crate::activity::Activity;

/// Stopwatch state for one activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityTimer {
    activity: Activity,
    elapsed_seconds: u64,
    is_running: bool,
}

impl ActivityTimer {
    /// A stopped timer at zero.
    const fn new(activity: Activity) -> Self {
        Self {
            activity,
            elapsed_seconds: 0,
            is_running: false,
        }
    }

    pub const fn activity(&self) -> Activity {
        self.activity
    }

    /// Seconds observed while running.
    pub const fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub const fn is_running(&self) -> bool {
        self.is_running
    }
}

/// All live timers plus the activity controlled by resume/pause.
#[derive(Debug, Clone, Default)]
pub struct TimerStore {
    timers: Vec<ActivityTimer>,
    current: Option<Activity>,
}

impl TimerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `activity` current, creating a stopped timer for it if none
    /// exists. An existing timer keeps its elapsed time. Does not start the
    /// clock.
    pub fn select_activity(&mut self, activity: Activity) {
        self.current = Some(activity);
        if self.timer(activity).is_none() {
            tracing::debug!(activity = activity.as_str(), "created timer");
            self.timers.push(ActivityTimer::new(activity));
        }
    }

    /// Starts the current timer. No-op without a current activity.
    pub fn resume(&mut self) {
        self.set_running(true);
    }

    /// Stops the current timer. No-op without a current activity.
    pub fn pause(&mut self) {
        self.set_running(false);
    }

    fn set_running(&mut self, running: bool) {
        let Some(activity) = self.current else {
            tracing::debug!(running, "no current activity, ignoring");
            return;
        };
        if let Some(timer) = self.timer_mut(activity) {
            timer.is_running = running;
        }
    }

    /// The selected activity, if any.
    pub const fn current_activity(&self) -> Option<Activity> {
        self.current
    }

    /// The timer of the selected activity, if any.
    pub fn current_timer(&self) -> Option<&ActivityTimer> {
        self.current.and_then(|activity| self.timer(activity))
    }

    pub fn timer(&self, activity: Activity) -> Option<&ActivityTimer> {
        self.timers.iter().find(|t| t.activity == activity)
    }

    fn timer_mut(&mut self, activity: Activity) -> Option<&mut ActivityTimer> {
        self.timers.iter_mut().find(|t| t.activity == activity)
    }

    /// All timers in creation order.
    pub fn timers(&self) -> &[ActivityTimer] {
        &self.timers
    }

    /// Advances every running timer by one second.
    ///
    /// Returns how many timers advanced.
    pub fn tick(&mut self) -> usize {
        let mut advanced = 0;
        for timer in self.timers.iter_mut().filter(|t| t.is_running) {
            timer.elapsed_seconds = timer.elapsed_seconds.saturating_add(1);
            advanced += 1;
        }
        advanced
    }

    /// Drops the timer for `activity` and clears the current activity.
    ///
    /// Returns the removed timer.
    pub fn finish(&mut self, activity: Activity) -> Option<ActivityTimer> {
        self.current = None;
        let index = self.timers.iter().position(|t| t.activity == activity)?;
        Some(self.timers.remove(index))
    }

    /// Forgets every timer and the current activity.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn select_creates_stopped_timer() {
        let mut store = TimerStore::new();
        store.select_activity(Activity::ZoneOut);

        let timer = store.current_timer().unwrap();
        assert_eq!(timer.activity(), Activity::ZoneOut);
        assert_eq!(timer.elapsed_seconds(), 0);
        assert!(!timer.is_running());
    }

    #[test]
    fn select_twice_keeps_elapsed_time() {
        let mut store = TimerStore::new();
        store.select_activity(Activity::Meeting);
        store.resume();
        store.tick();
        store.tick();
        store.pause();

        store.select_activity(Activity::Meeting);
        store.select_activity(Activity::Meeting);

        let timer = store.current_timer().unwrap();
        assert_eq!(timer.elapsed_seconds(), 2);
        assert!(!timer.is_running());
        assert_eq!(store.timers().len(), 1);
    }

    #[test]
    fn switching_activity_reuses_paused_timer() {
        let mut store = TimerStore::new();
        store.select_activity(Activity::ZoneOut);
        store.resume();
        store.tick();
        store.pause();

        store.select_activity(Activity::Restroom);
        store.select_activity(Activity::ZoneOut);

        assert_eq!(store.current_timer().unwrap().elapsed_seconds(), 1);
        assert_eq!(store.timers().len(), 2);
    }

    #[test]
    fn at_most_one_timer_per_activity() {
        let mut store = TimerStore::new();
        let sequence = [
            Activity::ZoneOut,
            Activity::Meeting,
            Activity::ZoneOut,
            Activity::Restroom,
            Activity::Meeting,
            Activity::Meeting,
        ];
        for activity in sequence {
            store.select_activity(activity);
        }

        let distinct: HashSet<_> = store.timers().iter().map(ActivityTimer::activity).collect();
        assert_eq!(distinct.len(), store.timers().len());
        assert_eq!(store.timers().len(), 3);
        assert_eq!(store.current_activity(), Some(Activity::Meeting));
    }

    #[test]
    fn resume_and_pause_without_selection_are_noops() {
        let mut store = TimerStore::new();
        store.resume();
        store.pause();
        assert!(store.current_timer().is_none());
        assert!(store.timers().is_empty());
    }

    #[test]
    fn tick_advances_only_running_timers() {
        let mut store = TimerStore::new();
        store.select_activity(Activity::ZoneOut);
        store.resume();
        store.select_activity(Activity::Meeting);

        assert_eq!(store.tick(), 1);
        assert_eq!(store.tick(), 1);

        assert_eq!(store.timer(Activity::ZoneOut).unwrap().elapsed_seconds(), 2);
        assert_eq!(store.timer(Activity::Meeting).unwrap().elapsed_seconds(), 0);
    }

    #[test]
    fn tick_is_monotonic_while_running() {
        let mut store = TimerStore::new();
        store.select_activity(Activity::Restroom);
        store.resume();
        let mut last = 0;
        for _ in 0..50 {
            store.tick();
            let now = store.current_timer().unwrap().elapsed_seconds();
            assert_eq!(now, last + 1);
            last = now;
        }

        store.pause();
        for _ in 0..10 {
            store.tick();
        }
        assert_eq!(store.current_timer().unwrap().elapsed_seconds(), last);
    }

    #[test]
    fn finish_removes_timer_and_clears_current() {
        let mut store = TimerStore::new();
        store.select_activity(Activity::ZoneOut);
        store.select_activity(Activity::Meeting);

        let removed = store.finish(Activity::ZoneOut).unwrap();
        assert_eq!(removed.activity(), Activity::ZoneOut);
        assert!(store.timer(Activity::ZoneOut).is_none());
        assert!(store.timer(Activity::Meeting).is_some());
        assert_eq!(store.current_activity(), None);
    }
}
