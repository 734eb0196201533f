//! Summaries over the session log: duration formatting, per-activity
//! totals, and the money/hours converter.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::activity::Activity;
use crate::money::{HourlyRate, Money};
use crate::session::CompletedSession;

/// Formats seconds as a stopwatch reading, e.g. `01:02:03`.
pub fn format_clock(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats seconds compactly, omitting zero units, e.g. `1h 5s` or `0s`.
pub fn format_compact(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if secs > 0 || parts.is_empty() {
        parts.push(format!("{secs}s"));
    }
    parts.join(" ")
}

/// Aggregate for one activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivityTotals {
    pub sessions: usize,
    pub seconds: u64,
    pub earnings: Money,
}

/// Totals per activity, in catalogue order. Activities without sessions
/// are left out.
pub fn totals_by_activity<'a>(
    sessions: impl IntoIterator<Item = &'a CompletedSession>,
) -> BTreeMap<Activity, ActivityTotals> {
    let mut totals: BTreeMap<Activity, ActivityTotals> = BTreeMap::new();
    for session in sessions {
        let entry = totals.entry(session.activity).or_default();
        entry.sessions += 1;
        entry.seconds += session.duration_seconds;
        entry.earnings = entry.earnings + session.earnings;
    }
    totals
}

/// Hours of tracked time needed to earn `amount`.
pub fn hours_for_amount(amount: Money, rate: HourlyRate) -> f64 {
    amount.amount() / rate.value()
}

/// What `hours` of tracked time is worth at `rate`.
pub fn amount_for_hours(hours: f64, rate: HourlyRate) -> Money {
    Money::from_amount(hours * rate.value())
}
