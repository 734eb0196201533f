//! Log command: saved sessions, most recent first, with per-activity totals.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{Local, TimeZone};
use serde::Serialize;

use zt_core::{
    Activity, ActivityTotals, CompletedSession, Money, format_compact, totals_by_activity,
};
use zt_tracker::Tracker;

use super::util::format_when;
use crate::LogArgs;

/// Width of the shortened session ID column; `zt show` accepts the prefix.
const SHORT_ID_LEN: usize = 8;

#[derive(Debug, Serialize)]
struct LogOutput<'a> {
    sessions: &'a [CompletedSession],
    totals: Vec<TotalsEntry>,
    total_earnings: Money,
}

#[derive(Debug, Serialize)]
struct TotalsEntry {
    activity: Activity,
    #[serde(flatten)]
    totals: ActivityTotals,
}

pub fn run<W: Write>(writer: &mut W, tracker: &Tracker, args: &LogArgs) -> Result<()> {
    let sessions = match args.activity {
        Some(activity) => tracker.sessions_for(activity),
        None => tracker.sessions(),
    };
    tracing::debug!(count = sessions.len(), activity = ?args.activity, "listing sessions");

    if args.json {
        writeln!(writer, "{}", format_json(&sessions)?)?;
    } else {
        write!(writer, "{}", format_log(&sessions, &Local))?;
    }
    Ok(())
}

fn format_json(sessions: &[CompletedSession]) -> Result<String> {
    let output = LogOutput {
        sessions,
        totals: totals_by_activity(sessions)
            .into_iter()
            .map(|(activity, totals)| TotalsEntry { activity, totals })
            .collect(),
        total_earnings: sessions.iter().map(|s| s.earnings).sum(),
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

fn format_log<Tz: TimeZone>(sessions: &[CompletedSession], tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    if sessions.is_empty() {
        return "No sessions yet. Stop a timer to save one.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8}  {:<16}  {:<8}  {:>10}  {:>8}  Name",
        "ID", "When", "Activity", "Duration", "Earned"
    );
    for session in sessions {
        let short_id: String = session.id.as_str().chars().take(SHORT_ID_LEN).collect();
        let _ = writeln!(
            out,
            "{:<8}  {:<16}  {:<8}  {:>10}  {:>8}  {}",
            short_id,
            format_when(&session.timestamp, tz),
            session.activity.label(),
            format_compact(session.duration_seconds),
            session.earnings.to_string(),
            session.name
        );
        if !session.notes.is_empty() {
            let _ = writeln!(out, "{:10}> {}", "", session.notes);
        }
    }

    out.push('\n');
    let _ = writeln!(
        out,
        "  {:<8}  {:>5}  {:>10}  {:>8}",
        "Activity", "Count", "Duration", "Earned"
    );
    let totals = totals_by_activity(sessions);
    for (activity, entry) in &totals {
        write_totals_row(&mut out, activity.label(), entry);
    }
    let all = totals.values().fold(ActivityTotals::default(), |acc, entry| ActivityTotals {
        sessions: acc.sessions + entry.sessions,
        seconds: acc.seconds + entry.seconds,
        earnings: acc.earnings + entry.earnings,
    });
    write_totals_row(&mut out, "All", &all);
    out
}

fn write_totals_row(out: &mut String, label: &str, totals: &ActivityTotals) {
    let _ = writeln!(
        out,
        "  {:<8}  {:>5}  {:>10}  {:>8}",
        label,
        totals.sessions,
        format_compact(totals.seconds),
        totals.earnings.to_string()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use insta::assert_snapshot;

    use crate::commands::util::test_support::{sample_sessions, tracker_with};

    #[test]
    fn formats_sessions_and_totals() {
        let output = format_log(&sample_sessions(), &Utc);
        assert_snapshot!(output, @r"
        ID        When              Activity    Duration    Earned  Name
        aaaaaaaa  2025-01-02 09:30  Meeting       1m 30s      2.50  standup
                  > sleepy
        bbbbbbbb  2025-01-02 08:00  Zone Out       1h 5s    100.14  nap
        abababab  2025-01-02 07:00  Zone Out         10m     16.67  coffee run

          Activity  Count    Duration    Earned
          Zone Out      2   1h 10m 5s    116.81
          Meeting       1      1m 30s      2.50
          All           3  1h 11m 35s    119.31
        ");
    }

    #[test]
    fn empty_log_has_hint() {
        let output = format_log(&[], &Utc);
        assert_eq!(output, "No sessions yet. Stop a timer to save one.\n");
    }

    #[test]
    fn json_totals_match_sessions() {
        let sessions = sample_sessions();
        let json: serde_json::Value = serde_json::from_str(&format_json(&sessions).unwrap()).unwrap();

        assert_eq!(json["sessions"].as_array().unwrap().len(), 3);
        assert_eq!(json["sessions"][0]["name"], "standup");
        assert_eq!(json["sessions"][0]["activity"], "meeting");
        assert_eq!(json["total_earnings"], 119.31);

        let totals = json["totals"].as_array().unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0]["activity"], "zone_out");
        assert_eq!(totals[0]["sessions"], 2);
        assert_eq!(totals[0]["seconds"], 4205);
        assert_eq!(totals[0]["earnings"], 116.81);
    }

    #[tokio::test]
    async fn activity_filter_limits_sessions_and_totals() {
        let tracker = tracker_with(&sample_sessions()).await;
        let args = LogArgs {
            activity: Some(Activity::Meeting),
            json: false,
        };

        let mut output = Vec::new();
        run(&mut output, &tracker, &args).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("standup"));
        assert!(!output.contains("nap"));
        assert!(output.contains("  All           1      1m 30s      2.50"));
    }
}
