//! Show command: one session in detail.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Result, bail};
use chrono::{Local, TimeZone};

use zt_core::{CompletedSession, SessionId, format_clock};
use zt_tracker::Tracker;

use super::util::format_when;

pub fn run<W: Write>(writer: &mut W, tracker: &Tracker, query: &str) -> Result<()> {
    let session = find_session(tracker, query)?;
    write!(writer, "{}", format_session(&session, &Local))?;
    Ok(())
}

/// Resolves a full session ID or a unique prefix of one.
fn find_session(tracker: &Tracker, query: &str) -> Result<CompletedSession> {
    let query = query.trim();
    if let Some(session) = SessionId::new(query).ok().and_then(|id| tracker.session(&id)) {
        return Ok(session);
    }

    let mut matches: Vec<CompletedSession> = tracker
        .sessions()
        .into_iter()
        .filter(|session| !query.is_empty() && session.id.as_str().starts_with(query))
        .collect();
    match matches.len() {
        0 => bail!("no session matches {query:?}"),
        1 => Ok(matches.remove(0)),
        n => bail!("{n} sessions match {query:?}; use a longer prefix"),
    }
}

fn format_session<Tz: TimeZone>(session: &CompletedSession, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let notes = if session.notes.trim().is_empty() {
        "No notes"
    } else {
        session.notes.as_str()
    };

    let mut out = String::new();
    let _ = writeln!(out, "Name:      {}", session.name);
    let _ = writeln!(out, "Activity:  {}", session.activity);
    let _ = writeln!(out, "When:      {}", format_when(&session.timestamp, tz));
    let _ = writeln!(out, "Duration:  {}", format_clock(session.duration_seconds));
    let _ = writeln!(out, "Earned:    {}", session.earnings);
    let _ = writeln!(out, "Mood:      {notes}");
    let _ = writeln!(out, "ID:        {}", session.id);
    out
}
