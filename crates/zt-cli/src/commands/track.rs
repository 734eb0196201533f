//! Track command: an interactive stopwatch for one activity.
//!
//! The timer starts right away. Each input line is a command: an empty line
//! pauses or resumes, `status` prints the clock, `stop` saves the session
//! and `quit` discards it. End of input saves, same as `stop`.

use std::io::{BufRead, Write};

use anyhow::{Result, bail};
use tokio::sync::mpsc;

use zt_core::{CompletedSession, SessionDraft, format_clock, format_compact};
use zt_tracker::Tracker;

use crate::TrackArgs;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Toggle,
    Status,
    Stop,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "p" | "pause" | "resume" => Command::Toggle,
        "s" | "status" => Command::Status,
        "stop" | "save" => Command::Stop,
        "q" | "quit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

/// Reads stdin on a background thread, one message per line.
pub fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Runs the stopwatch until `stop`, `quit` or end of input. Returns the
/// saved session, or `None` when discarded.
pub async fn run<W: Write>(
    writer: &mut W,
    tracker: &Tracker,
    args: &TrackArgs,
    mut input: mpsc::Receiver<String>,
) -> Result<Option<CompletedSession>> {
    let activity = args.activity;
    tracker.select_activity(activity);
    tracker.resume();
    writeln!(
        writer,
        "Timing {activity}. Enter pauses or resumes, `status` shows the clock, `stop` saves, `quit` discards."
    )?;

    while let Some(line) = input.recv().await {
        let (elapsed, running) = tracker
            .current_timer()
            .map_or((0, false), |timer| (timer.elapsed_seconds(), timer.is_running()));
        match parse_command(&line) {
            Command::Toggle if running => {
                tracker.pause();
                writeln!(writer, "Paused at {}", format_clock(elapsed))?;
            }
            Command::Toggle => {
                tracker.resume();
                writeln!(writer, "Resumed at {}", format_clock(elapsed))?;
            }
            Command::Status => {
                let state = if running { "running" } else { "paused" };
                writeln!(
                    writer,
                    "{} {state}, {} earned",
                    format_clock(elapsed),
                    tracker.calculate_earnings(elapsed)
                )?;
            }
            Command::Stop => break,
            Command::Quit => {
                tracker.pause();
                writeln!(writer, "Discarded {} of {activity}", format_clock(elapsed))?;
                return Ok(None);
            }
            Command::Unknown(other) => {
                writeln!(writer, "Unknown command {other:?}")?;
            }
        }
    }

    tracker.pause();
    let duration_seconds = tracker.current_timer().map_or(0, |timer| timer.elapsed_seconds());
    let draft = SessionDraft {
        activity,
        name: args.name.clone().unwrap_or_default(),
        notes: args.notes.clone().unwrap_or_default(),
        duration_seconds,
    };
    let Some(session) = tracker.save_session(draft) else {
        bail!("no timer for {activity}");
    };
    tracing::info!(id = %session.id, duration_seconds, "session saved");
    writeln!(
        writer,
        "Saved {:?}: {} of {activity}, earned {}",
        session.name,
        format_compact(session.duration_seconds),
        session.earnings
    )?;
    Ok(Some(session))
}
