//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use zt_core::Activity;

/// Zone-out time tracker.
///
/// Time your leisure at work and see what the boss paid for it.
#[derive(Debug, Parser)]
#[command(name = "zt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the activities you can time.
    Activities,

    /// Time an activity interactively, then save it as a session.
    Track(TrackArgs),

    /// List saved sessions with totals.
    Log(LogArgs),

    /// Show a single session.
    Show {
        /// Session ID or a unique prefix of it.
        id: String,
    },

    /// Show or change the hourly rate.
    Rate {
        #[command(subcommand)]
        action: Option<RateAction>,
    },

    /// Convert between money and hours of tracked time.
    Convert(ConvertArgs),
}

#[derive(Debug, Args)]
pub struct TrackArgs {
    /// Activity to time (e.g. zone-out, meeting, restroom).
    pub activity: Activity,

    /// Session name. Defaults to the save time and activity.
    #[arg(long)]
    pub name: Option<String>,

    /// One-line mood note.
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Only show sessions of this activity.
    #[arg(long)]
    pub activity: Option<Activity>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum RateAction {
    /// Set the hourly rate.
    Set {
        /// New rate per hour; must be positive.
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct ConvertArgs {
    /// How many hours of tracked time buy this amount.
    #[arg(long)]
    pub amount: Option<f64>,

    /// What this many hours of tracked time are worth.
    #[arg(long)]
    pub hours: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_track_with_label() {
        let cli = Cli::try_parse_from(["zt", "track", "zone-out", "--name", "nap"]).unwrap();
        let Some(Commands::Track(args)) = cli.command else {
            panic!("expected track command");
        };
        assert_eq!(args.activity, Activity::ZoneOut);
        assert_eq!(args.name.as_deref(), Some("nap"));
        assert!(args.notes.is_none());
    }

    #[test]
    fn rejects_unknown_activity() {
        let result = Cli::try_parse_from(["zt", "track", "coffee"]);
        assert!(result.is_err());
    }

    #[test]
    fn rate_set_accepts_negative_text() {
        let cli = Cli::try_parse_from(["zt", "rate", "set", "-5"]).unwrap();
        let Some(Commands::Rate {
            action: Some(RateAction::Set { value }),
        }) = cli.command
        else {
            panic!("expected rate set");
        };
        assert_eq!(value, "-5");
    }

    #[test]
    fn convert_requires_exactly_one_input() {
        assert!(Cli::try_parse_from(["zt", "convert"]).is_err());
        assert!(Cli::try_parse_from(["zt", "convert", "--amount", "1", "--hours", "1"]).is_err());
        assert!(Cli::try_parse_from(["zt", "convert", "--hours", "2"]).is_ok());
    }
}
