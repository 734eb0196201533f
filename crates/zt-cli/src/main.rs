use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use zt_cli::commands::{activities, convert, log, rate, show, track, util};
use zt_cli::{Cli, Commands, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so they never mix with command output
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = std::io::stdout().lock();
    match &cli.command {
        Some(Commands::Activities) => activities::run(&mut stdout)?,
        Some(Commands::Track(args)) => {
            let tracker = util::open_tracker(&config).await?;
            track::run(&mut stdout, &tracker, args, track::stdin_lines()).await?;
            tracker.flush().await;
        }
        Some(Commands::Log(args)) => {
            let tracker = util::open_tracker(&config).await?;
            log::run(&mut stdout, &tracker, args)?;
        }
        Some(Commands::Show { id }) => {
            let tracker = util::open_tracker(&config).await?;
            show::run(&mut stdout, &tracker, id)?;
        }
        Some(Commands::Rate { action }) => {
            let tracker = util::open_tracker(&config).await?;
            rate::run(&mut stdout, &tracker, action.as_ref())?;
            tracker.flush().await;
        }
        Some(Commands::Convert(args)) => {
            let tracker = util::open_tracker(&config).await?;
            convert::run(&mut stdout, &tracker, args)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}
