//! Shared helpers for commands.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};

use zt_core::UserId;
use zt_db::{Database, SharedDatabase};
use zt_tracker::{Tracker, TrackerConfig};

use crate::Config;

/// Opens the database and signs the configured user in, waiting until
/// their profile and sessions are loaded.
pub async fn open_tracker(config: &Config) -> Result<Tracker> {
    let user = UserId::new(config.user.clone()).context("invalid user in configuration")?;

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }
    let db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;

    let tracker = Tracker::start(
        Arc::new(SharedDatabase::new(db)),
        TrackerConfig {
            default_hourly_rate: config.default_hourly_rate,
            ..TrackerConfig::default()
        },
    )?;
    tracker.on_auth_changed(Some(user));
    tracker.flush().await;
    Ok(tracker)
}

/// Formats a timestamp as `YYYY-MM-DD HH:MM` in `tz`.
pub fn format_when<Tz: TimeZone>(timestamp: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string()
}
