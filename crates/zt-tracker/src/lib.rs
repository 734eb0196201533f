//! The zone-out tracker's runtime store.
//!
//! [`Tracker`] is the explicit, injectable store a UI drives: it owns the
//! per-activity timers, the session log and the hourly rate, advances
//! running timers from a [`TickDriver`], and writes through to a
//! [`zt_core::Backend`] without ever blocking the caller on storage.

pub mod tick;
mod tracker;

use thiserror::Error;

pub use tick::TickDriver;
pub use tracker::{Tracker, TrackerConfig};

/// Errors starting a tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Not called from within a tokio runtime.
    #[error("tracker must be started inside a tokio runtime")]
    NoRuntime(#[source] tokio::runtime::TryCurrentError),
    /// The tick interval was zero.
    #[error("tick interval must be greater than zero")]
    InvalidTickInterval,
}
