//! Core domain logic for the zone-out tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Timers: one stopwatch per activity, advanced by ticks
//! - Sessions: immutable records of finished timers and their earnings
//! - Earnings: converting tracked seconds into money at an hourly rate
//! - Persistence: the [`Backend`] trait the tracker writes through

pub mod activity;
mod backend;
pub mod money;
pub mod session;
pub mod summary;
pub mod timer;
pub mod types;

pub use activity::{Activity, default_session_name};
pub use backend::{Backend, BackendError, MemoryBackend, UserProfile};
pub use money::{HourlyRate, Money, earnings};
pub use session::{CompletedSession, SessionDraft, SessionLog};
pub use summary::{
    ActivityTotals, amount_for_hours, format_clock, format_compact, hours_for_amount,
    totals_by_activity,
};
pub use timer::{ActivityTimer, TimerStore};
pub use types::{SessionId, UserId, ValidationError};
