//! CLI subcommand implementations.

pub mod activities;
pub mod convert;
pub mod log;
pub mod rate;
pub mod show;
pub mod track;
pub mod util;
