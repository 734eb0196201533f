//! Rate command: show or change the hourly rate.

use std::io::Write;

use anyhow::Result;

use zt_core::HourlyRate;
use zt_tracker::Tracker;

use crate::RateAction;

pub fn run<W: Write>(writer: &mut W, tracker: &Tracker, action: Option<&RateAction>) -> Result<()> {
    match action {
        None => writeln!(writer, "Hourly rate: {}/h", tracker.hourly_rate())?,
        Some(RateAction::Set { value }) => {
            let rate: HourlyRate = value.parse()?;
            let rate = tracker.set_hourly_rate(rate.value())?;
            writeln!(writer, "Hourly rate set to {rate}/h")?;
        }
    }
    Ok(())
}
