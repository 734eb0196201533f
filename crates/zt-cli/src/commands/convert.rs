//! Convert command: how long to zone out for an amount, or what hours are worth.

use std::io::Write;

use anyhow::{Result, bail};

use zt_core::{HourlyRate, Money, amount_for_hours, hours_for_amount};
use zt_tracker::Tracker;

use crate::ConvertArgs;

pub fn run<W: Write>(writer: &mut W, tracker: &Tracker, args: &ConvertArgs) -> Result<()> {
    let rate = tracker.hourly_rate();
    let line = match (args.amount, args.hours) {
        (Some(amount), None) => describe_amount(amount, rate)?,
        (None, Some(hours)) => describe_hours(hours, rate)?,
        _ => bail!("pass exactly one of --amount or --hours"),
    };
    writeln!(writer, "{line}")?;
    writeln!(writer, "Earned so far: {}", tracker.total_earnings())?;
    Ok(())
}

fn check_input(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        bail!("{name} must be a non-negative number, got {value}");
    }
    Ok(())
}

fn describe_amount(amount: f64, rate: HourlyRate) -> Result<String> {
    check_input("amount", amount)?;
    let amount = Money::from_amount(amount);
    let hours = hours_for_amount(amount, rate);
    Ok(format!("{amount} takes {hours:.1} hours at {rate}/h"))
}

fn describe_hours(hours: f64, rate: HourlyRate) -> Result<String> {
    check_input("hours", hours)?;
    let amount = amount_for_hours(hours, rate);
    Ok(format!("{hours:.1} hours are worth {amount} at {rate}/h"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::commands::util::test_support::{sample_sessions, tracker_with};

    #[test]
    fn amount_to_hours() {
        let rate = HourlyRate::new(80.0).unwrap();
        assert_eq!(
            describe_amount(200.0, rate).unwrap(),
            "200.00 takes 2.5 hours at 80.00/h"
        );
    }

    #[test]
    fn hours_to_amount() {
        let rate = HourlyRate::new(80.0).unwrap();
        assert_eq!(
            describe_hours(1.5, rate).unwrap(),
            "1.5 hours are worth 120.00 at 80.00/h"
        );
    }

    #[test]
    fn rejects_negative_and_non_finite_input() {
        assert!(describe_amount(-1.0, HourlyRate::DEFAULT).is_err());
        assert!(describe_hours(f64::NAN, HourlyRate::DEFAULT).is_err());
        assert!(describe_hours(f64::INFINITY, HourlyRate::DEFAULT).is_err());
    }

    #[tokio::test]
    async fn run_reports_running_total() {
        let tracker = tracker_with(&sample_sessions()).await;
        let args = ConvertArgs {
            amount: None,
            hours: Some(2.0),
        };

        let mut output = Vec::new();
        run(&mut output, &tracker, &args).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "2.0 hours are worth 200.00 at 100.00/h\nEarned so far: 119.31\n"
        );
    }
}
