//! Lists the activity catalogue.

use std::io::Write;

use anyhow::Result;

use zt_core::Activity;

pub fn run<W: Write>(writer: &mut W) -> Result<()> {
    for activity in Activity::ALL {
        writeln!(
            writer,
            "- {:<8}  {:<8}  {}",
            activity.as_str(),
            activity.label(),
            activity.description()
        )?;
    }
    Ok(())
}
