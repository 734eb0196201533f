//! The catalogue of leisure activities a user can time.

use std::fmt;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// A leisure activity the user times against.
///
/// The set is closed; persisted sessions carry the snake_case key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    /// Slacking off at the desk.
    ZoneOut,
    /// Sitting through a meeting.
    Meeting,
    /// A paid bathroom break.
    Restroom,
}

impl Activity {
    /// Every activity, in catalogue order.
    pub const ALL: [Self; 3] = [Self::ZoneOut, Self::Meeting, Self::Restroom];

    /// Stable key used for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ZoneOut => "zone_out",
            Self::Meeting => "meeting",
            Self::Restroom => "restroom",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ZoneOut => "Zone Out",
            Self::Meeting => "Meeting",
            Self::Restroom => "Restroom",
        }
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::ZoneOut => "A fine day for drifting and counting money",
            Self::Meeting => "Can't listen anymore? Counting money might help",
            Self::Restroom => "A paid bathroom break is the best break there is",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Activity {
    type Err = ValidationError;

    /// Accepts either the key or the label, ignoring case and treating
    /// spaces, hyphens and underscores alike.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        Self::ALL
            .into_iter()
            .find(|activity| activity.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownActivity {
                value: s.to_string(),
            })
    }
}

/// Name given to a session saved without one, e.g. `"14:05 Meeting"`.
pub fn default_session_name<Tz: TimeZone>(activity: Activity, at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    format!("{} {}", at.format("%H:%M"), activity.label())
}
