use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::month::YearMonth;

/// Monthly uptime, as a tally of one-minute `RUNNING` samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uptime {
    pub month: YearMonth,
    /// All records found in the month, whatever their status.
    pub samples: u64,
    pub running_minutes: u64,
}

impl Uptime {
    pub fn hours(&self) -> u64 {
        self.running_minutes / 60
    }

    pub fn remainder_minutes(&self) -> u64 {
        self.running_minutes % 60
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.running_minutes * 60)
    }
}

impl fmt::Display for Uptime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} minutes ({}h {}m)",
            self.running_minutes,
            self.hours(),
            self.remainder_minutes()
        )
    }
}
