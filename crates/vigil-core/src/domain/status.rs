use serde::{Deserialize, Serialize};
use std::fmt;

/// Status code reported by the compute API (`RUNNING`, `TERMINATED`, ...).
///
/// The set is open: whatever string the API reports is stored and read back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceStatus(String);

impl InstanceStatus {
    pub const RUNNING: &'static str = "RUNNING";
    pub const TERMINATED: &'static str = "TERMINATED";

    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn running() -> Self {
        Self::new(Self::RUNNING)
    }

    pub fn terminated() -> Self {
        Self::new(Self::TERMINATED)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_running(&self) -> bool {
        self.0 == Self::RUNNING
    }

    pub fn is_terminated(&self) -> bool {
        self.0 == Self::TERMINATED
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for InstanceStatus {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for InstanceStatus {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for InstanceStatus {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for InstanceStatus {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
