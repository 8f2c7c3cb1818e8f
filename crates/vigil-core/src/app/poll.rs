//! Poll policy: bounded, fixed-interval waiting for an instance status.

use std::time::Duration;

use tracing::debug;

use crate::domain::{InstanceStatus, VigilError};
use crate::ports::{InstanceControl, InstanceSnapshot};

/// How long to wait for the instance to settle after start/stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between two status reads.
    pub interval: Duration,

    /// Maximum number of status reads, including the first one.
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Upper bound of time spent sleeping.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

impl Default for PollPolicy {
    /// Every 5 seconds for up to 5 minutes.
    fn default() -> Self {
        Self::new(Duration::from_secs(5), 60)
    }
}

/// Poll `control` until `done` accepts the reported status.
///
/// Returns the first accepted snapshot, or `WaitTimedOut` once
/// `max_attempts` reads have been made. Control errors end the wait.
pub async fn wait_for_status<C, F>(
    control: &C,
    policy: &PollPolicy,
    done: F,
) -> Result<InstanceSnapshot, VigilError>
where
    C: InstanceControl + ?Sized,
    F: Fn(&InstanceStatus) -> bool,
{
    let mut last = String::new();
    for attempt in 1..=policy.max_attempts {
        let snapshot = control.get_status().await?;
        if done(&snapshot.status) {
            return Ok(snapshot);
        }
        debug!(attempt, status = %snapshot.status, "instance not settled yet");
        last = snapshot.status.to_string();

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(VigilError::WaitTimedOut {
        attempts: policy.max_attempts,
        last,
    })
}
