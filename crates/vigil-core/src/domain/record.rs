//! Status history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::RecordId;
use super::status::InstanceStatus;

/// One observation of the instance status.
///
/// - `time` is the moment the status was captured, not when it was written.
/// - Records are never mutated; the only way one disappears is compaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub time: DateTime<Utc>,
    pub status: InstanceStatus,
}

impl StatusRecord {
    pub fn new(time: DateTime<Utc>, status: impl Into<InstanceStatus>) -> Self {
        Self {
            time,
            status: status.into(),
        }
    }
}

/// A record together with the identity the store assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub record: StatusRecord,
}

impl StoredRecord {
    pub fn new(id: RecordId, record: StatusRecord) -> Self {
        Self { id, record }
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.record.time
    }

    pub fn status(&self) -> &InstanceStatus {
        &self.record.status
    }
}
