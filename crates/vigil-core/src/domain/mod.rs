//! Domain model (ids, statuses, records, months, uptime, errors).
//!
//! ドメイン層は永続化や外部 API を知らない。
//! ストアや Instance Control の抽象は `ports` に置く。

pub mod compaction;
pub mod errors;
pub mod ids;
pub mod month;
pub mod record;
pub mod status;
pub mod uptime;

pub use compaction::CompactionRule;
pub use errors::{ConfigError, ControlError, MonthParseError, StoreError, VigilError};
pub use ids::RecordId;
pub use month::{MonthRange, YearMonth};
pub use record::{StatusRecord, StoredRecord};
pub use status::InstanceStatus;
pub use uptime::Uptime;
