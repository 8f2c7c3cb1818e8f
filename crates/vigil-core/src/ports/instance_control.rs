//! InstanceControl port - VM インスタンスの起動・停止・状態取得
//!
//! コアは `get_status` が返すステータス文字列だけを使う。
//! 起動・停止の発行方法（gcloud, REST API, ...）は実装側の関心事。
//!
//! # 実装
//! - **GcloudInstanceControl**: `gcloud compute instances` を呼び出す
//! - **SimulatedInstanceControl**: メモリ上で状態を切り替える（テスト・dry run 用）

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::{ControlError, InstanceStatus};

/// Lifecycle operation issued to the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Start,
    Stop,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Start => "start",
            Operation::Stop => "stop",
        }
    }

    /// The status the instance settles in once the operation completes.
    pub fn settled_status(&self) -> InstanceStatus {
        match self {
            Operation::Start => InstanceStatus::running(),
            Operation::Stop => InstanceStatus::terminated(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Operation::Start),
            "stop" => Ok(Operation::Stop),
            other => Err(ControlError::Other(format!(
                "unknown operation [{other}] is specified"
            ))),
        }
    }
}

/// What `get_status` reports about the instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSnapshot {
    pub status: InstanceStatus,
    /// Empty while the instance has no external NAT address.
    pub external_address: String,
}

impl fmt::Display for InstanceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status: {}, external ip: {}",
            self.status, self.external_address
        )
    }
}

#[async_trait]
pub trait InstanceControl: Send + Sync {
    async fn get_status(&self) -> Result<InstanceSnapshot, ControlError>;

    async fn do_operation(&self, op: Operation) -> Result<(), ControlError>;
}

#[async_trait]
impl<C: InstanceControl + ?Sized> InstanceControl for std::sync::Arc<C> {
    async fn get_status(&self) -> Result<InstanceSnapshot, ControlError> {
        (**self).get_status().await
    }

    async fn do_operation(&self, op: Operation) -> Result<(), ControlError> {
        (**self).do_operation(op).await
    }
}
