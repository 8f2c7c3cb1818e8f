//! Launcher - CLI から使うアプリケーションサービス
//!
//! Instance Control と StatusRecorder をまとめる。
//! - start / stop: 操作を発行し、必要なら PollPolicy に従って完了を待つ
//! - status: 現在のステータスと外部 IP
//! - store_status: 現在のステータスを取得して履歴に記録（定期実行用）

use tracing::info;

use super::poll::{PollPolicy, wait_for_status};
use super::recorder::StatusRecorder;
use crate::domain::{StoredRecord, VigilError};
use crate::ports::{Clock, InstanceControl, InstanceSnapshot, Operation, StatusStore};

pub struct Launcher<C, S, K> {
    control: C,
    recorder: StatusRecorder<S, K>,
    poll: PollPolicy,
}

impl<C, S, K> Launcher<C, S, K>
where
    C: InstanceControl,
    S: StatusStore,
    K: Clock,
{
    pub fn new(control: C, recorder: StatusRecorder<S, K>) -> Self {
        Self {
            control,
            recorder,
            poll: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Issue `op`. With `wait`, poll until the instance reports the status
    /// the operation settles in and return that snapshot.
    pub async fn operate(
        &self,
        op: Operation,
        wait: bool,
    ) -> Result<Option<InstanceSnapshot>, VigilError> {
        self.control.do_operation(op).await?;
        info!(%op, "operation accepted");
        if !wait {
            return Ok(None);
        }

        let settled = op.settled_status();
        let snapshot = wait_for_status(&self.control, &self.poll, |status| *status == settled).await?;
        Ok(Some(snapshot))
    }

    pub async fn status(&self) -> Result<InstanceSnapshot, VigilError> {
        Ok(self.control.get_status().await?)
    }

    /// Read the current status and append it to the history.
    pub async fn store_status(&self) -> Result<StoredRecord, VigilError> {
        let snapshot = self.control.get_status().await?;
        self.recorder.record(snapshot.status).await
    }
}
