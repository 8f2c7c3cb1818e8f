//! SimulatedInstanceControl - メモリ上のインスタンス
//!
//! 起動・停止の遷移を 1 段だけ挟めるようにしてあり、
//! wait ループのテストに使う（`start` → `PROVISIONING` → `RUNNING` など）。

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::domain::{ControlError, InstanceStatus};
use crate::ports::{InstanceControl, InstanceSnapshot, Operation};

struct SimulatedState {
    status: InstanceStatus,
    /// Statuses reported by the next `get_status` calls before settling.
    pending: VecDeque<InstanceStatus>,
    external_address: String,
    operations: Vec<Operation>,
}

#[derive(Clone)]
pub struct SimulatedInstanceControl {
    state: Arc<Mutex<SimulatedState>>,
    transitional_polls: usize,
}

impl SimulatedInstanceControl {
    pub fn new(status: impl Into<InstanceStatus>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimulatedState {
                status: status.into(),
                pending: VecDeque::new(),
                external_address: String::new(),
                operations: Vec::new(),
            })),
            transitional_polls: 0,
        }
    }

    /// Report a transitional status for `polls` reads after each operation.
    pub fn with_transitional_polls(mut self, polls: usize) -> Self {
        self.transitional_polls = polls;
        self
    }

    pub async fn set_status(&self, status: impl Into<InstanceStatus>) {
        let mut state = self.state.lock().await;
        state.status = status.into();
        state.pending.clear();
    }

    pub async fn operations(&self) -> Vec<Operation> {
        self.state.lock().await.operations.clone()
    }
}

fn transitional_status(op: Operation) -> InstanceStatus {
    match op {
        Operation::Start => InstanceStatus::new("PROVISIONING"),
        Operation::Stop => InstanceStatus::new("STOPPING"),
    }
}

#[async_trait]
impl InstanceControl for SimulatedInstanceControl {
    async fn get_status(&self) -> Result<InstanceSnapshot, ControlError> {
        let mut state = self.state.lock().await;
        let status = match state.pending.pop_front() {
            Some(status) => status,
            None => state.status.clone(),
        };
        Ok(InstanceSnapshot {
            status,
            external_address: state.external_address.clone(),
        })
    }

    async fn do_operation(&self, op: Operation) -> Result<(), ControlError> {
        info!(%op, "simulated instance operation");
        let mut state = self.state.lock().await;
        state.operations.push(op);
        state.pending = std::iter::repeat_n(transitional_status(op), self.transitional_polls)
            .collect();
        state.status = op.settled_status();
        state.external_address = match op {
            Operation::Start => "192.0.2.10".to_string(),
            Operation::Stop => String::new(),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_then_stop() {
        let control = SimulatedInstanceControl::new("TERMINATED");

        control.do_operation(Operation::Start).await.unwrap();
        let snapshot = control.get_status().await.unwrap();
        assert!(snapshot.status.is_running());
        assert!(!snapshot.external_address.is_empty());

        control.do_operation(Operation::Stop).await.unwrap();
        let snapshot = control.get_status().await.unwrap();
        assert!(snapshot.status.is_terminated());
        assert!(snapshot.external_address.is_empty());

        assert_eq!(
            control.operations().await,
            vec![Operation::Start, Operation::Stop]
        );
    }

    #[tokio::test]
    async fn transitional_statuses_come_first() {
        let control = SimulatedInstanceControl::new("TERMINATED").with_transitional_polls(2);
        control.do_operation(Operation::Start).await.unwrap();

        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(control.get_status().await.unwrap().status.to_string());
        }
        assert_eq!(seen, vec!["PROVISIONING", "PROVISIONING", "RUNNING"]);
    }
}
