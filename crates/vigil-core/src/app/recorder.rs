//! StatusRecorder - 観測したステータスを履歴に追記する
//!
//! # フロー
//! 1. ストアから最新レコードを 1 件取得（空なら「どのステータスとも等しくない」扱い）
//! 2. CompactionRule が真なら直前のレコードを削除（失敗してもログのみ）
//! 3. 観測時刻とステータスで新しいレコードを挿入
//!
//! read → delete → insert はアトミックではない。並行する recorder が同じ
//! 直前レコードを削除しようとした場合、片方は NotFound になるが無視される。

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::domain::{CompactionRule, InstanceStatus, StatusRecord, StoredRecord, VigilError};
use crate::ports::{Clock, StatusStore};

pub struct StatusRecorder<S, C> {
    store: S,
    clock: C,
    rule: CompactionRule,
}

impl<S: StatusStore, C: Clock> StatusRecorder<S, C> {
    /// Recorder with the default rule (only `TERMINATED` compacts).
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            rule: CompactionRule::default(),
        }
    }

    pub fn with_compaction(mut self, rule: CompactionRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record `observed` as seen now.
    pub async fn record(
        &self,
        observed: impl Into<InstanceStatus>,
    ) -> Result<StoredRecord, VigilError> {
        let observed_at = self.clock.now();
        self.record_at(observed, observed_at).await
    }

    /// Record `observed` as seen at `observed_at`.
    ///
    /// Lookup and insert failures are returned; a failed compaction delete is
    /// only logged.
    pub async fn record_at(
        &self,
        observed: impl Into<InstanceStatus>,
        observed_at: DateTime<Utc>,
    ) -> Result<StoredRecord, VigilError> {
        let observed = observed.into();
        let previous = self.store.most_recent().await?;

        if let Some(prev) = previous
            .as_ref()
            .filter(|prev| self.rule.should_compact(Some(prev.status()), &observed))
        {
            match self.store.delete(prev.id).await {
                Ok(()) => debug!(id = %prev.id, status = %observed, "compacted previous record"),
                Err(e) => warn!(
                    id = %prev.id,
                    status = %observed,
                    error = %e,
                    "failed to delete continuous status record"
                ),
            }
        }

        let record = StatusRecord::new(observed_at, observed);
        let id = self.store.insert(record.clone()).await?;
        info!(%id, status = %record.status, time = %record.time, "recorded status");

        Ok(StoredRecord::new(id, record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::FlakyStore;
    use crate::domain::{RecordId, StoreError};
    use crate::ports::FixedClock;
    use chrono::{TimeDelta, TimeZone};
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use ulid::Ulid;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap()
    }

    fn recorder(store: &Arc<FlakyStore>) -> (StatusRecorder<Arc<FlakyStore>, FixedClock>, FixedClock) {
        let clock = FixedClock::new(start());
        (StatusRecorder::new(Arc::clone(store), clock.clone()), clock)
    }

    async fn statuses(store: &FlakyStore) -> Vec<String> {
        store
            .inner
            .query_range(start() - TimeDelta::days(1), start() + TimeDelta::days(365))
            .await
            .unwrap()
            .iter()
            .map(|r| r.status().to_string())
            .collect()
    }

    #[tokio::test]
    async fn first_record_inserts_without_delete() {
        let store = FlakyStore::shared();
        let (recorder, _) = recorder(&store);

        let stored = recorder.record("RUNNING").await.unwrap();

        assert_eq!(store.inner.len().await, 1);
        assert_eq!(store.deletes(), 0);
        assert_eq!(stored.time(), start());
        assert!(stored.status().is_running());
    }

    #[tokio::test]
    async fn consecutive_terminated_keeps_only_the_latest() {
        let store = FlakyStore::shared();
        let (recorder, clock) = recorder(&store);

        recorder.record("RUNNING").await.unwrap();
        for _ in 0..5 {
            clock.advance(TimeDelta::minutes(1));
            recorder.record("TERMINATED").await.unwrap();
        }

        assert_eq!(statuses(&store).await, vec!["RUNNING", "TERMINATED"]);
        assert_eq!(store.deletes(), 4);

        let latest = store.inner.most_recent().await.unwrap().unwrap();
        assert_eq!(latest.time(), start() + TimeDelta::minutes(5));
    }

    #[tokio::test]
    async fn status_change_after_terminated_keeps_both() {
        let store = FlakyStore::shared();
        let (recorder, clock) = recorder(&store);

        recorder.record("TERMINATED").await.unwrap();
        clock.advance(TimeDelta::minutes(1));
        recorder.record("RUNNING").await.unwrap();

        assert_eq!(statuses(&store).await, vec!["TERMINATED", "RUNNING"]);
        assert_eq!(store.deletes(), 0);
    }

    #[tokio::test]
    async fn repeated_running_is_not_compacted() {
        let store = FlakyStore::shared();
        let (recorder, clock) = recorder(&store);

        for _ in 0..3 {
            recorder.record("RUNNING").await.unwrap();
            clock.advance(TimeDelta::minutes(1));
        }

        assert_eq!(statuses(&store).await.len(), 3);
        assert_eq!(store.deletes(), 0);
    }

    #[tokio::test]
    async fn mixed_sequence_never_stores_adjacent_terminated() {
        let store = FlakyStore::shared();
        let (recorder, clock) = recorder(&store);
        let sequence = [
            "TERMINATED", "TERMINATED", "RUNNING", "RUNNING", "STOPPING", "TERMINATED",
            "TERMINATED", "TERMINATED", "PROVISIONING", "RUNNING", "TERMINATED",
        ];

        for status in sequence {
            recorder.record(status).await.unwrap();
            clock.advance(TimeDelta::minutes(1));
        }

        let stored = statuses(&store).await;
        assert!(
            stored
                .windows(2)
                .all(|w| !(w[0] == "TERMINATED" && w[1] == "TERMINATED")),
            "adjacent TERMINATED in {stored:?}"
        );
        assert_eq!(
            stored,
            vec![
                "TERMINATED", "RUNNING", "RUNNING", "STOPPING", "TERMINATED",
                "PROVISIONING", "RUNNING", "TERMINATED",
            ]
        );
    }

    #[tokio::test]
    async fn custom_rule_compacts_other_idle_states() {
        let store = FlakyStore::shared();
        let (recorder, _) = recorder(&store);
        let recorder = recorder.with_compaction(CompactionRule::default().with_status("SUSPENDED"));

        recorder.record("SUSPENDED").await.unwrap();
        recorder.record("SUSPENDED").await.unwrap();

        assert_eq!(statuses(&store).await, vec!["SUSPENDED"]);
    }

    #[tokio::test]
    async fn record_at_uses_the_observation_time() {
        let store = FlakyStore::shared();
        let (recorder, _) = recorder(&store);
        let observed_at = start() - TimeDelta::seconds(30);

        let stored = recorder.record_at("RUNNING", observed_at).await.unwrap();

        assert_eq!(stored.time(), observed_at);
        assert_eq!(store.inner.records().await[0].time(), observed_at);
    }

    #[tokio::test]
    async fn delete_failure_does_not_block_insert() {
        let store = FlakyStore::shared();
        let (recorder, _) = recorder(&store);
        recorder.record("TERMINATED").await.unwrap();

        store.fail_delete.store(true, Ordering::SeqCst);
        recorder.record("TERMINATED").await.unwrap();

        assert_eq!(store.deletes(), 1);
        assert_eq!(store.inner.len().await, 2);
    }

    #[tokio::test]
    async fn lookup_failure_aborts_without_insert() {
        let store = FlakyStore::shared();
        let (recorder, _) = recorder(&store);
        store.fail_most_recent.store(true, Ordering::SeqCst);

        let err = recorder.record("RUNNING").await.unwrap_err();

        assert!(matches!(err, VigilError::Store(StoreError::Unavailable(_))));
        assert!(store.inner.is_empty().await);
    }

    #[tokio::test]
    async fn insert_failure_is_returned() {
        let store = FlakyStore::shared();
        let (recorder, _) = recorder(&store);
        store.fail_insert.store(true, Ordering::SeqCst);

        let err = recorder.record("RUNNING").await.unwrap_err();
        assert!(matches!(err, VigilError::Store(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn stale_previous_already_deleted_is_not_fatal() {
        let store = FlakyStore::shared();
        let (recorder, _) = recorder(&store);
        // Another recorder already deleted this record.
        *store.stale_previous.lock().unwrap() = Some(StoredRecord::new(
            RecordId::from_ulid(Ulid::new()),
            StatusRecord::new(start() - TimeDelta::minutes(1), "TERMINATED"),
        ));

        let stored = recorder.record("TERMINATED").await.unwrap();

        assert_eq!(store.deletes(), 1);
        assert_eq!(store.inner.records().await, vec![stored]);
    }

    #[tokio::test]
    async fn concurrent_terminated_recordings_both_succeed() {
        let store = FlakyStore::shared();
        let (recorder, clock) = recorder(&store);
        recorder.record("TERMINATED").await.unwrap();
        clock.advance(TimeDelta::minutes(1));

        let (a, b) = tokio::join!(recorder.record("TERMINATED"), recorder.record("TERMINATED"));

        assert!(a.is_ok());
        assert!(b.is_ok());
        let stored = statuses(&store).await;
        assert!(!stored.is_empty() && stored.len() <= 2);
        assert!(stored.iter().all(|s| s == "TERMINATED"));
    }
}
