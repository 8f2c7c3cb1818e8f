//! Test doubles shared by the app-layer tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{RecordId, StatusRecord, StoreError, StoredRecord};
use crate::impls::InMemoryStatusStore;
use crate::ports::StatusStore;

/// Wraps an in-memory store, counting deletes and injecting failures.
#[derive(Default)]
pub(crate) struct FlakyStore {
    pub inner: InMemoryStatusStore,
    pub deletes: AtomicUsize,
    pub fail_most_recent: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_insert: AtomicBool,
    pub fail_query: AtomicBool,
    /// Returned by `most_recent` instead of the real latest record.
    pub stale_previous: std::sync::Mutex<Option<StoredRecord>>,
}

impl FlakyStore {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

fn unavailable(op: &str) -> StoreError {
    StoreError::Unavailable(format!("injected {op} failure"))
}

#[async_trait]
impl StatusStore for FlakyStore {
    async fn most_recent(&self) -> Result<Option<StoredRecord>, StoreError> {
        if self.fail_most_recent.load(Ordering::SeqCst) {
            return Err(unavailable("most_recent"));
        }
        let stale = self.stale_previous.lock().unwrap().clone();
        match stale {
            Some(record) => Ok(Some(record)),
            None => self.inner.most_recent().await,
        }
    }

    async fn delete(&self, id: RecordId) -> Result<(), StoreError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(unavailable("delete"));
        }
        self.inner.delete(id).await
    }

    async fn insert(&self, record: StatusRecord) -> Result<RecordId, StoreError> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(unavailable("insert"));
        }
        self.inner.insert(record).await
    }

    async fn query_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        if self.fail_query.load(Ordering::SeqCst) {
            return Err(unavailable("query_range"));
        }
        self.inner.query_range(from, to).await
    }
}
