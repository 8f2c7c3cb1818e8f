//! InMemoryStatusStore - テスト用の履歴ストア
//!
//! # 実装詳細
//! - 挿入順の `Vec<StoredRecord>` を tokio の Mutex で保護
//! - ロックは 1 操作の間だけ保持する（recorder の read → delete → insert は
//!   アトミックではない。本番ストアと同じ競合を再現するため）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{RecordId, StatusRecord, StoreError, StoredRecord};
use crate::ports::{IdGenerator, StatusStore, SystemClock, UlidGenerator};

pub struct InMemoryStatusStore {
    records: Mutex<Vec<StoredRecord>>,
    ids: Box<dyn IdGenerator>,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        Self::with_id_generator(UlidGenerator::new(SystemClock))
    }

    pub fn with_id_generator(ids: impl IdGenerator + 'static) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            ids: Box::new(ids),
        }
    }

    /// Snapshot of every record in insertion order.
    pub async fn records(&self) -> Vec<StoredRecord> {
        self.records.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

impl Default for InMemoryStatusStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatusStore for InMemoryStatusStore {
    async fn most_recent(&self) -> Result<Option<StoredRecord>, StoreError> {
        let records = self.records.lock().await;
        // max_by_key は同値なら最後の要素を返す = 後から挿入された方
        Ok(records.iter().max_by_key(|r| r.time()).cloned())
    }

    async fn delete(&self, id: RecordId) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        let Some(pos) = records.iter().position(|r| r.id == id) else {
            return Err(StoreError::NotFound(id));
        };
        records.remove(pos);
        Ok(())
    }

    async fn insert(&self, record: StatusRecord) -> Result<RecordId, StoreError> {
        let id = self.ids.generate_record_id();
        self.records
            .lock()
            .await
            .push(StoredRecord::new(id, record));
        Ok(id)
    }

    async fn query_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        let records = self.records.lock().await;
        let mut hits: Vec<StoredRecord> = records
            .iter()
            .filter(|r| from <= r.time() && r.time() <= to)
            .cloned()
            .collect();
        hits.sort_by_key(|r| r.time());
        Ok(hits)
    }
}
