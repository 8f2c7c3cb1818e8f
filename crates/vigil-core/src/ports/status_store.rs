//! StatusStore port - ステータス履歴の永続化
//!
//! 1 つのインスタンスについて、時刻順に伸びていく `{time, status}` の
//! コレクションを 1 本だけ管理します。
//!
//! # 実装
//! - **InMemoryStatusStore**: テスト用
//! - **FileStatusStore**: JSON Lines ファイル（CLI 用）

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{RecordId, StatusRecord, StoreError, StoredRecord};

/// StatusStore はステータス履歴の正本
///
/// # 設計原則
/// - レコードは不変（削除は recorder の圧縮処理からのみ）
/// - `time` の一意性は要求しない
/// - 同時刻のレコードがある場合、`most_recent` は後から挿入された方を返す
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// The record with the latest `time`, or `None` on an empty store.
    async fn most_recent(&self) -> Result<Option<StoredRecord>, StoreError>;

    /// Delete one record. Deleting an unknown id yields `StoreError::NotFound`.
    async fn delete(&self, id: RecordId) -> Result<(), StoreError>;

    /// Append a record; the store assigns its identity.
    async fn insert(&self, record: StatusRecord) -> Result<RecordId, StoreError>;

    /// All records with `from <= time <= to`, ascending by `time`.
    async fn query_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredRecord>, StoreError>;
}

#[async_trait]
impl<S: StatusStore + ?Sized> StatusStore for std::sync::Arc<S> {
    async fn most_recent(&self) -> Result<Option<StoredRecord>, StoreError> {
        (**self).most_recent().await
    }

    async fn delete(&self, id: RecordId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }

    async fn insert(&self, record: StatusRecord) -> Result<RecordId, StoreError> {
        (**self).insert(record).await
    }

    async fn query_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        (**self).query_range(from, to).await
    }
}
