//! Compaction rule - 連続した同一ステータスの間引き
//!
//! 停止中のインスタンスをポーリングし続けると、情報量のない `TERMINATED`
//! が 1 分ごとに積み上がる。直前のレコードと新しい観測が同じ「自己圧縮可能」
//! ステータスのときだけ、直前のレコードを削除してから書き込む。
//!
//! 既定では `TERMINATED` のみ。`RUNNING` は稼働時間の集計に件数を使うため、
//! 圧縮してはいけない。

use std::collections::BTreeSet;

use super::status::InstanceStatus;

/// Which statuses replace, rather than follow, an identical previous record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactionRule {
    compactible: BTreeSet<InstanceStatus>,
}

impl CompactionRule {
    /// A rule that never compacts.
    pub fn none() -> Self {
        Self {
            compactible: BTreeSet::new(),
        }
    }

    /// Add a status that is compactible with itself.
    pub fn with_status(mut self, status: impl Into<InstanceStatus>) -> Self {
        self.compactible.insert(status.into());
        self
    }

    pub fn is_self_compactible(&self, status: &InstanceStatus) -> bool {
        self.compactible.contains(status)
    }

    /// Whether the previous record must be deleted before `observed` is written.
    ///
    /// `previous` is `None` when the store is empty.
    pub fn should_compact(
        &self,
        previous: Option<&InstanceStatus>,
        observed: &InstanceStatus,
    ) -> bool {
        match previous {
            Some(prev) => prev == observed && self.is_self_compactible(observed),
            None => false,
        }
    }
}

impl Default for CompactionRule {
    fn default() -> Self {
        Self::none().with_status(InstanceStatus::TERMINATED)
    }
}
