//! UptimeAggregator - 月ごとの稼働時間集計
//!
//! recorder は外部スケジューラから 1 分に 1 回呼ばれる前提なので、
//! 月内の `RUNNING` レコード数 = 稼働分数 とみなす。
//! レコード間の時間差は計算しない。

use chrono::TimeZone;
use tracing::info;

use crate::domain::{Uptime, VigilError, YearMonth};
use crate::ports::{Clock, StatusStore};

pub struct UptimeAggregator<S, Tz> {
    store: S,
    tz: Tz,
}

impl<S: StatusStore, Tz: TimeZone + Send + Sync> UptimeAggregator<S, Tz> {
    /// `tz` decides where month boundaries fall.
    pub fn new(store: S, tz: Tz) -> Self {
        Self { store, tz }
    }

    /// The calendar month `clock` is currently in.
    pub fn current_month(&self, clock: &impl Clock) -> YearMonth {
        YearMonth::containing(clock.now(), &self.tz)
    }

    pub async fn uptime(&self, month: YearMonth) -> Result<Uptime, VigilError> {
        let range = month.range_in(&self.tz)?;
        info!(%month, from = %range.from, to = %range.to, "calculating uptime");

        let records = self.store.query_range(range.from, range.to).await?;
        let running = records.iter().filter(|r| r.status().is_running()).count();

        Ok(Uptime {
            month,
            samples: records.len() as u64,
            running_minutes: running as u64,
        })
    }

    /// Like [`uptime`](Self::uptime), with the month given as `YYYY-MM`.
    pub async fn uptime_for(&self, month: &str) -> Result<Uptime, VigilError> {
        let month: YearMonth = month.parse()?;
        self.uptime(month).await
    }
}
