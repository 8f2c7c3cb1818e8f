//! App - アプリケーション層
//!
//! ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **StatusRecorder**: ステータスの記録と連続 TERMINATED の圧縮
//! - **UptimeAggregator**: 月ごとの稼働分数の集計
//! - **Launcher**: start / stop / status / store_status
//! - **PollPolicy**: start / stop 後の完了待ち

pub mod aggregator;
pub mod launcher;
pub mod poll;
pub mod recorder;

#[cfg(test)]
pub(crate) mod testing;

pub use self::aggregator::UptimeAggregator;
pub use self::launcher::Launcher;
pub use self::poll::{PollPolicy, wait_for_status};
pub use self::recorder::StatusRecorder;
