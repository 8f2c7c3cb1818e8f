//! Errors - エラー型と分類
//!
//! ストア / Instance Control / 月指定 / 設定 ごとにエラー型を分け、
//! アプリケーション層では `VigilError` に集約します。
//!
//! # 分類
//! - Store / Control: 一時的な外部エラー。呼び出し元にそのまま返す（内部リトライなし）
//! - MonthParse: 引数の誤り。集計呼び出しは即座に失敗
//! - 圧縮時の delete 失敗は recorder 内でログに残して握りつぶすため、ここには現れない

use thiserror::Error;

use super::ids::RecordId;

/// StoreError はステータス履歴ストアの操作エラー
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {0} not found")]
    NotFound(RecordId),

    #[error("store io: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt record at line {line}: {source}")]
    Corrupt {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// MonthParseError は `YYYY-MM` 形式の解析エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonthParseError {
    #[error("month must be formatted as YYYY-MM, got {0:?}")]
    Format(String),

    #[error("month {0} is out of range (expected 01-12)")]
    OutOfRange(u32),
}

/// ControlError は Instance Control（gcloud 等）の呼び出しエラー
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{operation} exited with {status}: {stderr}")]
    CommandFailed {
        operation: String,
        status: String,
        stderr: String,
    },

    #[error("unexpected output from instance control: {0:?}")]
    UnexpectedOutput(String),

    #[error("{0}")]
    Other(String),
}

/// ConfigError は設定値の検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing configuration value: {0}")]
    Missing(&'static str),

    #[error("invalid utc offset {0:?} (expected Z, +HH:MM or -HH:MM)")]
    InvalidOffset(String),
}

/// VigilError はアプリケーション層のエラー
#[derive(Debug, Error)]
pub enum VigilError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Control(#[from] ControlError),

    #[error(transparent)]
    InvalidMonth(#[from] MonthParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("start of month {0} does not exist in the reference time zone")]
    InvalidMonthStart(String),

    #[error("instance did not reach the expected status after {attempts} polls (last: {last})")]
    WaitTimedOut { attempts: u32, last: String },
}
