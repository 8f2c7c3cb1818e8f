//! vigil-core
//!
//! Status history and monthly uptime for a single compute instance.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, status, record, compaction, month, uptime, errors）
//! - **ports**: 抽象化レイヤー（StatusStore, InstanceControl, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（recorder, aggregator, launcher, poll）
//! - **impls**: 実装（InMemory / File ストア、gcloud / simulated Instance Control）
//! - **config**: 明示的に渡す設定値

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{Launcher, PollPolicy, StatusRecorder, UptimeAggregator};
pub use config::{Config, InstanceTarget};
pub use domain::{InstanceStatus, StatusRecord, StoredRecord, Uptime, VigilError, YearMonth};
