//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryStatusStore**: テスト用の履歴ストア
//! - **FileStatusStore**: JSON Lines ファイルの履歴ストア
//! - **GcloudInstanceControl**: gcloud CLI 経由の Instance Control
//! - **SimulatedInstanceControl**: メモリ上の Instance Control

pub mod file_store;
pub mod gcloud;
pub mod inmem_store;
pub mod simulated_control;

pub use self::file_store::FileStatusStore;
pub use self::gcloud::GcloudInstanceControl;
pub use self::inmem_store::InMemoryStatusStore;
pub use self::simulated_control::SimulatedInstanceControl;
