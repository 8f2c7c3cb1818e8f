//! FileStatusStore - JSON Lines ファイルによる履歴ストア
//!
//! 1 行 = 1 レコード（`{"id":"<ulid>","time":"<rfc3339>","status":"..."}`）。
//!
//! # 実装詳細
//! - insert は追記のみ
//! - delete は全体を一時ファイルに書き直して rename（途中で落ちても元ファイルは壊れない）
//! - 書き込み（append / 読み込み〜rename）は `<path>.lock` の排他ロック下で行う。
//!   本体は rename で差し替わるので、ロックは別ファイルに取る
//! - 読み込みは共有ロック
//! - 同期 IO は `spawn_blocking` で実行

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs4::fs_std::FileExt;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::{RecordId, StatusRecord, StoreError, StoredRecord};
use crate::ports::{IdGenerator, StatusStore, SystemClock, UlidGenerator};

#[derive(Clone)]
pub struct FileStatusStore {
    path: Arc<PathBuf>,
    ids: Arc<dyn IdGenerator>,
}

impl FileStatusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_id_generator(path, UlidGenerator::new(SystemClock))
    }

    pub fn with_id_generator(path: impl Into<PathBuf>, ids: impl IdGenerator + 'static) -> Self {
        Self {
            path: Arc::new(path.into()),
            ids: Arc::new(ids),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T, StoreError> + Send + 'static,
    {
        let path = Arc::clone(&self.path);
        tokio::task::spawn_blocking(move || f(&path))
            .await
            .map_err(|e| StoreError::Unavailable(format!("store task failed: {e}")))?
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// Advisory lock held until the returned handle is dropped.
fn lock(path: &Path, exclusive: bool) -> Result<File, StoreError> {
    ensure_parent(path)?;
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(lock_path(path))?;
    if exclusive {
        FileExt::lock_exclusive(&file)?;
    } else {
        FileExt::lock_shared(&file)?;
    }
    Ok(file)
}

/// `load` under a shared lock. A store that was never written is empty.
fn load_shared(path: &Path) -> Result<Vec<StoredRecord>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let _guard = lock(path, false)?;
    load(path)
}

fn load(path: &Path) -> Result<Vec<StoredRecord>, StoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| StoreError::Corrupt {
                line: idx + 1,
                source,
            })
        })
        .collect()
}

fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn append(path: &Path, record: &StoredRecord) -> Result<(), StoreError> {
    let mut line = serde_json::to_string(record).map_err(std::io::Error::from)?;
    line.push('\n');
    let _guard = lock(path, true)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())?;
    file.sync_data()?;
    Ok(())
}

/// Caller must hold the exclusive lock.
fn rewrite(path: &Path, records: &[StoredRecord]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut out = BufWriter::new(NamedTempFile::new_in(dir)?);
    for record in records {
        let line = serde_json::to_string(record).map_err(std::io::Error::from)?;
        writeln!(out, "{line}")?;
    }
    let tmp = out.into_inner().map_err(|e| e.into_error())?;
    tmp.as_file().sync_data()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl StatusStore for FileStatusStore {
    async fn most_recent(&self) -> Result<Option<StoredRecord>, StoreError> {
        self.blocking(|path| {
            let records = load_shared(path)?;
            Ok(records.into_iter().max_by_key(|r| r.time()))
        })
        .await
    }

    async fn delete(&self, id: RecordId) -> Result<(), StoreError> {
        self.blocking(move |path| {
            let _guard = lock(path, true)?;
            let mut records = load(path)?;
            let before = records.len();
            records.retain(|r| r.id != id);
            if records.len() == before {
                return Err(StoreError::NotFound(id));
            }
            rewrite(path, &records)?;
            debug!(%id, path = %path.display(), "deleted record");
            Ok(())
        })
        .await
    }

    async fn insert(&self, record: StatusRecord) -> Result<RecordId, StoreError> {
        let stored = StoredRecord::new(self.ids.generate_record_id(), record);
        self.blocking(move |path| {
            append(path, &stored)?;
            debug!(id = %stored.id, status = %stored.status(), "appended record");
            Ok(stored.id)
        })
        .await
    }

    async fn query_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        self.blocking(move |path| {
            let mut hits: Vec<StoredRecord> = load_shared(path)?
                .into_iter()
                .filter(|r| from <= r.time() && r.time() <= to)
                .collect();
            hits.sort_by_key(|r| r.time());
            Ok(hits)
        })
        .await
    }
}
