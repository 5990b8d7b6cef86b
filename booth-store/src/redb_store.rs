//! redb-based backend
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `entries` | full path | JSON bytes | every stored value |
//!
//! # Atomicity
//!
//! redb runs one write transaction at a time. A compare-and-swap reads,
//! compares and writes inside a single write transaction, so it cannot
//! interleave with another writer. Publishing to watchers happens under the
//! same writer lock so notifications follow commit order.
//!
//! # Blocking
//!
//! Transactions run inline on the calling task. The writer lock is held
//! across redb's commit fsync, so a write parks its tokio worker thread until
//! the commit is durable. One booth's handful of sessions stays well inside
//! that; a board shared by many concurrent sessions should move the write
//! path onto `tokio::task::spawn_blocking`.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::StoreResult;
use crate::notify::{ChangeNotifier, Watch};
use crate::{CasOutcome, RealtimeDatabase, path};

/// key = full path, value = JSON-serialized value
const ENTRIES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("entries");

/// Persistent realtime database backed by redb
#[derive(Clone)]
pub struct RedbDatabase {
    db: Arc<Database>,
    write_lock: Arc<Mutex<()>>,
    notifier: ChangeNotifier,
}

impl RedbDatabase {
    /// Open or create the database file at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                crate::StoreError::Unavailable(format!("{}: {e}", parent.display()))
            })?;
        }
        let db = Database::create(path)?;
        info!(path = %path.display(), "Opened redb store");
        Self::init(db)
    }

    /// Open a database that lives only in memory
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StoreResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ENTRIES_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
            notifier: ChangeNotifier::new(),
        })
    }

    fn read_current(txn: &WriteTransaction, path: &str) -> StoreResult<Option<Value>> {
        let table = txn.open_table(ENTRIES_TABLE)?;
        let current = table
            .get(path)?
            .map(|guard| serde_json::from_slice::<Value>(guard.value()))
            .transpose()?;
        Ok(current)
    }

    fn store(txn: &WriteTransaction, path: &str, value: &Value) -> StoreResult<Option<Value>> {
        let mut table = txn.open_table(ENTRIES_TABLE)?;
        if value.is_null() {
            table.remove(path)?;
            Ok(None)
        } else {
            let bytes = serde_json::to_vec(value)?;
            table.insert(path, bytes.as_slice())?;
            Ok(Some(value.clone()))
        }
    }
}

#[async_trait]
impl RealtimeDatabase for RedbDatabase {
    async fn get(&self, path: &str) -> StoreResult<Option<Value>> {
        let path = path::normalize(path)?;
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTRIES_TABLE)?;
        let value = table
            .get(path.as_str())?
            .map(|guard| serde_json::from_slice::<Value>(guard.value()))
            .transpose()?;
        Ok(value)
    }

    async fn children(&self, path: &str) -> StoreResult<Vec<(String, Value)>> {
        let parent = path::normalize(path)?;
        // '0' sorts right after '/', so this range covers exactly "{parent}/..."
        let start = format!("{parent}/");
        let end = format!("{parent}0");

        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENTRIES_TABLE)?;
        let mut children = Vec::new();
        for entry in table.range(start.as_str()..end.as_str())? {
            let (key, value) = entry?;
            if let Some(child) = path::direct_child(&parent, key.value()) {
                children.push((child.to_string(), serde_json::from_slice(value.value())?));
            }
        }
        Ok(children)
    }

    async fn write(&self, path: &str, value: Value) -> StoreResult<()> {
        let path = path::normalize(path)?;
        let _writer = self.write_lock.lock();
        let txn = self.db.begin_write()?;
        let stored = Self::store(&txn, &path, &value)?;
        txn.commit()?;
        self.notifier.publish(&path, stored);
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        path: &str,
        expected: Option<&Value>,
        new: Value,
    ) -> StoreResult<CasOutcome> {
        let path = path::normalize(path)?;
        let _writer = self.write_lock.lock();
        let txn = self.db.begin_write()?;

        let current = Self::read_current(&txn, &path)?;
        if current.as_ref() != expected {
            txn.abort()?;
            debug!(path = %path, "Compare-and-swap conflict");
            return Ok(CasOutcome::Conflict { current });
        }

        let stored = Self::store(&txn, &path, &new)?;
        txn.commit()?;
        self.notifier.publish(&path, stored);
        Ok(CasOutcome::Swapped)
    }

    fn subscribe(&self) -> Watch {
        self.notifier.subscribe()
    }
}
