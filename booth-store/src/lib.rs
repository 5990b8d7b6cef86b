//! # booth-store
//!
//! Realtime database collaborator for the booth reservation core.
//!
//! ## Scope
//!
//! This crate provides the four primitives the reservation core relies on:
//! - keyed reads (`get`, `children`)
//! - equality queries over a collection (`query_equal`)
//! - unconditional keyed writes plus push keys (`write`, `push_key`)
//! - an atomic read-modify-write (`transaction::update`), built as a
//!   compare-and-swap loop with bounded retries and exponential backoff
//!
//! Committed writes are pushed to live watchers through [`Watch`].
//!
//! ## Backends
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`MemoryDatabase`] | in-process, tests and demos |
//! | [`RedbDatabase`] | embedded file, survives restarts |
//!
//! ## Example
//!
//! ```ignore
//! use booth_store::{MemoryDatabase, RealtimeDatabase, transaction::{self, Proposal, RetryPolicy}};
//!
//! let db = MemoryDatabase::new();
//! let outcome = transaction::update(&db, "booths/CR1/slots/10:00", &RetryPolicy::default(), |current| {
//!     let remaining = current.and_then(|v| v.as_i64()).unwrap_or(10);
//!     if remaining >= 2 { Proposal::Write((remaining - 2).into()) } else { Proposal::Abort }
//! }).await?;
//! ```

mod error;
mod memory;
mod notify;
pub mod path;
mod redb_store;
pub mod transaction;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use shared::Timestamp;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryDatabase;
pub use notify::{Change, ChangeNotifier, Watch, WatchEvent};
pub use redb_store::RedbDatabase;
pub use serde_json::Value;

/// Result of a single compare-and-swap attempt
#[derive(Debug, Clone, PartialEq)]
pub enum CasOutcome {
    /// The expected value matched and the new value is committed
    Swapped,
    /// Another writer got there first; carries the value now stored
    Conflict { current: Option<Value> },
}

/// The hosted realtime database as seen by the reservation core.
///
/// Paths are slash-separated (`booths/CR1/slots/10:00`). Writing
/// [`Value::Null`] removes the entry, and reads never return `Null`.
#[async_trait]
pub trait RealtimeDatabase: Send + Sync {
    /// Read the value stored exactly at `path`
    async fn get(&self, path: &str) -> StoreResult<Option<Value>>;

    /// Read the direct children of `path`, ordered by key
    async fn children(&self, path: &str) -> StoreResult<Vec<(String, Value)>>;

    /// Records under `collection` whose `field` equals `value`
    async fn query_equal(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<(String, Value)>> {
        let records = self.children(collection).await?;
        Ok(records
            .into_iter()
            .filter(|(_, record)| record.get(field) == Some(value))
            .collect())
    }

    /// Unconditional keyed write
    async fn write(&self, path: &str, value: Value) -> StoreResult<()>;

    /// Compare the value at `path` with `expected` and, if equal, store `new`
    async fn compare_and_swap(
        &self,
        path: &str,
        expected: Option<&Value>,
        new: Value,
    ) -> StoreResult<CasOutcome>;

    /// Subscribe to committed changes
    fn subscribe(&self) -> Watch;

    /// Generate a fresh record key under `collection`
    fn push_key(&self, _collection: &str) -> String {
        shared::util::push_key()
    }

    /// Server-side clock (milliseconds)
    fn server_time(&self) -> Timestamp {
        shared::util::now_millis()
    }
}

/// Typed helpers over [`RealtimeDatabase`]
#[async_trait]
pub trait RealtimeDatabaseExt: RealtimeDatabase {
    /// Read and deserialize the value at `path`
    async fn get_as<T: DeserializeOwned>(&self, path: &str) -> StoreResult<Option<T>> {
        match self.get(path).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Serialize and write `data` at `path`
    async fn write_as<T: serde::Serialize + Sync>(&self, path: &str, data: &T) -> StoreResult<()> {
        let value = serde_json::to_value(data)?;
        self.write(path, value).await
    }
}

impl<D: RealtimeDatabase + ?Sized> RealtimeDatabaseExt for D {}
