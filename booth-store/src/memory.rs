//! In-process backend
//!
//! Flat `path -> value` map behind a single lock. A compare-and-swap holds
//! the write lock across compare, store and publish, so swaps on one path are
//! serialized and watchers see changes in commit order.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::error::StoreResult;
use crate::notify::{ChangeNotifier, Watch};
use crate::{CasOutcome, RealtimeDatabase, path};

/// In-memory realtime database
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    entries: RwLock<BTreeMap<String, Value>>,
    notifier: ChangeNotifier,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn store(entries: &mut BTreeMap<String, Value>, path: &str, value: Value) -> Option<Value> {
        if value.is_null() {
            entries.remove(path);
            None
        } else {
            entries.insert(path.to_string(), value.clone());
            Some(value)
        }
    }
}

#[async_trait]
impl RealtimeDatabase for MemoryDatabase {
    async fn get(&self, path: &str) -> StoreResult<Option<Value>> {
        let path = path::normalize(path)?;
        Ok(self.entries.read().get(&path).cloned())
    }

    async fn children(&self, path: &str) -> StoreResult<Vec<(String, Value)>> {
        let parent = path::normalize(path)?;
        let start = format!("{parent}/");
        let entries = self.entries.read();
        Ok(entries
            .range(start.clone()..)
            .take_while(|(key, _)| key.starts_with(&start))
            .filter_map(|(key, value)| {
                path::direct_child(&parent, key).map(|child| (child.to_string(), value.clone()))
            })
            .collect())
    }

    async fn write(&self, path: &str, value: Value) -> StoreResult<()> {
        let path = path::normalize(path)?;
        let mut entries = self.entries.write();
        let stored = Self::store(&mut entries, &path, value);
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
        let mut entries = self.entries.write();
        let current = entries.get(&path);
        if current != expected {
            return Ok(CasOutcome::Conflict {
                current: current.cloned(),
            });
        }
        let stored = Self::store(&mut entries, &path, new);
        self.notifier.publish(&path, stored);
        Ok(CasOutcome::Swapped)
    }

    fn subscribe(&self) -> Watch {
        self.notifier.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::WatchEvent;
    use serde_json::json;

    #[tokio::test]
    async fn test_write_get_and_remove() {
        let db = MemoryDatabase::new();
        db.write("booths/CR1/slots/10:00", json!(10)).await.unwrap();
        assert_eq!(db.get("booths/CR1/slots/10:00").await.unwrap(), Some(json!(10)));

        db.write("booths/CR1/slots/10:00", Value::Null).await.unwrap();
        assert_eq!(db.get("booths/CR1/slots/10:00").await.unwrap(), None);
        assert!(db.is_empty());
    }

    #[tokio::test]
    async fn test_children_are_direct_and_sorted() {
        let db = MemoryDatabase::new();
        db.write("booths/CR1/slots/11:00", json!(4)).await.unwrap();
        db.write("booths/CR1/slots/10:00", json!(10)).await.unwrap();
        db.write("booths/CR1/name", json!("Coding")).await.unwrap();
        db.write("booths/CR10/slots/10:00", json!(1)).await.unwrap();

        let slots = db.children("booths/CR1/slots").await.unwrap();
        assert_eq!(
            slots,
            vec![
                ("10:00".to_string(), json!(10)),
                ("11:00".to_string(), json!(4)),
            ]
        );

        let booth = db.children("booths/CR1").await.unwrap();
        assert_eq!(booth, vec![("name".to_string(), json!("Coding"))]);
    }

    #[tokio::test]
    async fn test_query_equal() {
        let db = MemoryDatabase::new();
        db.write("reservations/a", json!({"studentId": "S1", "partySize": 2}))
            .await
            .unwrap();
        db.write("reservations/b", json!({"studentId": "S3", "partySize": 1}))
            .await
            .unwrap();

        let hits = db
            .query_equal("reservations", "studentId", &json!("S1"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, "a");

        let misses = db
            .query_equal("reservations", "studentId", &json!("S2"))
            .await
            .unwrap();
        assert!(misses.is_empty());
    }

    #[tokio::test]
    async fn test_compare_and_swap() {
        let db = MemoryDatabase::new();
        let path = "booths/CR1/slots/10:00";

        let outcome = db.compare_and_swap(path, None, json!(7)).await.unwrap();
        assert_eq!(outcome, CasOutcome::Swapped);

        let outcome = db.compare_and_swap(path, None, json!(5)).await.unwrap();
        assert_eq!(
            outcome,
            CasOutcome::Conflict {
                current: Some(json!(7))
            }
        );
        assert_eq!(db.get(path).await.unwrap(), Some(json!(7)));

        let outcome = db
            .compare_and_swap(path, Some(&json!(7)), json!(5))
            .await
            .unwrap();
        assert_eq!(outcome, CasOutcome::Swapped);
        assert_eq!(db.get(path).await.unwrap(), Some(json!(5)));
    }

    #[tokio::test]
    async fn test_watchers_see_committed_swaps_only() {
        let db = MemoryDatabase::new();
        let mut watch = db.subscribe().scoped("booths/CR1/slots");
        let path = "booths/CR1/slots/10:00";

        db.compare_and_swap(path, Some(&json!(99)), json!(1)).await.unwrap();
        db.compare_and_swap(path, None, json!(8)).await.unwrap();

        match watch.next().await {
            Some(WatchEvent::Changed(change)) => {
                assert_eq!(change.path, path);
                assert_eq!(change.value, Some(json!(8)));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_path_is_rejected() {
        let db = MemoryDatabase::new();
        assert!(db.get("").await.is_err());
        assert!(db.write("a//b", json!(1)).await.is_err());
    }
}
