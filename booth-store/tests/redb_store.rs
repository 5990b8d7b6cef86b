// booth-store/tests/redb_store.rs
// redb backend integration tests

use std::sync::Arc;

use booth_store::transaction::{self, Proposal, RetryPolicy, UpdateOutcome};
use booth_store::{RealtimeDatabase, RealtimeDatabaseExt, RedbDatabase, Value, WatchEvent};
use serde_json::json;
use tempfile::TempDir;

#[tokio::test]
async fn test_values_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("store").join("booth.redb");

    {
        let db = RedbDatabase::open(&db_path).unwrap();
        db.write("booths/CR1/slots/10:00", json!(4)).await.unwrap();
        db.write_as("users/ABCD1234", &json!({"name": "Kim"}))
            .await
            .unwrap();
    }

    let db = RedbDatabase::open(&db_path).unwrap();
    assert_eq!(
        db.get("booths/CR1/slots/10:00").await.unwrap(),
        Some(json!(4))
    );
    let user: Option<Value> = db.get_as("users/ABCD1234").await.unwrap();
    assert_eq!(user, Some(json!({"name": "Kim"})));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_decrements_never_oversell() {
    let temp_dir = TempDir::new().unwrap();
    let db = Arc::new(RedbDatabase::open(temp_dir.path().join("booth.redb")).unwrap());
    let policy = RetryPolicy::new(500, 1, 4, 0.5);
    let path = "booths/CR1/slots/10:00";

    // 12 clients asking for 3 seats each against 10 seats
    let mut handles = Vec::new();
    for _ in 0..12 {
        let db = db.clone();
        let policy = policy.clone();
        handles.push(tokio::spawn(async move {
            transaction::update(db.as_ref(), path, &policy, |current| {
                let remaining = current.and_then(Value::as_i64).unwrap_or(10);
                if remaining >= 3 {
                    Proposal::Write(json!(remaining - 3))
                } else {
                    Proposal::Abort
                }
            })
            .await
        }));
    }

    let mut committed = 0;
    let mut aborted = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            UpdateOutcome::Committed(_) => committed += 1,
            UpdateOutcome::Aborted(_) => aborted += 1,
        }
    }

    assert_eq!(committed, 3);
    assert_eq!(aborted, 9);
    assert_eq!(db.get(path).await.unwrap(), Some(json!(1)));
}

#[tokio::test]
async fn test_watch_receives_commits_in_order() {
    let db = RedbDatabase::open_in_memory().unwrap();
    let mut watch = db.subscribe().scoped("booths/CR1/slots");

    db.write("booths/CR1/slots/10:00", json!(10)).await.unwrap();
    db.compare_and_swap("booths/CR1/slots/10:00", Some(&json!(10)), json!(6))
        .await
        .unwrap();

    let mut seen = Vec::new();
    for _ in 0..2 {
        match watch.next().await {
            Some(WatchEvent::Changed(change)) => seen.push(change.value),
            other => panic!("unexpected event: {other:?}"),
        }
    }
    assert_eq!(seen, vec![Some(json!(10)), Some(json!(6))]);
}
