// booth-client/tests/common/mod.rs
// Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use booth_client::config::RetryConfig;
use booth_client::{AttendeeForm, BoothConfig, Session, TermsAgreement};
use booth_store::{
    CasOutcome, MemoryDatabase, RealtimeDatabase, StoreError, StoreResult, Value, Watch,
};

/// Config with a fast retry policy for tests
pub fn test_config(max_capacity: i64, slots: &[&str]) -> BoothConfig {
    BoothConfig {
        max_capacity,
        slots: slots.iter().map(|s| s.to_string()).collect(),
        retry: RetryConfig {
            max_attempts: 500,
            base_delay_ms: 1,
            max_delay_ms: 4,
        },
        ..BoothConfig::default()
    }
}

pub fn session_on(db: Arc<dyn RealtimeDatabase>, config: BoothConfig) -> Session {
    Session::with_database(config, db)
}

pub fn accepted_terms() -> TermsAgreement {
    let mut terms = TermsAgreement::standard();
    terms.set_all(true);
    terms
}

pub fn attendee(student_id: &str, party_size: i64) -> AttendeeForm {
    AttendeeForm::new(
        student_id,
        "Kim",
        "010-1234-5678",
        "kim@school.ac.kr",
        party_size,
    )
}

/// In-memory database with switchable failures
#[derive(Default)]
pub struct FlakyDatabase {
    pub inner: MemoryDatabase,
    /// `query_equal` errors
    pub fail_queries: AtomicBool,
    /// plain `write` errors
    pub fail_writes: AtomicBool,
    /// every compare-and-swap loses without anything changing
    pub contend_swaps: AtomicBool,
    /// compare-and-swap calls seen
    pub swaps: AtomicUsize,
}

impl FlakyDatabase {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(flag: &AtomicBool, on: bool) {
        flag.store(on, Ordering::SeqCst);
    }

    pub fn swap_count(&self) -> usize {
        self.swaps.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RealtimeDatabase for FlakyDatabase {
    async fn get(&self, path: &str) -> StoreResult<Option<Value>> {
        self.inner.get(path).await
    }

    async fn children(&self, path: &str) -> StoreResult<Vec<(String, Value)>> {
        self.inner.children(path).await
    }

    async fn query_equal(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<(String, Value)>> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("query channel down".to_string()));
        }
        self.inner.query_equal(collection, field, value).await
    }

    async fn write(&self, path: &str, value: Value) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write rejected".to_string()));
        }
        self.inner.write(path, value).await
    }

    async fn compare_and_swap(
        &self,
        path: &str,
        expected: Option<&Value>,
        new: Value,
    ) -> StoreResult<CasOutcome> {
        self.swaps.fetch_add(1, Ordering::SeqCst);
        if self.contend_swaps.load(Ordering::SeqCst) {
            return Ok(CasOutcome::Conflict {
                current: self.inner.get(path).await?,
            });
        }
        self.inner.compare_and_swap(path, expected, new).await
    }

    fn subscribe(&self) -> Watch {
        self.inner.subscribe()
    }
}
