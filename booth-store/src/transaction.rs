//! Atomic read-modify-write on a single path
//!
//! [`update`] runs a compare-and-swap loop:
//!
//! ```text
//! read current ──▶ f(current) ──▶ Abort ──────────────▶ Aborted(current)
//!      ▲                │
//!      │                ▼ Write(v)
//!      │         compare_and_swap(current, v)
//!      │                │
//!      │     Conflict   │   Swapped
//!      └── backoff ◀────┴──────────▶ Committed(v)
//! ```
//!
//! The loop is bounded. When every attempt loses to a concurrent writer the
//! update fails closed with [`StoreError::RetriesExhausted`]; nothing is
//! written on that path.

use std::time::Duration;

use rand::Rng;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::{StoreError, StoreResult};
use crate::{CasOutcome, RealtimeDatabase};

/// What the update function wants to do with the current value
#[derive(Debug, Clone, PartialEq)]
pub enum Proposal {
    Write(Value),
    Abort,
}

/// Final result of an [`update`]
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The proposed value is stored
    Committed(Value),
    /// The update function declined; carries the latest observed value
    Aborted(Option<Value>),
}

/// Jittered exponential backoff between conflicting attempts
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_pct: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay_ms: u64, max_delay_ms: u64, jitter_pct: f64) -> Self {
        let clamped_attempts = max_attempts.max(1);
        let clamped_max_delay = max_delay_ms.max(base_delay_ms);
        let clamped_jitter = jitter_pct.clamp(0.0, 1.0);
        Self {
            max_attempts: clamped_attempts,
            base_delay_ms,
            max_delay_ms: clamped_max_delay,
            jitter_pct: clamped_jitter,
        }
    }

    /// Delay to wait after the given (zero-based) failed attempt
    pub fn next_delay(&self, attempt: usize) -> Duration {
        let exp = 2_u64.saturating_pow(attempt.min(32) as u32);
        let delay = self.base_delay_ms.saturating_mul(exp).min(self.max_delay_ms);
        let spread = (delay as f64 * self.jitter_pct) as i64;
        let jittered = if spread > 0 {
            let delta = rand::thread_rng().gen_range(-spread..=spread);
            delay.saturating_add_signed(delta)
        } else {
            delay
        };
        Duration::from_millis(jittered)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(16, 5, 250, 0.5)
    }
}

/// Atomically apply `f` to the value at `path`.
///
/// `f` may run several times; it must be a pure function of its input.
#[instrument(skip(db, policy, f), fields(max_attempts = policy.max_attempts))]
pub async fn update<D, F>(
    db: &D,
    path: &str,
    policy: &RetryPolicy,
    mut f: F,
) -> StoreResult<UpdateOutcome>
where
    D: RealtimeDatabase + ?Sized,
    F: FnMut(Option<&Value>) -> Proposal + Send,
{
    let mut current = db.get(path).await?;

    for attempt in 0..policy.max_attempts {
        let proposed = match f(current.as_ref()) {
            Proposal::Abort => return Ok(UpdateOutcome::Aborted(current)),
            Proposal::Write(value) => value,
        };

        match db
            .compare_and_swap(path, current.as_ref(), proposed.clone())
            .await?
        {
            CasOutcome::Swapped => {
                debug!(attempt, "Update committed");
                return Ok(UpdateOutcome::Committed(proposed));
            }
            CasOutcome::Conflict { current: latest } => {
                debug!(attempt, "Concurrent write detected, retrying");
                current = latest;
                if attempt + 1 < policy.max_attempts {
                    tokio::time::sleep(policy.next_delay(attempt)).await;
                }
            }
        }
    }

    warn!(attempts = policy.max_attempts, "Update retries exhausted");
    Err(StoreError::RetriesExhausted {
        path: path.to_string(),
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryDatabase;
    use crate::notify::Watch;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn decrement_by(n: i64) -> impl FnMut(Option<&Value>) -> Proposal + Send {
        move |current| {
            let remaining = current.and_then(Value::as_i64).unwrap_or(10);
            if remaining - n >= 0 {
                Proposal::Write(json!(remaining - n))
            } else {
                Proposal::Abort
            }
        }
    }

    #[test]
    fn test_next_delay_is_capped() {
        let policy = RetryPolicy::new(5, 10, 100, 0.0);
        assert_eq!(policy.next_delay(0), Duration::from_millis(10));
        assert_eq!(policy.next_delay(1), Duration::from_millis(20));
        assert_eq!(policy.next_delay(3), Duration::from_millis(80));
        assert_eq!(policy.next_delay(10), Duration::from_millis(100));
        assert_eq!(policy.next_delay(usize::MAX), Duration::from_millis(100));
    }

    #[test]
    fn test_jitter_stays_within_spread() {
        let policy = RetryPolicy::new(5, 100, 100, 0.5);
        for _ in 0..100 {
            let delay = policy.next_delay(0).as_millis();
            assert!((50..=150).contains(&delay), "delay {delay}");
        }
    }

    #[tokio::test]
    async fn test_update_commits_against_absent_value() {
        let db = MemoryDatabase::new();
        let outcome = update(&db, "s/10:00", &RetryPolicy::default(), decrement_by(3))
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Committed(json!(7)));
        assert_eq!(db.get("s/10:00").await.unwrap(), Some(json!(7)));
    }

    #[tokio::test]
    async fn test_update_abort_leaves_value() {
        let db = MemoryDatabase::new();
        db.write("s/10:00", json!(2)).await.unwrap();
        let outcome = update(&db, "s/10:00", &RetryPolicy::default(), decrement_by(3))
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Aborted(Some(json!(2))));
        assert_eq!(db.get("s/10:00").await.unwrap(), Some(json!(2)));
    }

    /// Every swap loses to a phantom writer that bumps the value first.
    struct AlwaysContended {
        inner: MemoryDatabase,
        swaps: AtomicUsize,
    }

    #[async_trait]
    impl RealtimeDatabase for AlwaysContended {
        async fn get(&self, path: &str) -> StoreResult<Option<Value>> {
            self.inner.get(path).await
        }

        async fn children(&self, path: &str) -> StoreResult<Vec<(String, Value)>> {
            self.inner.children(path).await
        }

        async fn write(&self, path: &str, value: Value) -> StoreResult<()> {
            self.inner.write(path, value).await
        }

        async fn compare_and_swap(
            &self,
            path: &str,
            _expected: Option<&Value>,
            _new: Value,
        ) -> StoreResult<CasOutcome> {
            let n = self.swaps.fetch_add(1, Ordering::SeqCst) as i64;
            self.inner.write(path, json!(100 + n)).await?;
            Ok(CasOutcome::Conflict {
                current: Some(json!(100 + n)),
            })
        }

        fn subscribe(&self) -> Watch {
            self.inner.subscribe()
        }
    }

    #[tokio::test]
    async fn test_update_fails_closed_after_retries() {
        let db = AlwaysContended {
            inner: MemoryDatabase::new(),
            swaps: AtomicUsize::new(0),
        };
        let policy = RetryPolicy::new(4, 1, 2, 0.0);

        let err = update(&db, "s/10:00", &policy, decrement_by(1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::RetriesExhausted { attempts: 4, .. }
        ));
        assert_eq!(db.swaps.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_serialize() {
        let db = std::sync::Arc::new(MemoryDatabase::new());
        let policy = RetryPolicy::new(200, 1, 5, 0.5);

        let mut handles = Vec::new();
        for _ in 0..10 {
            let db = db.clone();
            let policy = policy.clone();
            handles.push(tokio::spawn(async move {
                update(db.as_ref(), "s/10:00", &policy, decrement_by(1)).await
            }));
        }

        let mut committed = 0;
        for handle in handles {
            if let Ok(UpdateOutcome::Committed(_)) = handle.await.unwrap() {
                committed += 1;
            }
        }

        assert_eq!(committed, 10);
        assert_eq!(db.get("s/10:00").await.unwrap(), Some(json!(0)));
    }
}
