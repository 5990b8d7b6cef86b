//! Capacity Ledger
//!
//! One remaining-seats counter per (booth, slot) at
//! `booths/{boothId}/slots/{timeSlot}`. An absent counter means the slot is
//! untouched and has `max_capacity` seats.
//!
//! Counters change only through [`transaction::update`], so concurrent
//! reservations against one slot serialize: the stored value always equals
//! `max_capacity - Σ committed party sizes` and never drops below zero.

use std::sync::Arc;

use booth_store::transaction::{self, Proposal, RetryPolicy, UpdateOutcome};
use booth_store::{RealtimeDatabase, Value, Watch, path};
use shared::models::{is_valid_time_slot, slots_path};
use shared::types::Capacity;
use tracing::{info, instrument};

use crate::error::LedgerError;

/// Result of a reservation attempt against one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// Seats taken; `remaining` is the new counter value
    Committed { remaining: Capacity },
    /// Not enough seats; counter untouched, `remaining` is the latest value seen
    Rejected { remaining: Capacity },
}

impl ReserveOutcome {
    pub fn remaining(&self) -> Capacity {
        match self {
            ReserveOutcome::Committed { remaining } | ReserveOutcome::Rejected { remaining } => {
                *remaining
            }
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, ReserveOutcome::Committed { .. })
    }
}

#[derive(Clone)]
pub struct CapacityLedger {
    db: Arc<dyn RealtimeDatabase>,
    max_capacity: Capacity,
    policy: RetryPolicy,
}

impl CapacityLedger {
    pub fn new(db: Arc<dyn RealtimeDatabase>, max_capacity: Capacity, policy: RetryPolicy) -> Self {
        Self {
            db,
            max_capacity,
            policy,
        }
    }

    pub fn max_capacity(&self) -> Capacity {
        self.max_capacity
    }

    /// Atomically take `party_size` seats from a slot
    #[instrument(skip(self), fields(max_capacity = self.max_capacity))]
    pub async fn try_reserve(
        &self,
        booth_id: &str,
        time_slot: &str,
        party_size: Capacity,
    ) -> Result<ReserveOutcome, LedgerError> {
        if party_size < 1 || party_size > self.max_capacity {
            return Err(LedgerError::InvalidPartySize {
                party_size,
                max_capacity: self.max_capacity,
            });
        }

        let path = slot_path(booth_id, time_slot)?;
        let max_capacity = self.max_capacity;
        let mut observed = max_capacity;
        let mut corrupt = None;

        let outcome = transaction::update(self.db.as_ref(), &path, &self.policy, |current| {
            match decode_remaining(&path, current, max_capacity) {
                Ok(remaining) => {
                    observed = remaining;
                    let next = remaining - party_size;
                    if next >= 0 {
                        Proposal::Write(Value::from(next))
                    } else {
                        Proposal::Abort
                    }
                }
                Err(err) => {
                    corrupt = Some(err);
                    Proposal::Abort
                }
            }
        })
        .await?;

        match outcome {
            UpdateOutcome::Committed(_) => {
                let remaining = observed - party_size;
                info!(remaining, "Seats reserved");
                Ok(ReserveOutcome::Committed { remaining })
            }
            UpdateOutcome::Aborted(_) => match corrupt {
                Some(err) => Err(err),
                None => {
                    info!(remaining = observed, "Not enough seats");
                    Ok(ReserveOutcome::Rejected {
                        remaining: observed,
                    })
                }
            },
        }
    }

    /// Current remaining seats of a slot
    pub async fn remaining(&self, booth_id: &str, time_slot: &str) -> Result<Capacity, LedgerError> {
        let path = slot_path(booth_id, time_slot)?;
        let value = self.db.get(&path).await?;
        decode_remaining(&path, value.as_ref(), self.max_capacity)
    }

    /// Seed a slot with `max_capacity` if it has no counter yet.
    ///
    /// Returns the slot's remaining seats either way.
    #[instrument(skip(self))]
    pub async fn open_slot(&self, booth_id: &str, time_slot: &str) -> Result<Capacity, LedgerError> {
        let path = slot_path(booth_id, time_slot)?;
        let max_capacity = self.max_capacity;

        let outcome = transaction::update(self.db.as_ref(), &path, &self.policy, |current| {
            match current {
                None => Proposal::Write(Value::from(max_capacity)),
                Some(_) => Proposal::Abort,
            }
        })
        .await?;

        match outcome {
            UpdateOutcome::Committed(_) => {
                info!("Slot opened");
                Ok(max_capacity)
            }
            UpdateOutcome::Aborted(current) => decode_remaining(&path, current.as_ref(), max_capacity),
        }
    }

    /// Every slot with a stored counter, ordered by slot label
    pub async fn slots(&self, booth_id: &str) -> Result<Vec<(String, Capacity)>, LedgerError> {
        let path = slots_path(booth_id);
        self.db
            .children(&path)
            .await?
            .into_iter()
            .map(|(time_slot, value)| -> Result<_, LedgerError> {
                let remaining = decode_remaining(&path, Some(&value), self.max_capacity)?;
                Ok((time_slot, remaining))
            })
            .collect()
    }

    /// Stream of committed counter changes for one booth
    pub fn watch(&self, booth_id: &str) -> Watch {
        self.db.subscribe().scoped(slots_path(booth_id))
    }
}

/// Counter path of one slot. The label must be a single path segment, so
/// `10:00/` and `10:00/x` never alias or nest under another counter.
fn slot_path(booth_id: &str, time_slot: &str) -> Result<String, LedgerError> {
    if !is_valid_time_slot(time_slot) {
        return Err(LedgerError::InvalidTimeSlot(time_slot.to_string()));
    }
    path::child(&slots_path(booth_id), time_slot)
        .map_err(|_| LedgerError::InvalidTimeSlot(time_slot.to_string()))
}

/// Absent means untouched. Values above the current maximum (after the
/// maximum was lowered) are read as the maximum.
fn decode_remaining(
    path: &str,
    value: Option<&Value>,
    max_capacity: Capacity,
) -> Result<Capacity, LedgerError> {
    match value {
        None | Some(Value::Null) => Ok(max_capacity),
        Some(value) => value
            .as_i64()
            .map(|remaining| remaining.clamp(0, max_capacity))
            .ok_or_else(|| LedgerError::CorruptCounter {
                path: path.to_string(),
                value: value.to_string(),
            }),
    }
}
