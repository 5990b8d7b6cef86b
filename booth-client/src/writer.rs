//! Reservation Writer
//!
//! Persists the reservation record once the ledger has committed the seats.
//! The record goes under a fresh push key in `reservations/` and is stamped
//! with the store's server time. A failure here leaves the seats consumed
//! without a record; callers report it and never retry blindly.

use std::sync::Arc;

use booth_store::{RealtimeDatabase, RealtimeDatabaseExt, path};
use shared::models::{RESERVATIONS_COLLECTION, ReservationCreate, ReservationRecord};
use tracing::instrument;

use crate::error::WriterError;

/// Push key a record is stored under
pub type RecordKey = String;

/// A record as written to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedRecord {
    pub key: RecordKey,
    pub record: ReservationRecord,
}

#[derive(Clone)]
pub struct ReservationWriter {
    db: Arc<dyn RealtimeDatabase>,
}

impl ReservationWriter {
    pub fn new(db: Arc<dyn RealtimeDatabase>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, payload), fields(reservation_id = payload.reservation_id))]
    pub async fn commit(&self, payload: ReservationCreate) -> Result<CommittedRecord, WriterError> {
        let key = self.db.push_key(RESERVATIONS_COLLECTION);
        let record_path = path::child(RESERVATIONS_COLLECTION, &key)?;
        let record = payload.into_record(self.db.server_time());

        self.db.write_as(&record_path, &record).await?;

        tracing::debug!(key = %key, "Reservation record written");
        Ok(CommittedRecord { key, record })
    }
}
