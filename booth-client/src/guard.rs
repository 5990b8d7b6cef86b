//! Duplicate Guard
//!
//! Answers "does this student id already hold a reservation?" with an
//! equality query over the reservation collection. The check is advisory: it
//! runs before the capacity update and is not atomic with it, so two
//! submissions for the same student id racing each other can both pass.

use std::sync::Arc;

use booth_store::{RealtimeDatabase, Value};
use shared::models::{RESERVATIONS_COLLECTION, STUDENT_ID_FIELD};
use tracing::instrument;

use crate::error::GuardError;

#[derive(Clone)]
pub struct DuplicateGuard {
    db: Arc<dyn RealtimeDatabase>,
}

impl DuplicateGuard {
    pub fn new(db: Arc<dyn RealtimeDatabase>) -> Self {
        Self { db }
    }

    /// True iff at least one reservation record carries `student_id`
    #[instrument(skip(self))]
    pub async fn has_existing_reservation(&self, student_id: &str) -> Result<bool, GuardError> {
        let matches = self
            .db
            .query_equal(
                RESERVATIONS_COLLECTION,
                STUDENT_ID_FIELD,
                &Value::String(student_id.to_string()),
            )
            .await
            .map_err(GuardError::QueryFailed)?;

        if !matches.is_empty() {
            tracing::debug!(records = matches.len(), "Existing reservation found");
        }
        Ok(!matches.is_empty())
    }
}
