//! Reservation flow
//!
//! One submission runs these steps in order and stops at the first failure:
//!
//! ```text
//! submission lock ─▶ terms ─▶ form ─▶ Duplicate Guard ─▶ Capacity Ledger ─▶ Reservation Writer
//! ```
//!
//! Only the ledger mutates shared state before the writer. A failure before
//! the ledger leaves nothing behind; a writer failure after a committed
//! ledger update is reported as [`ReservationError::RecordWriteFailed`].

use shared::models::{ReservationRecord, is_valid_time_slot};
use shared::types::Capacity;
use shared::util::next_reservation_id;
use tracing::{error, info, instrument, warn};

use crate::audit_log;
use crate::error::{ReservationError, ReservationResult};
use crate::form::AttendeeForm;
use crate::ledger::ReserveOutcome;
use crate::session::Session;
use crate::terms::TermsAgreement;
use crate::writer::RecordKey;

/// Shown to the attendee after a successful reservation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub reservation_id: u64,
    pub record_key: RecordKey,
    pub record: ReservationRecord,
    /// Seats left in the slot right after this reservation
    pub remaining: Capacity,
}

impl Confirmation {
    pub fn notice(&self) -> String {
        format!(
            "Reservation complete! Reservation number: {}",
            self.reservation_id
        )
    }
}

pub struct ReservationFlow<'a> {
    session: &'a Session,
}

impl<'a> ReservationFlow<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Reserve `form.party_size` seats in `time_slot` of the session's booth
    #[instrument(skip_all, fields(booth_id = %self.session.booth_id(), time_slot = %time_slot))]
    pub async fn submit(
        &self,
        terms: &TermsAgreement,
        time_slot: &str,
        form: &AttendeeForm,
    ) -> ReservationResult<Confirmation> {
        let _submission = self.session.begin_submission()?;

        terms.ensure_accepted()?;
        let time_slot = time_slot.trim();
        if time_slot.is_empty() {
            return Err(ReservationError::Validation(
                "a time slot must be selected".to_string(),
            ));
        }
        if !is_valid_time_slot(time_slot) {
            warn!("Slot label is not a single path segment");
            return Err(ReservationError::SlotNotFound(time_slot.to_string()));
        }
        let config = self.session.config();
        let form = form.validated(config.max_capacity)?;
        let booth_id = config.booth_id.as_str();

        if self
            .session
            .guard()
            .has_existing_reservation(&form.student_id)
            .await?
        {
            warn!(student_id = %form.student_id, "Duplicate reservation refused");
            return Err(ReservationError::DuplicateReservation {
                student_id: form.student_id,
            });
        }

        let party_size = form.party_size;
        let remaining = match self
            .session
            .ledger()
            .try_reserve(booth_id, time_slot, party_size)
            .await?
        {
            ReserveOutcome::Committed { remaining } => remaining,
            ReserveOutcome::Rejected { remaining } => {
                return Err(ReservationError::Rejected {
                    time_slot: time_slot.to_string(),
                    remaining,
                });
            }
        };

        let reservation_id = next_reservation_id();
        let student_id = form.student_id.clone();
        let payload = form.into_reservation(reservation_id, booth_id, time_slot);

        let committed = match self.session.writer().commit(payload).await {
            Ok(committed) => committed,
            Err(source) => {
                error!(
                    reservation_id,
                    student_id = %student_id,
                    party_size,
                    error = %source,
                    "Seats taken but reservation record not written"
                );
                return Err(ReservationError::RecordWriteFailed {
                    reservation_id,
                    booth_id: booth_id.to_string(),
                    time_slot: time_slot.to_string(),
                    party_size,
                    source,
                });
            }
        };

        info!(reservation_id, remaining, "Reservation committed");
        audit_log!(
            student_id.as_str(),
            "reserve",
            format!("booth:{booth_id}/{time_slot}").as_str(),
            format!("reservation {reservation_id}, party of {party_size}").as_str()
        );

        Ok(Confirmation {
            reservation_id,
            record_key: committed.key,
            record: committed.record,
            remaining,
        })
    }
}
