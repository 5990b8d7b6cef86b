//! Client error types
//!
//! Each component has its own error; [`ReservationError`] is what the
//! reservation flow reports to the user. Every variant maps to a stable
//! [`ErrorCode`] and a user-facing notice.

use booth_store::StoreError;
use shared::ErrorCode;
use shared::types::Capacity;
use thiserror::Error;

use crate::config::ConfigError;

/// Duplicate Guard errors
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("Duplicate check query failed: {0}")]
    QueryFailed(#[source] StoreError),
}

/// Capacity Ledger errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Party size {party_size} is outside 1..={max_capacity}")]
    InvalidPartySize {
        party_size: Capacity,
        max_capacity: Capacity,
    },

    /// Transport error or the update kept losing to concurrent writers
    #[error("Capacity update failed: {0}")]
    UpdateFailed(#[from] StoreError),

    #[error("Slot label {0:?} is not a single path segment")]
    InvalidTimeSlot(String),

    #[error("Slot counter at {path} is not an integer: {value}")]
    CorruptCounter { path: String, value: String },
}

/// Reservation Writer errors
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("Reservation record write failed: {0}")]
    WriteFailed(#[from] StoreError),
}

/// Account errors (signup, login, my page)
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Student id must be at least {min} characters")]
    StudentIdTooShort { min: usize },

    #[error("Reserve id and student id are both required")]
    MissingCredentials,

    #[error("Unknown reserve id: {0}")]
    UnknownReserveId(String),

    #[error("Student id does not match reserve id {0}")]
    StudentIdMismatch(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Account store error: {0}")]
    Store(#[from] StoreError),
}

impl AccountError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AccountError::Validation(_) => ErrorCode::ValidationFailed,
            AccountError::StudentIdTooShort { .. } => ErrorCode::StudentIdTooShort,
            AccountError::MissingCredentials => ErrorCode::RequiredField,
            AccountError::UnknownReserveId(_) => ErrorCode::AccountNotFound,
            AccountError::StudentIdMismatch(_) => ErrorCode::InvalidCredentials,
            AccountError::Hash(_) => ErrorCode::InternalError,
            AccountError::Store(_) => ErrorCode::DatabaseError,
        }
    }

    /// Notice shown on the signup and login pages
    pub fn notice(&self) -> String {
        match self {
            AccountError::Validation(msg) => format!("{}: {msg}", self.code().message()),
            AccountError::Hash(_) | AccountError::Store(_) => {
                format!("{}. Please try again.", self.code().message())
            }
            _ => self.code().message().to_string(),
        }
    }
}

/// Errors reported by the reservation flow
#[derive(Debug, Error)]
pub enum ReservationError {
    /// The session could not start; nothing else works
    #[error("Configuration unavailable: {0}")]
    ConfigUnavailable(String),

    /// Duplicate check could not run; do not proceed
    #[error(transparent)]
    QueryFailed(#[from] GuardError),

    #[error("Student {student_id} already holds a reservation")]
    DuplicateReservation { student_id: String },

    /// Not enough seats left; the counter is untouched
    #[error("Slot {time_slot} has only {remaining} seats left")]
    Rejected {
        time_slot: String,
        remaining: Capacity,
    },

    /// Nothing was written; safe to try again
    #[error(transparent)]
    LedgerUpdateFailed(LedgerError),

    /// The seat is taken but no record exists for it
    #[error(
        "Reservation {reservation_id} holds {party_size} seats in {booth_id}/{time_slot} but was not recorded: {source}"
    )]
    RecordWriteFailed {
        reservation_id: u64,
        booth_id: String,
        time_slot: String,
        party_size: Capacity,
        #[source]
        source: WriterError,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("A submission is already in progress")]
    SubmissionInFlight,

    #[error("Required terms have not been agreed")]
    TermsNotAccepted,

    #[error("Slot {0} is not offered")]
    SlotNotFound(String),
}

impl From<ConfigError> for ReservationError {
    fn from(err: ConfigError) -> Self {
        ReservationError::ConfigUnavailable(err.to_string())
    }
}

impl From<LedgerError> for ReservationError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidPartySize { .. } => ReservationError::Validation(err.to_string()),
            LedgerError::InvalidTimeSlot(time_slot) => ReservationError::SlotNotFound(time_slot),
            other => ReservationError::LedgerUpdateFailed(other),
        }
    }
}

impl ReservationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ReservationError::ConfigUnavailable(_) => ErrorCode::ConfigUnavailable,
            ReservationError::QueryFailed(_) => ErrorCode::QueryFailed,
            ReservationError::DuplicateReservation { .. } => ErrorCode::DuplicateReservation,
            ReservationError::Rejected { .. } => ErrorCode::SlotFull,
            ReservationError::LedgerUpdateFailed(_) => ErrorCode::LedgerUpdateFailed,
            ReservationError::RecordWriteFailed { .. } => ErrorCode::RecordWriteFailed,
            ReservationError::Validation(_) => ErrorCode::ValidationFailed,
            ReservationError::SubmissionInFlight => ErrorCode::SubmissionInFlight,
            ReservationError::TermsNotAccepted => ErrorCode::TermsNotAccepted,
            ReservationError::SlotNotFound(_) => ErrorCode::SlotNotFound,
        }
    }

    /// Whether the same action may simply be tried again
    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }

    /// Notice shown to the attendee
    pub fn notice(&self) -> String {
        match self {
            ReservationError::ConfigUnavailable(_) => {
                "The reservation system is unavailable. Please contact the booth staff.".to_string()
            }
            ReservationError::QueryFailed(_) | ReservationError::LedgerUpdateFailed(_) => {
                "Something went wrong while reserving. Please try again.".to_string()
            }
            ReservationError::DuplicateReservation { .. } => {
                "This student id already has a reservation.".to_string()
            }
            ReservationError::Rejected {
                time_slot,
                remaining,
            } => format!("Not enough seats in {time_slot}. Seats left: {remaining}"),
            ReservationError::RecordWriteFailed { reservation_id, .. } => format!(
                "Your seat is held but the reservation was not saved. Please contact an operator with number {reservation_id}."
            ),
            ReservationError::Validation(msg) => format!("Please check your input: {msg}"),
            ReservationError::SubmissionInFlight => {
                "Your reservation is being processed.".to_string()
            }
            ReservationError::TermsNotAccepted => {
                "Please agree to all required terms.".to_string()
            }
            ReservationError::SlotNotFound(slot) => format!("{slot} is not an available slot."),
        }
    }
}

/// Result type for reservation operations
pub type ReservationResult<T> = Result<T, ReservationError>;
