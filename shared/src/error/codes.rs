//! Unified error codes for the booth workspace
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Account errors
//! - 4xxx: Reservation errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and a stable wire format for stored error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Account ====================
    /// Reserve id / student id pair does not match
    InvalidCredentials = 1002,
    /// Reserve id does not exist
    AccountNotFound = 1003,
    /// Student id (used as password) is too short
    StudentIdTooShort = 1004,

    // ==================== 4xxx: Reservation ====================
    /// Slot has no seats left for the requested party
    SlotFull = 4001,
    /// Student already holds a reservation
    DuplicateReservation = 4002,
    /// A submission from this session is still in flight
    SubmissionInFlight = 4003,
    /// Required terms were not agreed
    TermsNotAccepted = 4004,
    /// Seat was consumed but the reservation record was not written
    RecordWriteFailed = 4005,
    /// Slot is not offered by the booth
    SlotNotFound = 4006,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Configuration document could not be loaded
    ConfigUnavailable = 9002,
    /// Database error
    DatabaseError = 9003,
    /// Duplicate check query failed
    QueryFailed = 9004,
    /// Atomic capacity update failed
    LedgerUpdateFailed = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Whether the user may simply try the same action again
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::QueryFailed
                | ErrorCode::LedgerUpdateFailed
                | ErrorCode::DatabaseError
                | ErrorCode::SubmissionInFlight
        )
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::RequiredField => "Required field is missing",

            // Account
            ErrorCode::InvalidCredentials => "Student id does not match",
            ErrorCode::AccountNotFound => "Reserve id does not exist",
            ErrorCode::StudentIdTooShort => "Student id must be at least 4 characters",

            // Reservation
            ErrorCode::SlotFull => "Slot is full",
            ErrorCode::DuplicateReservation => "A reservation already exists for this student id",
            ErrorCode::SubmissionInFlight => "A submission is already in progress",
            ErrorCode::TermsNotAccepted => "All required terms must be agreed",
            ErrorCode::RecordWriteFailed => {
                "Reservation holds a seat but was not fully recorded, contact an operator"
            }
            ErrorCode::SlotNotFound => "Slot not found",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::ConfigUnavailable => "Reservation system could not be loaded",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::QueryFailed => "Reservation check failed, try again later",
            ErrorCode::LedgerUpdateFailed => "Reservation failed, try again",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            7 => Ok(ErrorCode::RequiredField),

            // Account
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::AccountNotFound),
            1004 => Ok(ErrorCode::StudentIdTooShort),

            // Reservation
            4001 => Ok(ErrorCode::SlotFull),
            4002 => Ok(ErrorCode::DuplicateReservation),
            4003 => Ok(ErrorCode::SubmissionInFlight),
            4004 => Ok(ErrorCode::TermsNotAccepted),
            4005 => Ok(ErrorCode::RecordWriteFailed),
            4006 => Ok(ErrorCode::SlotNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::ConfigUnavailable),
            9003 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::QueryFailed),
            9005 => Ok(ErrorCode::LedgerUpdateFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
