//! Booth Client - reservation core for a booth's time slots
//!
//! A [`Session`] wires the components to one realtime database:
//! - [`DuplicateGuard`]: one reservation per student id
//! - [`CapacityLedger`]: per-slot remaining seats, changed atomically
//! - [`ReservationWriter`]: persists the record after the seats are taken
//! - [`SlotBoard`]: live slot labels with the user's selection
//!
//! [`ReservationFlow`] runs a submission through them in that order.

pub mod accounts;
pub mod config;
pub mod error;
pub mod flow;
pub mod form;
pub mod guard;
pub mod ledger;
pub mod logger;
pub mod session;
pub mod slots;
pub mod terms;
pub mod writer;

pub use accounts::{AccountService, MyPage, SignupForm};
pub use config::{BoothConfig, ConfigError, StoreBackend};
pub use error::{
    AccountError, GuardError, LedgerError, ReservationError, ReservationResult, WriterError,
};
pub use flow::{Confirmation, ReservationFlow};
pub use form::AttendeeForm;
pub use guard::DuplicateGuard;
pub use ledger::{CapacityLedger, ReserveOutcome};
pub use session::{Session, SubmissionGuard};
pub use slots::{SlotBoard, derive_slot_view};
pub use terms::{Term, TermsAgreement};
pub use writer::{CommittedRecord, RecordKey, ReservationWriter};

// Re-export shared types for convenience
pub use shared::models::{ReservationRecord, SlotLabel, UserAccount};
pub use shared::ErrorCode;
