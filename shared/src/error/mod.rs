//! Error codes shared by every booth crate
//!
//! - [`ErrorCode`]: stable numeric codes carried by client-side errors
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Account errors
//! - 4xxx: Reservation errors
//! - 9xxx: System errors

mod codes;

pub use codes::{ErrorCode, InvalidErrorCode};
