//! Shared types for the booth reservation workspace
//!
//! Domain records stored in the realtime database, stable error codes,
//! and the identifier generators used by every client.

pub mod error;
pub mod models;
pub mod types;
pub mod util;

// Re-exports
pub use error::{ErrorCode, InvalidErrorCode};
pub use models::{ReservationRecord, SlotLabel, UserAccount};
pub use serde::{Deserialize, Serialize};
pub use types::Timestamp;
