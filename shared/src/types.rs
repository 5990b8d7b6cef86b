//! Common types for the shared crate

/// Timestamp type (Unix milliseconds)
pub type Timestamp = i64;

/// Seats remaining in a slot
pub type Capacity = i64;

/// Default slot capacity when the config document does not set `maxCapacity`
pub const DEFAULT_MAX_CAPACITY: Capacity = 10;

/// Default booth identifier
pub const DEFAULT_BOOTH_ID: &str = "CR1";
