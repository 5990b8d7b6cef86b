//! Data models
//!
//! Records stored in the realtime database. Field names are camelCase on the
//! wire so records written by other clients stay readable.

pub mod account;
pub mod reservation;
pub mod slot;

// Re-exports
pub use account::*;
pub use reservation::*;
pub use slot::*;
