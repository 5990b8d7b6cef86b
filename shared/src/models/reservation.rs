//! Reservation Model

use serde::{Deserialize, Serialize};

use crate::types::{Capacity, Timestamp};

/// Collection holding all reservation records
pub const RESERVATIONS_COLLECTION: &str = "reservations";

/// Field the duplicate check filters on
pub const STUDENT_ID_FIELD: &str = "studentId";

/// Reservation record (immutable once written)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRecord {
    /// 10-digit reservation number shown to the attendee
    pub reservation_id: u64,
    /// Uniqueness key for the duplicate check
    pub student_id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub party_size: Capacity,
    pub booth_id: String,
    pub time_slot: String,
    /// Server timestamp assigned at commit
    pub created_at: Timestamp,
}

/// Reservation payload before the server timestamp is assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationCreate {
    pub reservation_id: u64,
    pub student_id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub party_size: Capacity,
    pub booth_id: String,
    pub time_slot: String,
}

impl ReservationCreate {
    /// Stamp the payload with the commit time
    pub fn into_record(self, created_at: Timestamp) -> ReservationRecord {
        ReservationRecord {
            reservation_id: self.reservation_id,
            student_id: self.student_id,
            name: self.name,
            phone: self.phone,
            email: self.email,
            party_size: self.party_size,
            booth_id: self.booth_id,
            time_slot: self.time_slot,
            created_at,
        }
    }
}
