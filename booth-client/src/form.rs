//! Attendee form

use serde::{Deserialize, Serialize};
use shared::models::ReservationCreate;
use shared::types::Capacity;
use validator::{Validate, ValidationErrors};

use crate::error::ReservationError;

/// Attendee details entered after the terms page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeForm {
    #[validate(length(min = 1, message = "student id is required"))]
    pub student_id: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    pub party_size: Capacity,
}

impl AttendeeForm {
    pub fn new(
        student_id: impl Into<String>,
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
        party_size: Capacity,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
            party_size,
        }
    }

    /// Copy with surrounding whitespace removed from every text field
    pub fn trimmed(&self) -> Self {
        Self {
            student_id: self.student_id.trim().to_string(),
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            party_size: self.party_size,
        }
    }

    /// Trim and validate against the booth's slot capacity
    pub fn validated(&self, max_capacity: Capacity) -> Result<Self, ReservationError> {
        let form = self.trimmed();
        form.validate().map_err(|e| ReservationError::Validation(describe(&e)))?;
        if !(1..=max_capacity).contains(&form.party_size) {
            return Err(ReservationError::Validation(format!(
                "party size must be between 1 and {max_capacity}"
            )));
        }
        Ok(form)
    }

    /// Reservation payload for a slot, before the server timestamp is set
    pub fn into_reservation(
        self,
        reservation_id: u64,
        booth_id: impl Into<String>,
        time_slot: impl Into<String>,
    ) -> ReservationCreate {
        ReservationCreate {
            reservation_id,
            student_id: self.student_id,
            name: self.name,
            phone: self.phone,
            email: self.email,
            party_size: self.party_size,
            booth_id: booth_id.into(),
            time_slot: time_slot.into(),
        }
    }
}

/// Field names with their first message, sorted for stable output
pub(crate) fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "invalid".to_string());
            format!("{field}: {message}")
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> AttendeeForm {
        AttendeeForm::new(" 20231234 ", "Kim", "010-1234-5678", "kim@school.ac.kr ", 2)
    }

    #[test]
    fn test_valid_form_is_trimmed() {
        let form = form().validated(10).unwrap();
        assert_eq!(form.student_id, "20231234");
        assert_eq!(form.email, "kim@school.ac.kr");
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        let mut blank = form();
        blank.name = "   ".to_string();
        blank.phone = String::new();

        match blank.validated(10) {
            Err(ReservationError::Validation(msg)) => {
                assert_eq!(msg, "name: name is required, phone: phone is required");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_bad_email_is_rejected() {
        let mut bad = form();
        bad.email = "not-an-email".to_string();
        assert!(matches!(
            bad.validated(10),
            Err(ReservationError::Validation(msg)) if msg.contains("email")
        ));
    }

    #[test]
    fn test_party_size_range() {
        let mut party = form();
        for size in [0, 11] {
            party.party_size = size;
            assert!(party.validated(10).is_err(), "size {size}");
        }
        party.party_size = 10;
        assert!(party.validated(10).is_ok());
    }

    #[test]
    fn test_into_reservation() {
        let payload = form()
            .validated(10)
            .unwrap()
            .into_reservation(1_234_560_042, "CR1", "10:00");
        assert_eq!(payload.student_id, "20231234");
        assert_eq!(payload.booth_id, "CR1");
        assert_eq!(payload.time_slot, "10:00");
        assert_eq!(payload.party_size, 2);
    }
}
