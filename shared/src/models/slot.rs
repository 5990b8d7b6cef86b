//! Slot Model

use serde::{Deserialize, Serialize};

use crate::types::Capacity;

/// Root collection of booths
pub const BOOTHS_COLLECTION: &str = "booths";

/// Database path of a booth's slot map
pub fn slots_path(booth_id: &str) -> String {
    format!("{BOOTHS_COLLECTION}/{booth_id}/slots")
}

/// Whether a slot label can name a counter directly under the slot map.
///
/// Labels are single path segments: non-empty, no `/`, no surrounding
/// whitespace.
pub fn is_valid_time_slot(time_slot: &str) -> bool {
    !time_slot.is_empty() && !time_slot.contains('/') && time_slot.trim() == time_slot
}

/// Presentation state of one slot (derived, never stored)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotLabel {
    pub time_slot: String,
    pub remaining: Capacity,
    pub max_capacity: Capacity,
    pub available: bool,
    /// e.g. `10:00 (3/10)` or `10:00 (full)`
    pub display: String,
}

impl SlotLabel {
    pub fn new(time_slot: impl Into<String>, remaining: Capacity, max_capacity: Capacity) -> Self {
        let time_slot = time_slot.into();
        let available = remaining > 0;
        let display = if available {
            format!("{time_slot} ({remaining}/{max_capacity})")
        } else {
            format!("{time_slot} (full)")
        };
        Self {
            time_slot,
            remaining,
            max_capacity,
            available,
            display,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_paths() {
        assert_eq!(slots_path("CR1"), "booths/CR1/slots");
    }

    #[test]
    fn test_valid_time_slot() {
        assert!(is_valid_time_slot("10:00"));
        assert!(is_valid_time_slot("Day 2 10:00"));
        for bad in ["", " ", "10:00/", "10:00/x", "/10:00", " 10:00"] {
            assert!(!is_valid_time_slot(bad), "{bad:?}");
        }
    }

    #[test]
    fn test_slot_label_display() {
        let open = SlotLabel::new("10:00", 3, 10);
        assert!(open.available);
        assert_eq!(open.display, "10:00 (3/10)");

        let full = SlotLabel::new("11:00", 0, 10);
        assert!(!full.available);
        assert_eq!(full.display, "11:00 (full)");
    }
}
