//! Slot View and Slot Board
//!
//! [`derive_slot_view`] turns ledger counters into display labels. The
//! [`SlotBoard`] keeps that view live: it re-reads the booth's counters on
//! every push notification and keeps the user's selection only while the
//! selected slot still has seats.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use booth_store::Watch;
use shared::models::SlotLabel;
use shared::types::Capacity;
use tracing::{debug, info};

use crate::error::{LedgerError, ReservationError};
use crate::ledger::CapacityLedger;

/// Labels for every known slot, sorted by slot label.
///
/// Known slots are the stored counters plus `configured` slots that have no
/// counter yet (shown with `max_capacity` seats).
pub fn derive_slot_view(
    stored: &[(String, Capacity)],
    configured: &[String],
    max_capacity: Capacity,
) -> Vec<SlotLabel> {
    let mut remaining: BTreeMap<&str, Capacity> = configured
        .iter()
        .map(|slot| (slot.as_str(), max_capacity))
        .collect();
    for (slot, value) in stored {
        remaining.insert(slot.as_str(), *value);
    }

    remaining
        .into_iter()
        .map(|(slot, value)| SlotLabel::new(slot, value, max_capacity))
        .collect()
}

/// Live slot list with the user's current selection
pub struct SlotBoard {
    ledger: CapacityLedger,
    booth_id: String,
    configured: Vec<String>,
    labels: Vec<SlotLabel>,
    selected: Option<String>,
    watch: Watch,
}

impl SlotBoard {
    /// Subscribe to the booth's counters and load the initial view
    pub async fn open(
        ledger: CapacityLedger,
        booth_id: impl Into<String>,
        configured: Vec<String>,
    ) -> Result<Self, LedgerError> {
        let booth_id = booth_id.into();
        // subscribe first so no commit slips between the read and the watch
        let watch = ledger.watch(&booth_id);
        let mut board = Self {
            ledger,
            booth_id,
            configured,
            labels: Vec::new(),
            selected: None,
            watch,
        };
        board.refresh().await?;
        Ok(board)
    }

    pub fn booth_id(&self) -> &str {
        &self.booth_id
    }

    pub fn labels(&self) -> &[SlotLabel] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn available_count(&self) -> usize {
        self.labels.iter().filter(|label| label.available).count()
    }

    pub fn label(&self, time_slot: &str) -> Option<&SlotLabel> {
        self.labels.iter().find(|label| label.time_slot == time_slot)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Select a slot. Unknown and full slots are refused.
    pub fn select(&mut self, time_slot: &str) -> Result<&SlotLabel, ReservationError> {
        let index = self
            .labels
            .iter()
            .position(|label| label.time_slot == time_slot)
            .ok_or_else(|| ReservationError::SlotNotFound(time_slot.to_string()))?;

        let label = &self.labels[index];
        if !label.available {
            return Err(ReservationError::Rejected {
                time_slot: label.time_slot.clone(),
                remaining: label.remaining,
            });
        }
        self.selected = Some(label.time_slot.clone());
        Ok(&self.labels[index])
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Re-read every counter and re-derive the view
    pub async fn refresh(&mut self) -> Result<(), LedgerError> {
        let stored = self.ledger.slots(&self.booth_id).await?;
        self.labels = derive_slot_view(&stored, &self.configured, self.ledger.max_capacity());

        if let Some(selected) = self.selected.as_deref()
            && !self
                .labels
                .iter()
                .any(|label| label.time_slot == selected && label.available)
        {
            info!(time_slot = %selected, "Selected slot is no longer available");
            self.selected = None;
        }
        Ok(())
    }

    /// Wait for the next push notification and refresh.
    ///
    /// Returns `None` once the store has gone away.
    pub async fn next_update(&mut self) -> Option<Result<(), LedgerError>> {
        let event = self.watch.next().await?;
        debug!(?event, "Slot change received");
        Some(self.refresh().await)
    }

    /// Plain-text rendering, one slot per line
    pub fn render(&self) -> String {
        if self.labels.is_empty() {
            return format!("[{}] No slots available", self.booth_id);
        }
        let mut out = format!("[{}]", self.booth_id);
        for label in &self.labels {
            let marker = if self.selected.as_deref() == Some(label.time_slot.as_str()) {
                '*'
            } else {
                ' '
            };
            let _ = write!(out, "\n {marker} {}", label.display);
        }
        out
    }
}
