//! Terms agreement shown before the attendee form

use crate::error::ReservationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub id: String,
    pub title: String,
    pub required: bool,
    agreed: bool,
}

impl Term {
    pub fn required(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            required: true,
            agreed: false,
        }
    }

    pub fn optional(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(id, title)
        }
    }

    pub fn agreed(&self) -> bool {
        self.agreed
    }
}

/// Checkbox state of the terms page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermsAgreement {
    terms: Vec<Term>,
}

impl TermsAgreement {
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms }
    }

    /// The booth's terms: personal data use (required) and event notices (optional)
    pub fn standard() -> Self {
        Self::new(vec![
            Term::required("privacy", "Collection and use of personal information"),
            Term::optional("notices", "Receiving event notices"),
        ])
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Toggle a single term
    pub fn set(&mut self, id: &str, agreed: bool) -> Result<(), ReservationError> {
        let term = self
            .terms
            .iter_mut()
            .find(|term| term.id == id)
            .ok_or_else(|| ReservationError::Validation(format!("unknown term {id:?}")))?;
        term.agreed = agreed;
        Ok(())
    }

    /// The "agree to all" checkbox
    pub fn set_all(&mut self, agreed: bool) {
        for term in &mut self.terms {
            term.agreed = agreed;
        }
    }

    /// Mirrors the "agree to all" checkbox: checked iff every term is
    pub fn all_agreed(&self) -> bool {
        self.terms.iter().all(Term::agreed)
    }

    pub fn can_proceed(&self) -> bool {
        self.terms.iter().filter(|term| term.required).all(Term::agreed)
    }

    pub fn ensure_accepted(&self) -> Result<(), ReservationError> {
        if self.can_proceed() {
            Ok(())
        } else {
            Err(ReservationError::TermsNotAccepted)
        }
    }
}

impl Default for TermsAgreement {
    fn default() -> Self {
        Self::standard()
    }
}
