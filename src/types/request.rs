//! The transient update submission handed to the reconciler.

use serde::{Deserialize, Serialize};

use super::document::MergedDocument;
use super::record::Field;

/// What the guardian did on the review screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateKind {
    /// "Everything is correct" — no field payload.
    #[serde(rename = "CONFIRM", alias = "CORRECT")]
    Confirm,
    /// Corrections submitted, possibly with a passport scan.
    #[serde(rename = "EDIT")]
    Edit,
}

/// Proposed values for the editable field set. Absent and empty are
/// equivalent; the reconciler treats a missing entry as "".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditedFields {
    pub arabic_name: Option<String>,
    pub english_name: Option<String>,
    pub birth_place: Option<String>,
    pub birth_date: Option<String>,
    pub religion: Option<String>,
    pub nationality: Option<String>,
    pub passport_number: Option<String>,
    pub passport_expiry: Option<String>,
}

impl EditedFields {
    /// The proposed value for a field, or `None` when the client omitted it.
    #[must_use]
    pub fn proposed(&self, field: Field) -> Option<&str> {
        match field {
            Field::ArabicName => self.arabic_name.as_deref(),
            Field::EnglishName => self.english_name.as_deref(),
            Field::BirthPlace => self.birth_place.as_deref(),
            Field::BirthDate => self.birth_date.as_deref(),
            Field::Religion => self.religion.as_deref(),
            Field::Nationality => self.nationality.as_deref(),
            Field::PassportNumber => self.passport_number.as_deref(),
            Field::PassportExpiry => self.passport_expiry.as_deref(),
            Field::AttachedDocumentLink => None,
        }
    }
}

/// A fully-decoded update, ready for reconciliation. Never persisted.
#[derive(Debug)]
pub struct UpdateRequest {
    pub id_iqama: String,
    pub kind: UpdateKind,
    pub fields: EditedFields,
    pub document: Option<MergedDocument>,
}
