//! The student record, its field addressing, and the review status machine.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates;

/// Review status of a record. `Pending` is the only writable state; `Edit`
/// and `Done` are terminal and lock the record for this workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    Pending,
    Edit,
    Done,
}

impl RecordStatus {
    /// Whether the record is read-only for this workflow.
    #[must_use]
    pub fn is_locked(self) -> bool {
        matches!(self, RecordStatus::Edit | RecordStatus::Done)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Pending => "Pending",
            RecordStatus::Edit => "Edit",
            RecordStatus::Done => "Done",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored cell value. Backing stores return date columns either as typed
/// dates or as strings they formatted earlier; both normalize to the same
/// canonical string via [`FieldValue::canonical`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    Date(NaiveDate),
}

impl FieldValue {
    /// Canonical string form: dates as `DD-MM-YYYY`, text trimmed, empty and
    /// absent both as `""`. All equality checks go through this.
    #[must_use]
    pub fn canonical(&self) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Text(s) => s.trim().to_string(),
            FieldValue::Date(d) => dates::format_date(*d),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.canonical().is_empty()
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        if value.trim().is_empty() {
            FieldValue::Empty
        } else {
            FieldValue::Text(value.to_string())
        }
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

/// Named addressing for mutable record fields. Stores are addressed by these
/// names, never by column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    ArabicName,
    EnglishName,
    BirthPlace,
    BirthDate,
    Religion,
    Nationality,
    PassportNumber,
    PassportExpiry,
    AttachedDocumentLink,
}

impl Field {
    /// The fixed set the edit path may rewrite. `AttachedDocumentLink` is
    /// excluded: it is only ever set by a successful archive.
    pub const EDITABLE: [Field; 8] = [
        Field::ArabicName,
        Field::EnglishName,
        Field::BirthPlace,
        Field::BirthDate,
        Field::Religion,
        Field::Nationality,
        Field::PassportNumber,
        Field::PassportExpiry,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Field::ArabicName => "arabicName",
            Field::EnglishName => "englishName",
            Field::BirthPlace => "birthPlace",
            Field::BirthDate => "birthDate",
            Field::Religion => "religion",
            Field::Nationality => "nationality",
            Field::PassportNumber => "passportNumber",
            Field::PassportExpiry => "passportExpiry",
            Field::AttachedDocumentLink => "attachedDocumentLink",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One student's profile and review status, keyed by national ID.
///
/// Identity fields are immutable once created (records are bulk-imported out
/// of band). `fatherMobile`/`motherMobile`/`school`/`grade` are read-only
/// context returned by `search` and never editable through this workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    pub student_number: String,
    pub id_iqama: String,
    pub arabic_name: FieldValue,
    pub english_name: FieldValue,
    pub birth_place: FieldValue,
    pub birth_date: FieldValue,
    pub religion: FieldValue,
    pub nationality: FieldValue,
    pub passport_number: FieldValue,
    pub passport_expiry: FieldValue,
    pub father_mobile: String,
    pub mother_mobile: String,
    pub school: String,
    pub grade: String,
    pub attached_document_link: Option<String>,
    pub status: RecordStatus,
}

impl StudentRecord {
    /// A fresh, mostly-empty `Pending` record for the given identity.
    #[must_use]
    pub fn new(student_number: &str, id_iqama: &str) -> Self {
        Self {
            student_number: student_number.to_string(),
            id_iqama: id_iqama.to_string(),
            arabic_name: FieldValue::Empty,
            english_name: FieldValue::Empty,
            birth_place: FieldValue::Empty,
            birth_date: FieldValue::Empty,
            religion: FieldValue::Empty,
            nationality: FieldValue::Empty,
            passport_number: FieldValue::Empty,
            passport_expiry: FieldValue::Empty,
            father_mobile: String::new(),
            mother_mobile: String::new(),
            school: String::new(),
            grade: String::new(),
            attached_document_link: None,
            status: RecordStatus::Pending,
        }
    }

    /// Read a mutable field by name.
    #[must_use]
    pub fn field(&self, field: Field) -> FieldValue {
        match field {
            Field::ArabicName => self.arabic_name.clone(),
            Field::EnglishName => self.english_name.clone(),
            Field::BirthPlace => self.birth_place.clone(),
            Field::BirthDate => self.birth_date.clone(),
            Field::Religion => self.religion.clone(),
            Field::Nationality => self.nationality.clone(),
            Field::PassportNumber => self.passport_number.clone(),
            Field::PassportExpiry => self.passport_expiry.clone(),
            Field::AttachedDocumentLink => self
                .attached_document_link
                .as_deref()
                .map_or(FieldValue::Empty, FieldValue::from),
        }
    }

    /// Write a mutable field by name. Values arrive in canonical string form;
    /// the store keeps them as text from then on.
    pub fn set_field(&mut self, field: Field, value: &str) {
        let value = FieldValue::from(value);
        match field {
            Field::ArabicName => self.arabic_name = value,
            Field::EnglishName => self.english_name = value,
            Field::BirthPlace => self.birth_place = value,
            Field::BirthDate => self.birth_date = value,
            Field::Religion => self.religion = value,
            Field::Nationality => self.nationality = value,
            Field::PassportNumber => self.passport_number = value,
            Field::PassportExpiry => self.passport_expiry = value,
            Field::AttachedDocumentLink => {
                self.attached_document_link = match value {
                    FieldValue::Empty => None,
                    other => Some(other.canonical()),
                };
            }
        }
    }
}
