//! Record Reconciler: value-aware field diffing and the status transition.
//!
//! Stateless: every call re-reads the row from the store and derives its
//! result purely from that row and the request. Field writes are issued
//! individually and the status write always lands last, so a partial failure
//! never leaves a record showing `Edit`/`Done` with unwritten fields.

use log::{info, warn};

use crate::archive::DocumentArchive;
use crate::error::{Result, VerifyError};
use crate::store::{FieldWrite, RecordStore};
use crate::types::{EditedFields, Field, RecordStatus, StudentRecord, UpdateKind, UpdateRequest};

/// What a reconciliation decided and performed.
#[derive(Debug)]
pub struct ReconcileOutcome {
    /// Field writes issued, in field order. Empty for confirms and no-op
    /// edits.
    pub writes: Vec<FieldWrite>,
    pub final_status: RecordStatus,
    /// Archive URL written to `attachedDocumentLink`, when a document was
    /// submitted and archival succeeded.
    pub document_link: Option<String>,
    /// Soft warning when archival failed; the update itself still went
    /// through.
    pub archive_warning: Option<String>,
}

/// Compute the minimal field diff between stored and proposed values.
///
/// Comparison is over canonical forms: stored typed dates become
/// `DD-MM-YYYY` strings, everything is trimmed, and empty is equivalent to
/// absent on both sides. Fields that do not differ produce no write.
#[must_use]
pub fn diff_fields(current: &StudentRecord, proposed: &EditedFields) -> Vec<FieldWrite> {
    Field::EDITABLE
        .iter()
        .filter_map(|&field| {
            let stored = current.field(field).canonical();
            let wanted = proposed.proposed(field).unwrap_or("").trim().to_string();
            (stored != wanted).then_some(FieldWrite {
                field,
                value: wanted,
                highlighted: true,
            })
        })
        .collect()
}

/// Applies an update against the store, archiving any submitted document.
pub struct Reconciler<'a> {
    store: &'a dyn RecordStore,
    archive: &'a dyn DocumentArchive,
}

impl<'a> Reconciler<'a> {
    #[must_use]
    pub fn new(store: &'a dyn RecordStore, archive: &'a dyn DocumentArchive) -> Self {
        Self { store, archive }
    }

    /// Reconcile one update request.
    ///
    /// Re-fetches the row and re-checks the locking invariant itself, even
    /// though the dispatcher already did, to close the window between its
    /// read and our writes.
    pub fn reconcile(&self, request: &UpdateRequest) -> Result<ReconcileOutcome> {
        let (row, current) = self
            .store
            .get_by_key(&request.id_iqama)?
            .ok_or(VerifyError::RecordNotFound)?;
        if current.status.is_locked() {
            return Err(VerifyError::RecordLocked {
                status: current.status,
            });
        }

        match request.kind {
            UpdateKind::Confirm => {
                self.store.set_status(row, RecordStatus::Done)?;
                info!("record {} confirmed, status -> Done", current.id_iqama);
                Ok(ReconcileOutcome {
                    writes: Vec::new(),
                    final_status: RecordStatus::Done,
                    document_link: None,
                    archive_warning: None,
                })
            }
            UpdateKind::Edit => self.reconcile_edit(row, &current, request),
        }
    }

    fn reconcile_edit(
        &self,
        row: crate::store::RowLocator,
        current: &StudentRecord,
        request: &UpdateRequest,
    ) -> Result<ReconcileOutcome> {
        let writes = diff_fields(current, &request.fields);
        let mut has_changes = !writes.is_empty();

        for write in &writes {
            self.store
                .set_field(row, write.field, &write.value, write.highlighted)?;
        }

        let mut document_link = None;
        let mut archive_warning = None;
        if let Some(document) = &request.document {
            // A newly verified passport scan is itself material, so a
            // successful archive counts as a change even with zero field
            // diffs. Failure is best-effort: log, attach a warning, carry on.
            match self.archive.store(document, &current.id_iqama) {
                Ok(url) => {
                    self.store
                        .set_field(row, Field::AttachedDocumentLink, &url, false)?;
                    has_changes = true;
                    document_link = Some(url);
                }
                Err(err) => {
                    warn!(
                        "archive failed for record {}, continuing without attachment: {err}",
                        current.id_iqama
                    );
                    archive_warning = Some(err.to_string());
                }
            }
        }

        let final_status = if has_changes {
            RecordStatus::Edit
        } else {
            RecordStatus::Done
        };
        self.store.set_status(row, final_status)?;
        info!(
            "record {} edited: {} field change(s), status -> {final_status}",
            current.id_iqama,
            writes.len()
        );

        Ok(ReconcileOutcome {
            writes,
            final_status,
            document_link,
            archive_warning,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldValue;
    use chrono::NaiveDate;

    fn record() -> StudentRecord {
        let mut rec = StudentRecord::new("1001", "1234567890");
        rec.arabic_name = FieldValue::from("أحمد محمد علي");
        rec.english_name = FieldValue::from("Ahmed");
        rec.passport_number = FieldValue::from("P1");
        rec.passport_expiry = FieldValue::Date(NaiveDate::from_ymd_opt(2029, 7, 20).unwrap());
        rec
    }

    fn matching_edits() -> EditedFields {
        EditedFields {
            arabic_name: Some("أحمد محمد علي".to_string()),
            english_name: Some("Ahmed".to_string()),
            passport_number: Some("P1".to_string()),
            passport_expiry: Some("20-07-2029".to_string()),
            ..EditedFields::default()
        }
    }

    #[test]
    fn identical_values_produce_no_writes() {
        assert!(diff_fields(&record(), &matching_edits()).is_empty());
    }

    #[test]
    fn typed_stored_date_matches_canonical_string() {
        // Stored value is a typed date; the proposed string must compare
        // equal after normalization, not as raw representations.
        let mut edits = matching_edits();
        edits.passport_expiry = Some(" 20-07-2029 ".to_string());
        assert!(diff_fields(&record(), &edits).is_empty());
    }

    #[test]
    fn changed_field_is_flagged_highlighted() {
        let mut edits = matching_edits();
        edits.passport_number = Some("P2".to_string());
        let writes = diff_fields(&record(), &edits);
        assert_eq!(
            writes,
            vec![FieldWrite {
                field: Field::PassportNumber,
                value: "P2".to_string(),
                highlighted: true,
            }]
        );
    }

    #[test]
    fn absent_proposed_value_clears_stored_value() {
        let mut edits = matching_edits();
        edits.english_name = None;
        let writes = diff_fields(&record(), &edits);
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].field, Field::EnglishName);
        assert_eq!(writes[0].value, "");
    }

    #[test]
    fn absent_and_empty_are_equivalent_when_stored_is_empty() {
        let edits = matching_edits();
        // religion/nationality/birth fields are empty in the record and
        // absent in the proposal: no diff.
        let writes = diff_fields(&record(), &edits);
        assert!(writes.is_empty());
    }
}
