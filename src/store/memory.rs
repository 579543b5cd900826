//! In-memory `RecordStore`, the bundled implementation used by tests and by
//! deployments that load the roster up front and flush it elsewhere.

use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};

use crate::error::{Result, VerifyError};
use crate::store::{RecordStore, RowLocator};
use crate::types::{Field, RecordStatus, StudentRecord};

#[derive(Debug)]
struct MemoryRow {
    record: StudentRecord,
    highlights: BTreeSet<Field>,
}

/// Row-oriented in-memory table. Internally consistent on its own (reads and
/// writes take the row lock), but workflow-level serialization is still the
/// dispatcher's store-wide lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<MemoryRow>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning its locator. Roster loading happens out of
    /// band in production; this is that path's moral equivalent.
    pub fn seed(&self, record: StudentRecord) -> RowLocator {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        rows.push(MemoryRow {
            record,
            highlights: BTreeSet::new(),
        });
        RowLocator(rows.len() as u64 - 1)
    }

    /// Snapshot a record by national ID, for assertions and read paths that
    /// don't need a locator.
    #[must_use]
    pub fn record(&self, id_iqama: &str) -> Option<StudentRecord> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        rows.iter()
            .map(|row| &row.record)
            .find(|rec| rec.id_iqama.trim() == id_iqama.trim())
            .cloned()
    }

    /// Which fields of a record carry the changed-during-review marker.
    #[must_use]
    pub fn highlights(&self, id_iqama: &str) -> BTreeSet<Field> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        rows.iter()
            .find(|row| row.record.id_iqama.trim() == id_iqama.trim())
            .map(|row| row.highlights.clone())
            .unwrap_or_default()
    }
}

impl RecordStore for MemoryStore {
    fn get_by_key(&self, id_iqama: &str) -> Result<Option<(RowLocator, StudentRecord)>> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        Ok(rows.iter().enumerate().find_map(|(idx, row)| {
            (row.record.id_iqama.trim() == id_iqama.trim())
                .then(|| (RowLocator(idx as u64), row.record.clone()))
        }))
    }

    fn set_field(
        &self,
        row: RowLocator,
        field: Field,
        value: &str,
        highlighted: bool,
    ) -> Result<()> {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        let slot = rows
            .get_mut(row.0 as usize)
            .ok_or(VerifyError::RecordNotFound)?;
        slot.record.set_field(field, value);
        if highlighted {
            slot.highlights.insert(field);
        }
        Ok(())
    }

    fn set_status(&self, row: RowLocator, status: RecordStatus) -> Result<()> {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        let slot = rows
            .get_mut(row.0 as usize)
            .ok_or(VerifyError::RecordNotFound)?;
        slot.record.status = status;
        Ok(())
    }
}
