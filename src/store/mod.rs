//! The record-store collaborator boundary.
//!
//! The store exclusively owns `StudentRecord` persistence and is the single
//! writer. Rows are addressed by a store-specific [`RowLocator`] obtained
//! from a prior read; fields are addressed by name, never by column
//! position.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::types::{Field, RecordStatus, StudentRecord};

/// Opaque handle to a row, valid for follow-up writes after a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLocator(pub u64);

/// One field mutation decided by the reconciler. `highlighted` marks the
/// cell as changed-during-review (the backing store may render it, e.g. as a
/// background color).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWrite {
    pub field: Field,
    pub value: String,
    pub highlighted: bool,
}

/// Abstract row-oriented record table keyed by national ID.
pub trait RecordStore: Send + Sync {
    /// Look a record up by national ID. Key matching trims both sides.
    fn get_by_key(&self, id_iqama: &str) -> Result<Option<(RowLocator, StudentRecord)>>;

    /// Write one field value, optionally flagging it as changed.
    fn set_field(&self, row: RowLocator, field: Field, value: &str, highlighted: bool)
    -> Result<()>;

    /// Write the review status.
    fn set_status(&self, row: RowLocator, status: RecordStatus) -> Result<()>;
}
