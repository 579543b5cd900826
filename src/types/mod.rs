//! Public types exposed by the `meis-verify` crate.

pub mod document;
pub mod record;
pub mod request;

pub use document::{Document, MergedDocument};
pub use record::{Field, FieldValue, RecordStatus, StudentRecord};
pub use request::{EditedFields, UpdateKind, UpdateRequest};
