#![deny(clippy::all, clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]
//
// Strategic lint exceptions, allowed project-wide for pragmatic reasons:
//
// Documentation lints: many internal/self-documenting functions don't need extensive docs.
// Public APIs should still have proper documentation.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
//
// Cast safety: casts here are bounded by real-world constraints (pixel dimensions,
// page counts, upload ceilings).
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
//
// Pattern matching: these pedantic lints often suggest changes that reduce clarity.
#![allow(clippy::match_same_arms)]
#![allow(clippy::manual_let_else)]
//
// Return value wrapping: some functions use Result for consistency even when they
// currently can't fail, allowing future error conditions without breaking the API.
#![allow(clippy::unnecessary_wraps)]

//! Core library for the MEIS student-record verification workflow.
//!
//! A guardian looks a student up by national ID, reviews the stored
//! demographic and passport data, then either confirms it or submits
//! corrections together with a passport scan. This crate owns the three
//! server-side pieces of that flow:
//!
//! - [`reconcile`]: decides which fields actually changed (value-aware, with
//!   date normalization), archives the uploaded scan, and derives the final
//!   record status (`Pending` → `Edit` or `Done`, locked thereafter).
//! - [`merge`]: folds one or two uploaded documents (PDFs and/or images)
//!   into a single archival PDF, pages in submission order.
//! - [`dispatch`]: routes the JSON `search`/`update` actions, serializing
//!   every write behind a store-wide lock with a bounded wait.
//!
//! Persistence and archival are behind the [`store::RecordStore`] and
//! [`archive::DocumentArchive`] traits; [`store::MemoryStore`] and
//! [`archive::FsArchive`] are the bundled implementations.

/// The meis-verify crate version (matches `Cargo.toml`).
pub const MEIS_VERIFY_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod archive;
pub mod constants;
pub mod dates;
pub mod dispatch;
pub mod error;
mod lock;
pub mod merge;
pub mod reconcile;
pub mod store;
pub mod types;

pub use archive::{DocumentArchive, FsArchive};
pub use dispatch::{Dispatcher, LockSettings};
pub use error::{Result, VerifyError};
pub use merge::merge;
pub use reconcile::{ReconcileOutcome, Reconciler, diff_fields};
pub use store::{FieldWrite, MemoryStore, RecordStore, RowLocator};
pub use types::{
    Document, EditedFields, Field, FieldValue, MergedDocument, RecordStatus, StudentRecord,
    UpdateKind, UpdateRequest,
};
