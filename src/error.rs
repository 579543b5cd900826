//! Error taxonomy for the verification workflow.
//!
//! The dispatcher maps every variant to the legacy `{"error": "<message>"}`
//! envelope verbatim, so `Display` text here is user-facing. Only
//! [`VerifyError::RecordNotFound`] and [`VerifyError::RecordLocked`] get
//! special-cased messaging in clients; everything else collapses to a
//! generic failure on their side.

use thiserror::Error;

use crate::types::RecordStatus;

pub type Result<T> = std::result::Result<T, VerifyError>;

#[derive(Debug, Error)]
pub enum VerifyError {
    /// No row exists for the requested national ID.
    #[error("Student not found")]
    RecordNotFound,

    /// The record has already been reviewed (`Edit` or `Done`) and is
    /// read-only for this workflow. A user-facing condition, not a bug.
    #[error("Record already locked.")]
    RecordLocked { status: RecordStatus },

    /// The store-wide write lock could not be acquired within the bound.
    #[error("store is busy, lock not acquired within {timeout_ms} ms")]
    LockTimeout { timeout_ms: u64 },

    /// An edit submission carried a second document but no first, or the
    /// merger was invoked with nothing to merge.
    #[error("at least one document is required")]
    NoDocument,

    /// Input to the merger is neither a PDF nor a supported raster image.
    #[error("unsupported document format: {detail}")]
    UnsupportedFormat { detail: String },

    /// Decoded upload exceeds the admission ceiling.
    #[error("file size exceeds {limit_bytes} bytes")]
    DocumentTooLarge { limit_bytes: usize },

    /// Archive collaborator fault. Best-effort: the reconciler logs this and
    /// carries on, it never aborts the field-update transaction.
    #[error("archive failure: {0}")]
    Archive(String),

    /// Malformed request envelope or field payload.
    #[error("malformed request: {0}")]
    Request(#[from] serde_json::Error),

    /// Base64 document payload could not be decoded.
    #[error("malformed document payload: {0}")]
    DocumentPayload(#[from] base64::DecodeError),

    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
