//! Crate-wide constants shared across the reconciler, merger, and dispatcher.

/// Canonical wire/storage form for all dates: day-month-year, zero-padded.
pub const CANONICAL_DATE_FORMAT: &str = "%d-%m-%Y";

/// Upload admission ceiling. Documents above this size are rejected before
/// they reach the merger.
pub const MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

/// Placeholder filename carried by merged output. The archive renames to the
/// identity-derived canonical name; the merger never learns student identity.
pub const MERGED_DOCUMENT_FILENAME: &str = "passport-upload.pdf";

/// MIME type of merged output.
pub const MERGED_DOCUMENT_MIME: &str = "application/pdf";

/// How long an `update` waits for the store-wide write lock before failing.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 10_000;

/// Number of leading bytes inspected when MIME types are missing or vague.
pub const MAGIC_SNIFF_BYTES: usize = 16;
