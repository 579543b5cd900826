//! Transient document payloads flowing through the merge and archive steps.

/// One uploaded document as received from the client, already decoded from
/// its transport encoding.
#[derive(Debug, Clone)]
pub struct Document {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub filename: String,
}

impl Document {
    #[must_use]
    pub fn new(bytes: Vec<u8>, mime_type: &str, filename: &str) -> Self {
        Self {
            bytes,
            mime_type: mime_type.to_string(),
            filename: filename.to_string(),
        }
    }
}

/// Output of the merger: a single PDF container holding every input page.
///
/// Carries a fixed placeholder filename; the archive step renames to the
/// identity-derived canonical name.
#[derive(Debug, Clone)]
pub struct MergedDocument {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub filename: String,
}
