//! The document-archive collaborator boundary.
//!
//! Archival is durable off-path storage of a submitted scan, referenced back
//! from the record by URL. It is best-effort within the update transaction:
//! every fault surfaces as [`VerifyError::Archive`], which the reconciler
//! logs and attaches as a soft warning instead of failing the submission.

use std::path::PathBuf;

use crate::error::{Result, VerifyError};
use crate::types::MergedDocument;

/// Abstract archive: store a merged document under a canonical name stem
/// (the student's national ID) and return its URL.
pub trait DocumentArchive: Send + Sync {
    fn store(&self, document: &MergedDocument, name_stem: &str) -> Result<String>;
}

/// Filesystem archive writing `<stem>.pdf` under a root directory.
#[derive(Debug, Clone)]
pub struct FsArchive {
    root: PathBuf,
}

impl FsArchive {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DocumentArchive for FsArchive {
    fn store(&self, document: &MergedDocument, name_stem: &str) -> Result<String> {
        fs_err::create_dir_all(&self.root)
            .map_err(|err| VerifyError::Archive(err.to_string()))?;
        let path = self.root.join(format!("{name_stem}.pdf"));
        fs_err::write(&path, &document.bytes)
            .map_err(|err| VerifyError::Archive(err.to_string()))?;
        Ok(format!("file://{}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MERGED_DOCUMENT_FILENAME, MERGED_DOCUMENT_MIME};

    fn merged(bytes: &[u8]) -> MergedDocument {
        MergedDocument {
            bytes: bytes.to_vec(),
            mime_type: MERGED_DOCUMENT_MIME.to_string(),
            filename: MERGED_DOCUMENT_FILENAME.to_string(),
        }
    }

    #[test]
    fn stores_under_identity_stem() {
        let dir = tempfile::TempDir::new().unwrap();
        let archive = FsArchive::new(dir.path());
        let url = archive.store(&merged(b"%PDF-1.5 stub"), "1234567890").unwrap();
        assert!(url.ends_with("1234567890.pdf"), "unexpected url {url}");
        let written = std::fs::read(dir.path().join("1234567890.pdf")).unwrap();
        assert_eq!(written, b"%PDF-1.5 stub");
    }

    #[test]
    fn faults_map_to_soft_archive_error() {
        // Root is a file, so create_dir_all must fail.
        let file = tempfile::NamedTempFile::new().unwrap();
        let archive = FsArchive::new(file.path());
        let err = archive.store(&merged(b"x"), "333").unwrap_err();
        assert!(matches!(err, VerifyError::Archive(_)));
    }
}
