//! Request Dispatcher: the narrow interface the (out-of-scope) client calls.
//!
//! Accepts the legacy JSON action envelope and returns a JSON response:
//! success payloads pass through as-is, every failure becomes
//! `{"error": "<message>"}` with the message verbatim. Reads are lock-free;
//! every update is serialized behind the store-wide lock with a bounded
//! wait, and the locking invariant is re-validated here independently of
//! the reconciler so a stale in-memory snapshot is never trusted.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::archive::DocumentArchive;
use crate::constants::{DEFAULT_LOCK_TIMEOUT_MS, MAX_DOCUMENT_BYTES};
use crate::error::{Result, VerifyError};
use crate::lock::StoreLock;
use crate::merge::merge;
use crate::reconcile::Reconciler;
use crate::store::RecordStore;
use crate::types::{Document, EditedFields, StudentRecord, UpdateKind, UpdateRequest};

/// Bounded-wait settings for the store-wide write lock.
#[derive(Debug, Clone, Copy)]
pub struct LockSettings {
    pub timeout_ms: u64,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
enum ApiRequest {
    Search { id: String },
    Update(UpdateEnvelope),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateEnvelope {
    id_iqama: String,
    #[serde(rename = "type")]
    kind: UpdateKind,
    #[serde(default)]
    data: Option<EditPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditPayload {
    #[serde(flatten)]
    fields: EditedFields,
    file_data: Option<FileData>,
    file_data2: Option<FileData>,
}

/// Base64 document payload as submitted by the client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    base64: String,
    mime_type: String,
    filename: String,
}

impl FileData {
    /// Decode and admission-check one upload. Tolerates a `data:` URL
    /// prefix, which some clients leave on the payload.
    fn decode(&self) -> Result<Document> {
        let payload = match self.base64.split_once(',') {
            Some((head, rest)) if head.starts_with("data:") => rest,
            _ => self.base64.as_str(),
        };
        let bytes = BASE64.decode(payload.trim())?;
        if bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(VerifyError::DocumentTooLarge {
                limit_bytes: MAX_DOCUMENT_BYTES,
            });
        }
        Ok(Document::new(bytes, &self.mime_type, &self.filename))
    }
}

/// Routes `search`/`update` actions to the store, merger, and reconciler.
pub struct Dispatcher<S, A> {
    store: S,
    archive: A,
    lock: StoreLock,
    lock_settings: LockSettings,
}

impl<S: RecordStore, A: DocumentArchive> Dispatcher<S, A> {
    pub fn new(store: S, archive: A) -> Self {
        Self::with_lock_settings(store, archive, LockSettings::default())
    }

    pub fn with_lock_settings(store: S, archive: A, lock_settings: LockSettings) -> Self {
        Self {
            store,
            archive,
            lock: StoreLock::new(),
            lock_settings,
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle one request body. Never fails: errors become the legacy
    /// `{"error": ...}` envelope.
    #[must_use]
    pub fn handle(&self, body: &str) -> String {
        match self.dispatch(body) {
            Ok(value) => value.to_string(),
            Err(err) => json!({ "error": err.to_string() }).to_string(),
        }
    }

    /// Typed variant of [`Dispatcher::handle`] for embedding callers.
    pub fn dispatch(&self, body: &str) -> Result<Value> {
        match serde_json::from_str::<ApiRequest>(body)? {
            ApiRequest::Search { id } => self.search(&id),
            ApiRequest::Update(envelope) => self.update(envelope),
        }
    }

    /// Lock-free lookup by national ID.
    #[instrument(skip(self))]
    pub fn search(&self, id: &str) -> Result<Value> {
        let (_, record) = self
            .store
            .get_by_key(id)?
            .ok_or(VerifyError::RecordNotFound)?;
        Ok(record_response(&record))
    }

    #[instrument(skip_all, fields(id = %envelope.id_iqama))]
    fn update(&self, envelope: UpdateEnvelope) -> Result<Value> {
        let data = envelope.data.unwrap_or_default();

        // Decode and merge before taking the lock; this is pure CPU work and
        // keeps the serialized section short.
        let first = data.file_data.as_ref().map(FileData::decode).transpose()?;
        let second = data.file_data2.as_ref().map(FileData::decode).transpose()?;
        let document = if first.is_some() || second.is_some() {
            Some(merge(first.as_ref(), second.as_ref())?)
        } else {
            None
        };

        let request = UpdateRequest {
            id_iqama: envelope.id_iqama,
            kind: envelope.kind,
            fields: data.fields,
            document,
        };

        let _guard = self
            .lock
            .acquire(Duration::from_millis(self.lock_settings.timeout_ms))?;

        // Fresh read under the lock; the reconciler re-checks again before
        // writing.
        let (_, current) = self
            .store
            .get_by_key(&request.id_iqama)?
            .ok_or(VerifyError::RecordNotFound)?;
        if current.status.is_locked() {
            return Err(VerifyError::RecordLocked {
                status: current.status,
            });
        }

        let outcome = Reconciler::new(&self.store, &self.archive).reconcile(&request)?;
        Ok(json!({
            "success": true,
            "status": outcome.final_status.as_str(),
            "changedFields": outcome
                .writes
                .iter()
                .map(|write| write.field.as_str())
                .collect::<Vec<_>>(),
            "attachedDocumentLink": outcome.document_link,
            "archiveWarning": outcome.archive_warning,
        }))
    }
}

/// The full record as the client sees it, every date in canonical
/// `DD-MM-YYYY` display form.
fn record_response(record: &StudentRecord) -> Value {
    json!({
        "found": true,
        "studentNumber": record.student_number,
        "idIqama": record.id_iqama,
        "arabicName": record.arabic_name.canonical(),
        "englishName": record.english_name.canonical(),
        "birthPlace": record.birth_place.canonical(),
        "birthDate": record.birth_date.canonical(),
        "religion": record.religion.canonical(),
        "nationality": record.nationality.canonical(),
        "passportNumber": record.passport_number.canonical(),
        "passportExpiry": record.passport_expiry.canonical(),
        "fatherMobile": record.father_mobile,
        "motherMobile": record.mother_mobile,
        "school": record.school,
        "grade": record.grade,
        "attachedDocumentLink": record.attached_document_link,
        "status": record.status.as_str(),
    })
}
