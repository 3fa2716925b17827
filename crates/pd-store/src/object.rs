//! Object Store
//!
//! Uploaded-file storage behind a small trait: store bytes, get back a
//! retrievable URL. Keys are built as `{folder}/{timestamp_ms}_{safe}` where
//! `safe` is the sanitized original filename, so listings group by folder and
//! never collide on repeated uploads of the same file.

use crate::error::UploadError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Handle to a stored object.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    /// URL the object can be fetched from
    pub url: String,
    /// Storage key (`{folder}/{timestamp_ms}_{safe_filename}`)
    pub key: String,
    /// The original, unsanitized filename
    pub filename: String,
}

/// Uploaded-file storage boundary.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under a fresh key derived from `folder` and `filename`
    /// and return the object's handle. Failures are final; this layer never
    /// retries.
    async fn upload(
        &self,
        folder: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, UploadError>;
}

/// Sanitize a filename for use in a storage key.
///
/// Every character outside ASCII `[a-z0-9.]` (case-insensitive) becomes `_`
/// and the rest is lowercased. Idempotent: sanitizing an already sanitized
/// name changes nothing.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Build the storage key for an upload at the given instant.
pub fn object_key(folder: &str, filename: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}/{}_{}",
        folder,
        at.timestamp_millis(),
        sanitize_filename(filename)
    )
}

/// In-process object store for tests and offline development.
///
/// URLs are minted under the `memory://` scheme. `fail_uploads` turns every
/// upload into an `UploadError` for exercising failure paths.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_uploads: AtomicBool,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future upload fail.
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Bytes stored under `key`, if any.
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().get(key).cloned()
    }

    /// Keys of everything stored so far.
    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn upload(
        &self,
        folder: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, UploadError> {
        let key = object_key(folder, filename, Utc::now());
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(UploadError::new(key, "injected upload failure"));
        }
        self.objects.lock().insert(key.clone(), bytes);
        Ok(StoredObject {
            url: format!("memory://{key}"),
            key,
            filename: filename.to_string(),
        })
    }
}
