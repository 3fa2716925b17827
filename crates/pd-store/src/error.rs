//! Storage error taxonomy.
//!
//! Backend failures are classified at the store boundary so callers match on
//! meaning, never on backend error codes.

use thiserror::Error;

/// Result type for document store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Document store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No '{collection}' record with id '{id}'")]
    NotFound { collection: String, id: String },

    #[error("Permission denied on '{collection}': {hint}")]
    PermissionDenied { collection: String, hint: String },

    #[error("Duplicate record in '{collection}': {detail}")]
    Duplicate { collection: String, detail: String },

    #[error("Storage backend error on '{collection}'")]
    Backend {
        collection: String,
        #[source]
        source: mongodb::error::Error,
    },
}

impl StoreError {
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Permission failure with the standard operator remediation hint.
    pub fn permission_denied(collection: impl Into<String>) -> Self {
        Self::PermissionDenied {
            collection: collection.into(),
            hint: "check that the database's access rules are deployed for this client"
                .to_string(),
        }
    }

    pub fn duplicate(collection: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Duplicate {
            collection: collection.into(),
            detail: detail.into(),
        }
    }
}

/// Object store upload failure. Uploads are never retried by this layer.
#[derive(Error, Debug)]
#[error("Upload of '{key}' failed: {message}")]
pub struct UploadError {
    /// The object key the upload was attempted under
    pub key: String,
    pub message: String,
}

impl UploadError {
    pub fn new(key: impl Into<String>, message: impl ToString) -> Self {
        Self {
            key: key.into(),
            message: message.to_string(),
        }
    }
}
