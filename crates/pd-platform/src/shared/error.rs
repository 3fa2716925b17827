//! Platform Error Types

use pd_store::{StoreError, UploadError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Duplicate entity: {entity_type} ({detail})")]
    Duplicate { entity_type: String, detail: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No profile for authenticated user {user_id}")]
    ProfileNotFound { user_id: String },

    #[error("Permission denied on '{context}': {hint}")]
    PermissionDenied { context: String, hint: String },

    #[error("Malformed '{collection}' record: {source}")]
    Malformed {
        collection: String,
        #[source]
        source: bson::de::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(
        "Onboarding partially applied: tenant '{tenant_id}' is committed but \
         property '{property_id}' was not updated: {source}"
    )]
    PartialOnboarding {
        tenant_id: String,
        property_id: String,
        #[source]
        source: Box<PlatformError>,
    },

    #[error(transparent)]
    Storage(StoreError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PlatformError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(entity_type: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: entity_type.into(),
            detail: detail.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn profile_not_found(user_id: impl Into<String>) -> Self {
        Self::ProfileNotFound {
            user_id: user_id.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn partial_onboarding(
        tenant_id: impl Into<String>,
        property_id: impl Into<String>,
        source: PlatformError,
    ) -> Self {
        Self::PartialOnboarding {
            tenant_id: tenant_id.into(),
            property_id: property_id.into(),
            source: Box::new(source),
        }
    }
}

/// Store failures keep their classification when they cross into the
/// platform layer; only unclassified backend errors stay wrapped.
impl From<StoreError> for PlatformError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => Self::NotFound {
                entity_type: collection,
                id,
            },
            StoreError::PermissionDenied { collection, hint } => Self::PermissionDenied {
                context: collection,
                hint,
            },
            StoreError::Duplicate { collection, detail } => Self::Duplicate {
                entity_type: collection,
                detail,
            },
            backend @ StoreError::Backend { .. } => Self::Storage(backend),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;
