//! Property Document Entity

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type label applied when the uploader does not pick one.
pub const DEFAULT_DOCUMENT_TYPE: &str = "Lease/Contract";

/// Metadata record for a file stored in the object store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDocument {
    #[serde(rename = "_id")]
    pub id: String,

    pub property_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,

    /// Original filename as uploaded, before key sanitization
    pub filename: String,

    /// Retrievable URL returned by the object store
    pub url: String,

    #[serde(rename = "type")]
    pub doc_type: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub upload_date: DateTime<Utc>,
}

impl PropertyDocument {
    pub fn new(
        property_id: impl Into<String>,
        filename: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: pd_common::ids::new_id(),
            property_id: property_id.into(),
            tenant_id: None,
            filename: filename.into(),
            url: url.into(),
            doc_type: DEFAULT_DOCUMENT_TYPE.to_string(),
            upload_date: Utc::now(),
        }
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = doc_type.into();
        self
    }
}
