//! Principal Entity
//!
//! One stored profile per person using the platform, owner or tenant.
//! Stored in the `users` collection, keyed by a human-readable id for
//! onboarded tenants (their login username).

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role determines which dashboard a principal sees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalRole {
    /// Portfolio owner / landlord
    Owner,
    /// Tenant assigned to one property
    Tenant,
}

/// A labeled identification document URL (e.g. "aadhaar", "pan")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityDocument {
    pub label: String,
    pub url: String,
}

impl IdentityDocument {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Stored profile record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    #[serde(rename = "_id")]
    pub id: String,

    /// Email address. Optional in the stored profile; sign-in backfills it
    /// from the authenticated identity when missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Display name
    pub name: String,

    pub role: PrincipalRole,

    /// Property assignment (tenants only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Identification documents uploaded during onboarding
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identity_documents: Vec<IdentityDocument>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Principal {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: PrincipalRole) -> Self {
        Self {
            id: id.into(),
            email: None,
            name: name.into(),
            role,
            property_id: None,
            phone: None,
            identity_documents: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_property(mut self, property_id: impl Into<String>) -> Self {
        self.property_id = Some(property_id.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_identity_documents(mut self, documents: Vec<IdentityDocument>) -> Self {
        self.identity_documents = documents;
        self
    }

    pub fn is_owner(&self) -> bool {
        self.role == PrincipalRole::Owner
    }

    pub fn is_tenant(&self) -> bool {
        self.role == PrincipalRole::Tenant
    }
}
