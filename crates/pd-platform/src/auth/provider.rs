//! Identity Provider
//!
//! The external authentication boundary. Sign-in and registration talk to
//! whatever holds credentials through this trait; the bundled implementation
//! keeps Argon2id-hashed credentials in the `credentials` collection.

use std::sync::Arc;

use async_trait::async_trait;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pd_store::{collections, DocumentStore, RecordQuery};

use crate::auth::password_service::PasswordService;
use crate::shared::codec::{decode, encode};
use crate::shared::error::{PlatformError, Result};

/// What the provider knows about a successfully authenticated user.
/// The stored profile is fetched separately and merged on top.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    pub user_id: String,
    pub email: String,
}

/// Authentication boundary
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Check an identifier/secret pair. Wrong password and unknown email
    /// are both `InvalidCredentials`; the caller cannot tell which.
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthenticatedIdentity>;

    /// Create a new credential. An email that already has one is `Duplicate`.
    async fn register(&self, email: &str, password: &str) -> Result<AuthenticatedIdentity>;
}

/// Stored login credential
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    #[serde(rename = "_id")]
    pub id: String,

    /// Unique per credential, enforced by the `credentials` email index
    pub email: String,

    /// PHC-format Argon2id hash
    pub password_hash: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: pd_common::ids::new_id(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}

/// Identity provider backed by the document store
pub struct StoredCredentialProvider {
    store: Arc<dyn DocumentStore>,
    passwords: PasswordService,
}

impl StoredCredentialProvider {
    pub fn new(store: Arc<dyn DocumentStore>, passwords: PasswordService) -> Self {
        Self { store, passwords }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>> {
        let query = RecordQuery::where_eq("email", email);
        let mut records = self.store.query(collections::CREDENTIALS, &query).await?;
        match records.pop() {
            Some(record) => Ok(Some(decode(collections::CREDENTIALS, record)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl IdentityProvider for StoredCredentialProvider {
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthenticatedIdentity> {
        let credential = self
            .find_by_email(email)
            .await?
            .ok_or(PlatformError::InvalidCredentials)?;

        if !self
            .passwords
            .verify_password(password, &credential.password_hash)?
        {
            return Err(PlatformError::InvalidCredentials);
        }

        Ok(AuthenticatedIdentity {
            user_id: credential.id,
            email: credential.email,
        })
    }

    async fn register(&self, email: &str, password: &str) -> Result<AuthenticatedIdentity> {
        if self.find_by_email(email).await?.is_some() {
            return Err(PlatformError::duplicate("Credential", email));
        }

        let hash = self.passwords.hash_password(password)?;
        let credential = Credential::new(email, hash);
        let record = encode(&credential)?;
        self.store
            .create(collections::CREDENTIALS, record, Some(&credential.id))
            .await?;

        Ok(AuthenticatedIdentity {
            user_id: credential.id,
            email: credential.email,
        })
    }
}
