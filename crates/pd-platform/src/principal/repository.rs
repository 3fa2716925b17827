//! Principal Repository

use std::sync::Arc;

use pd_store::{collections, DocumentStore};

use crate::principal::entity::Principal;
use crate::shared::codec::{decode, encode};
use crate::shared::error::{PlatformError, Result};

/// Data access for principals in the `users` collection.
///
/// Inserts are keyed puts: onboarding chooses the record id (the tenant's
/// login username), and writing the same id again replaces the profile.
#[derive(Clone)]
pub struct PrincipalRepository {
    store: Arc<dyn DocumentStore>,
}

impl PrincipalRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Point read. Missing profile is `Ok(None)`; sign-in turns that into
    /// its own fatal error.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Principal>> {
        match self.store.get(collections::USERS, id).await? {
            Some(record) => Ok(Some(decode(collections::USERS, record)?)),
            None => Ok(None),
        }
    }

    /// Point read that treats a missing profile as `NotFound`.
    pub async fn get(&self, id: &str) -> Result<Principal> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| PlatformError::not_found("Principal", id))
    }

    pub async fn insert(&self, principal: &Principal) -> Result<String> {
        let record = encode(principal)?;
        let id = self
            .store
            .create(collections::USERS, record, Some(&principal.id))
            .await?;
        Ok(id)
    }
}
