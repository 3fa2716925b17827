//! Property Repository

use std::sync::Arc;

use bson::doc;
use pd_store::{collections, DocumentStore};

use crate::property::entity::{OccupancyStatus, Property, TenantAssignment};
use crate::shared::codec::{decode, decode_all, encode};
use crate::shared::error::{PlatformError, Result};

#[derive(Clone)]
pub struct PropertyRepository {
    store: Arc<dyn DocumentStore>,
}

impl PropertyRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: &str) -> Result<Property> {
        let record = self
            .store
            .get(collections::PROPERTIES, id)
            .await?
            .ok_or_else(|| PlatformError::not_found("Property", id))?;
        decode(collections::PROPERTIES, record)
    }

    pub async fn find_all(&self) -> Result<Vec<Property>> {
        let records = self.store.list(collections::PROPERTIES).await?;
        decode_all(collections::PROPERTIES, records)
    }

    pub async fn insert(&self, property: &Property) -> Result<String> {
        let record = encode(property)?;
        let id = self
            .store
            .create(collections::PROPERTIES, record, Some(&property.id))
            .await?;
        Ok(id)
    }

    /// Move a tenant in. Tenant reference, lease terms, and the `Occupied`
    /// status are one patch so no reader ever sees a half-assigned property.
    pub async fn assign_tenant(
        &self,
        property_id: &str,
        assignment: &TenantAssignment,
    ) -> Result<()> {
        let mut patch = doc! {
            "tenantName": &assignment.tenant_name,
            "tenantId": &assignment.tenant_id,
            "rentAmount": assignment.rent_amount,
            "status": bson::to_bson(&OccupancyStatus::Occupied)?,
        };
        if let Some(start) = assignment.lease_start_date {
            patch.insert("leaseStartDate", bson::to_bson(&start)?);
        }
        if let Some(end) = assignment.lease_end_date {
            patch.insert("leaseEndDate", bson::to_bson(&end)?);
        }

        self.store
            .update(collections::PROPERTIES, property_id, patch)
            .await?;
        Ok(())
    }
}
