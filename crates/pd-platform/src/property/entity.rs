//! Property Entity

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Property classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    Residential,
    Commercial,
    Industrial,
}

impl Default for PropertyKind {
    fn default() -> Self {
        Self::Residential
    }
}

/// Occupancy status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OccupancyStatus {
    Vacant,
    Occupied,
}

impl Default for OccupancyStatus {
    fn default() -> Self {
        Self::Vacant
    }
}

/// A property in the owner's portfolio
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "_id")]
    pub id: String,

    pub address: String,

    #[serde(rename = "type", default)]
    pub kind: PropertyKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_type: Option<String>,

    /// Monthly rent. Records written before a lease was agreed may lack
    /// this field; aggregation treats it as zero.
    #[serde(default)]
    pub rent_amount: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_end_date: Option<NaiveDate>,

    pub landlord_name: String,

    #[serde(default)]
    pub status: OccupancyStatus,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Property {
    pub fn new(
        address: impl Into<String>,
        kind: PropertyKind,
        rent_amount: i64,
        landlord_name: impl Into<String>,
    ) -> Self {
        Self {
            id: pd_common::ids::new_id(),
            address: address.into(),
            kind,
            tenant_name: None,
            tenant_id: None,
            lease_type: None,
            rent_amount,
            lease_start_date: None,
            lease_end_date: None,
            landlord_name: landlord_name.into(),
            status: OccupancyStatus::Vacant,
            created_at: Utc::now(),
        }
    }

    pub fn with_lease_type(mut self, lease_type: impl Into<String>) -> Self {
        self.lease_type = Some(lease_type.into());
        self
    }

    /// Mark the property occupied by the given tenant (test fixtures and
    /// seeded data; the live path patches via the repository).
    pub fn with_tenant(mut self, tenant_name: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        self.tenant_name = Some(tenant_name.into());
        self.tenant_id = Some(tenant_id.into());
        self.status = OccupancyStatus::Occupied;
        self
    }

    pub fn is_vacant(&self) -> bool {
        self.status == OccupancyStatus::Vacant
    }
}

/// The single patch applied to a property when a tenant moves in: tenant
/// reference, lease terms, and the switch to `Occupied` land together.
#[derive(Debug, Clone)]
pub struct TenantAssignment {
    pub tenant_id: String,
    pub tenant_name: String,
    pub rent_amount: i64,
    pub lease_start_date: Option<NaiveDate>,
    pub lease_end_date: Option<NaiveDate>,
}
