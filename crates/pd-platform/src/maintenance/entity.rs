//! Maintenance Issue Entity

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Issue lifecycle status. Stored as the display strings the rest of the
/// system matches on, including the two-word "In Progress".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl Default for IssueStatus {
    fn default() -> Self {
        Self::Open
    }
}

/// A maintenance issue reported against a property
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceIssue {
    #[serde(rename = "_id")]
    pub id: String,

    pub property_id: String,

    /// Free-form category label ("plumbing", "electrical", ...). Issues
    /// without one are grouped under "Other" in analytics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    pub description: String,

    /// Report date, stored as an ISO date string
    pub date: NaiveDate,

    #[serde(default)]
    pub status: IssueStatus,

    /// Repair cost. Unpriced issues count as zero in aggregation.
    #[serde(default)]
    pub cost: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl MaintenanceIssue {
    pub fn new(
        property_id: impl Into<String>,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: pd_common::ids::new_id(),
            property_id: property_id.into(),
            category: None,
            description: description.into(),
            date,
            status: IssueStatus::Open,
            cost: 0,
            vendor: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    pub fn with_cost(mut self, cost: i64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_status(mut self, status: IssueStatus) -> Self {
        self.status = status;
        self
    }

    /// Active means work is underway right now, not merely reported.
    pub fn is_active(&self) -> bool {
        self.status == IssueStatus::InProgress
    }
}
