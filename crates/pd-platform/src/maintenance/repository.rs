//! Maintenance Repository

use std::sync::Arc;

use bson::doc;
use pd_store::{collections, DocumentStore, RecordQuery};

use crate::maintenance::entity::{IssueStatus, MaintenanceIssue};
use crate::shared::codec::{decode_all, encode};
use crate::shared::error::Result;

/// Data access for maintenance issues.
///
/// Readers always receive issues newest-first. The store is asked to order,
/// but a backend that cannot combine the property filter with ordering may
/// return matches unordered, so the typed layer re-sorts by report date
/// after decoding. Low volumes make the re-sort cheap; a missing index never
/// fails a read.
#[derive(Clone)]
pub struct MaintenanceRepository {
    store: Arc<dyn DocumentStore>,
}

impl MaintenanceRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn find_all(&self) -> Result<Vec<MaintenanceIssue>> {
        let query = RecordQuery::all().order_by_desc("date");
        let records = self
            .store
            .query(collections::MAINTENANCE, &query)
            .await?;
        let mut issues: Vec<MaintenanceIssue> = decode_all(collections::MAINTENANCE, records)?;
        sort_newest_first(&mut issues);
        Ok(issues)
    }

    pub async fn find_by_property(&self, property_id: &str) -> Result<Vec<MaintenanceIssue>> {
        let query = RecordQuery::where_eq("propertyId", property_id).order_by_desc("date");
        let records = self
            .store
            .query(collections::MAINTENANCE, &query)
            .await?;
        let mut issues: Vec<MaintenanceIssue> = decode_all(collections::MAINTENANCE, records)?;
        sort_newest_first(&mut issues);
        Ok(issues)
    }

    pub async fn insert(&self, issue: &MaintenanceIssue) -> Result<String> {
        let record = encode(issue)?;
        let id = self
            .store
            .create(collections::MAINTENANCE, record, Some(&issue.id))
            .await?;
        Ok(id)
    }

    /// Status-only patch. Updating a missing issue is `NotFound`.
    pub async fn set_status(&self, id: &str, status: IssueStatus) -> Result<()> {
        let patch = doc! { "status": bson::to_bson(&status)? };
        self.store
            .update(collections::MAINTENANCE, id, patch)
            .await?;
        Ok(())
    }
}

fn sort_newest_first(issues: &mut [MaintenanceIssue]) {
    issues.sort_by(|a, b| b.date.cmp(&a.date));
}
