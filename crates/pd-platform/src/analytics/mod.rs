//! Portfolio Analytics
//!
//! Pure aggregation over already-fetched records. The snapshot is computed
//! on demand and never stored, so it can never go stale relative to the
//! data it was derived from.

use indexmap::IndexMap;
use serde::Serialize;

use crate::maintenance::MaintenanceIssue;
use crate::property::Property;

/// Issues without a category are grouped under this label.
pub const FALLBACK_CATEGORY: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub count: usize,
    pub total_cost: i64,
}

/// The owner dashboard headline numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsSnapshot {
    pub total_properties: usize,
    pub total_monthly_rent: i64,
    /// Issues whose status is exactly "In Progress"
    pub active_issues: usize,
    pub total_maintenance_cost: i64,
    /// Categories appear in first-seen input order
    pub issues_by_category: Vec<CategoryBreakdown>,
}

/// Deterministic function of its inputs; no I/O.
pub fn compute_analytics(
    properties: &[Property],
    issues: &[MaintenanceIssue],
) -> AnalyticsSnapshot {
    let total_monthly_rent = properties.iter().map(|p| p.rent_amount).sum();
    let active_issues = issues.iter().filter(|i| i.is_active()).count();
    let total_maintenance_cost = issues.iter().map(|i| i.cost).sum();

    let mut by_category: IndexMap<&str, (usize, i64)> = IndexMap::new();
    for issue in issues {
        let category = issue.category.as_deref().unwrap_or(FALLBACK_CATEGORY);
        let entry = by_category.entry(category).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += issue.cost;
    }

    let issues_by_category = by_category
        .into_iter()
        .map(|(category, (count, total_cost))| CategoryBreakdown {
            category: category.to_string(),
            count,
            total_cost,
        })
        .collect();

    AnalyticsSnapshot {
        total_properties: properties.len(),
        total_monthly_rent,
        active_issues,
        total_maintenance_cost,
        issues_by_category,
    }
}
