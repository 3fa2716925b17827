//! Maintenance Aggregate
//!
//! Issues reported by tenants and worked by the owner.

pub mod entity;
pub mod repository;

// Re-export main types
pub use entity::{IssueStatus, MaintenanceIssue};
pub use repository::MaintenanceRepository;
