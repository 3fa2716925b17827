//! Property Aggregate
//!
//! Portfolio properties and tenant assignment.

pub mod entity;
pub mod repository;

// Re-export main types
pub use entity::{OccupancyStatus, Property, PropertyKind, TenantAssignment};
pub use repository::PropertyRepository;
