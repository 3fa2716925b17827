//! Document Aggregate
//!
//! Lease paperwork and other files attached to properties.

pub mod entity;
pub mod repository;

// Re-export main types
pub use entity::{PropertyDocument, DEFAULT_DOCUMENT_TYPE};
pub use repository::DocumentRepository;
