//! Principal Aggregate
//!
//! Owner and tenant profile records.

pub mod entity;
pub mod repository;

// Re-export main types
pub use entity::{IdentityDocument, Principal, PrincipalRole};
pub use repository::PrincipalRepository;
