//! PropDesk Platform
//!
//! Domain layer for the property-management platform:
//! - Property portfolio records and tenant assignment
//! - Maintenance issue lifecycle (reported, in progress, resolved)
//! - Lease and identification document records
//! - Principal profiles for owners and tenants
//! - Credential-backed authentication with session observers
//! - Portfolio analytics computed from fetched data
//! - The dashboard facade front ends talk to
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access

// Core aggregates
pub mod property;
pub mod maintenance;
pub mod document;
pub mod principal;

// Authentication
pub mod auth;

// Read-side composition
pub mod analytics;
pub mod dashboard;

// Shared infrastructure
pub mod shared;

// Re-export common types from shared
pub use shared::error::{PlatformError, Result};

// Re-export main entity types for convenience
pub use property::entity::{OccupancyStatus, Property, PropertyKind, TenantAssignment};
pub use maintenance::entity::{IssueStatus, MaintenanceIssue};
pub use document::entity::{PropertyDocument, DEFAULT_DOCUMENT_TYPE};
pub use principal::entity::{IdentityDocument, Principal, PrincipalRole};

// Re-export repositories
pub use property::repository::PropertyRepository;
pub use maintenance::repository::MaintenanceRepository;
pub use document::repository::DocumentRepository;
pub use principal::repository::PrincipalRepository;

// Re-export auth surface
pub use auth::{
    AuthClient, AuthenticatedIdentity, Credential, IdentityProvider, ListenerGuard,
    NewRegistration, PasswordService, Session, StoredCredentialProvider,
};

// Re-export analytics and the dashboard facade
pub use analytics::{compute_analytics, AnalyticsSnapshot, CategoryBreakdown};
pub use dashboard::{
    AttachDocument, Dashboard, EnrichedIssue, NewIssue, NewProperty, OnboardTenant,
    OnboardingOutcome, OwnerView, TenantFile, TenantView, UNKNOWN_PROPERTY,
};
