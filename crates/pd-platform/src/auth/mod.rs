//! Authentication & Identity
//!
//! Two-step sign-in (credential check, then profile fetch), registration,
//! and session change observers.

pub mod client;
pub mod password_service;
pub mod provider;

// Re-export main types
pub use client::{AuthClient, ListenerGuard, NewRegistration, Session};
pub use password_service::{Argon2Config, PasswordPolicy, PasswordService};
pub use provider::{AuthenticatedIdentity, Credential, IdentityProvider, StoredCredentialProvider};
