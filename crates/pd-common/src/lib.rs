//! Shared helpers used across the PropDesk crates.
//!
//! Keep this crate small: logging bootstrap and record id generation only.
//! Domain types live in `pd-platform`, storage abstractions in `pd-store`.

pub mod logging;

pub mod ids {
    //! Record id generation.
    //!
    //! Generated ids are UUID v4 strings. Callers may still supply their own
    //! human-readable ids at the store boundary (onboarded tenants are keyed
    //! by their login username, for example).

    /// Generate a fresh record id.
    pub fn new_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

}
