//! Shared Module
//!
//! Cross-cutting concerns for the platform crate.

pub mod error;

pub(crate) mod codec;

// Re-export commonly used items
pub use error::{PlatformError, Result};
