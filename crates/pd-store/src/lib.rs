//! PropDesk Storage Layer
//!
//! Typed access to the platform's backing stores, abstracted behind traits so
//! the domain layer never talks to a concrete backend:
//!
//! - [`DocumentStore`]: named collections of schemaless records with point
//!   reads, scans, single-field equality queries, keyed puts, and partial
//!   updates. Backed by MongoDB in production ([`MongoDocumentStore`]) and by
//!   an in-process map for tests and offline development
//!   ([`InMemoryDocumentStore`]).
//! - [`ObjectStore`]: uploaded-file storage returning retrievable URLs.
//!   Backed by GridFS ([`GridFsObjectStore`]) or memory
//!   ([`InMemoryObjectStore`]).
//! - [`live::subscribe`]: change-driven live queries that re-deliver the full
//!   current result set of a collection query on every underlying change.
//!
//! Ordering note: `query` ordering is best effort at the store. A backend
//! without native ordering returns matches unordered and callers re-sort in
//! memory via [`query::sort_in_memory`]; a missing index must never turn into
//! a hard failure.

pub mod error;
pub mod query;
pub mod store;
pub mod mongo;
pub mod memory;
pub mod live;
pub mod object;
pub mod gridfs;
pub mod indexes;

pub mod collections {
    //! Collection names shared by the store layer and the domain repositories.

    /// Principal profiles, keyed by principal id.
    pub const USERS: &str = "users";
    /// Properties under management.
    pub const PROPERTIES: &str = "properties";
    /// Maintenance issues, referencing properties by id.
    pub const MAINTENANCE: &str = "maintenance";
    /// Uploaded document records, referencing properties by id.
    pub const DOCUMENTS: &str = "documents";
    /// Identity-provider credentials (email + password hash).
    pub const CREDENTIALS: &str = "credentials";
}

// Re-exports
pub use error::{StoreError, StoreResult, UploadError};
pub use query::{RecordQuery, SortDirection, SortSpec};
pub use store::{ChangeFeed, DocumentStore};
pub use mongo::MongoDocumentStore;
pub use memory::{InMemoryDocumentStore, StoreOp};
pub use live::{subscribe, Subscription};
pub use object::{sanitize_filename, InMemoryObjectStore, ObjectStore, StoredObject};
pub use gridfs::GridFsObjectStore;
pub use indexes::ensure_indexes;
