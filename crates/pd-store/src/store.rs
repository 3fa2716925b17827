//! Document Store Trait
//!
//! The backend-neutral interface over named collections of schemaless
//! records. Records are raw BSON documents at this layer; the domain
//! repositories in `pd-platform` give them shape and validate them at the
//! boundary.

use crate::error::StoreResult;
use crate::query::RecordQuery;
use async_trait::async_trait;
use bson::Document;
use tokio::sync::mpsc;

/// A stream of change notifications for one collection.
///
/// The feed carries no payload: a tick means "the collection changed, re-read
/// what you need". Bursts of writes may coalesce into fewer ticks; consumers
/// recompute full result sets, so a coalesced tick loses nothing.
pub struct ChangeFeed {
    rx: mpsc::Receiver<()>,
}

impl ChangeFeed {
    pub(crate) fn new(rx: mpsc::Receiver<()>) -> Self {
        Self { rx }
    }

    /// Wait for the next change. Returns `false` once the feed is closed
    /// (store dropped or backend stream permanently gone).
    pub async fn changed(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}

/// Backend-neutral document store over named collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point read by id. A missing record is `Ok(None)`, not an error.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Full scan of a collection.
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Equality-filtered scan with best-effort ordering (see crate docs).
    async fn query(&self, collection: &str, query: &RecordQuery) -> StoreResult<Vec<Document>>;

    /// Insert a record and return its id.
    ///
    /// With an explicit `id` this is a keyed put: any existing record under
    /// that id is replaced. Without one the store generates an id.
    async fn create(
        &self,
        collection: &str,
        record: Document,
        id: Option<&str>,
    ) -> StoreResult<String>;

    /// Partial update merging only the supplied fields into the record.
    /// Updating a missing record is `NotFound`.
    async fn update(&self, collection: &str, id: &str, patch: Document) -> StoreResult<()>;

    /// Open a change feed for a collection.
    async fn watch(&self, collection: &str) -> StoreResult<ChangeFeed>;
}
