//! MongoDB Document Store Implementation
//!
//! Maps the `DocumentStore` trait onto a MongoDB database. Backend errors are
//! classified here: command error 13 becomes `PermissionDenied` with the
//! operator hint, duplicate-key write errors become `Duplicate`, everything
//! else is `Backend`.
//!
//! The change feed runs on MongoDB change streams and reconnects with capped
//! exponential backoff. The feed carries no payloads, so events missed while
//! reconnecting are harmless: consumers re-read full result sets.

use crate::error::{StoreError, StoreResult};
use crate::query::{RecordQuery, SortDirection};
use crate::store::{ChangeFeed, DocumentStore};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use mongodb::bson::{doc, Document};
use mongodb::options::FindOptions;
use mongodb::{Collection, Database};
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::{debug, warn};

/// Reconnection settings for the change feed
const INITIAL_BACKOFF_MS: u64 = 1000;
const MAX_BACKOFF_MS: u64 = 30_000;

const UNAUTHORIZED_CODE: i32 = 13;
const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB-backed document store
pub struct MongoDocumentStore {
    db: Database,
}

impl MongoDocumentStore {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        self.collection(collection)
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| classify(collection, e))
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let cursor = self
            .collection(collection)
            .find(doc! {})
            .await
            .map_err(|e| classify(collection, e))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| classify(collection, e))
    }

    async fn query(&self, collection: &str, query: &RecordQuery) -> StoreResult<Vec<Document>> {
        let mut filter = Document::new();
        if let Some((field, value)) = &query.filter {
            filter.insert(field.clone(), value.clone());
        }

        let mut options = FindOptions::default();
        if let Some(spec) = &query.order_by {
            let direction = match spec.direction {
                SortDirection::Ascending => 1,
                SortDirection::Descending => -1,
            };
            let mut sort = Document::new();
            sort.insert(spec.field.clone(), direction);
            options.sort = Some(sort);
        }

        let cursor = self
            .collection(collection)
            .find(filter)
            .with_options(options)
            .await
            .map_err(|e| classify(collection, e))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| classify(collection, e))
    }

    async fn create(
        &self,
        collection: &str,
        mut record: Document,
        id: Option<&str>,
    ) -> StoreResult<String> {
        match id {
            Some(id) => {
                // Keyed put: replaces any existing record under this id.
                record.insert("_id", id);
                self.collection(collection)
                    .replace_one(doc! { "_id": id }, &record)
                    .upsert(true)
                    .await
                    .map_err(|e| classify(collection, e))?;
                Ok(id.to_string())
            }
            None => {
                let id = pd_common::ids::new_id();
                record.insert("_id", id.clone());
                self.collection(collection)
                    .insert_one(&record)
                    .await
                    .map_err(|e| classify(collection, e))?;
                Ok(id)
            }
        }
    }

    async fn update(&self, collection: &str, id: &str, patch: Document) -> StoreResult<()> {
        let result = self
            .collection(collection)
            .update_one(doc! { "_id": id }, doc! { "$set": patch })
            .await
            .map_err(|e| classify(collection, e))?;

        if result.matched_count == 0 {
            return Err(StoreError::not_found(collection, id));
        }
        Ok(())
    }

    async fn watch(&self, collection: &str) -> StoreResult<ChangeFeed> {
        let (tx, rx) = mpsc::channel(16);
        let coll = self.collection(collection);
        tokio::spawn(pump_changes(coll, tx));
        Ok(ChangeFeed::new(rx))
    }
}

/// Forward change stream events as empty ticks, reconnecting on failure.
/// Exits once the receiving side is gone.
async fn pump_changes(collection: Collection<Document>, tx: mpsc::Sender<()>) {
    let mut backoff_ms = INITIAL_BACKOFF_MS;

    loop {
        let mut stream = match collection.watch().await {
            Ok(stream) => {
                backoff_ms = INITIAL_BACKOFF_MS;
                debug!(collection = collection.name(), "Change stream opened");
                stream
            }
            Err(e) => {
                warn!(
                    collection = collection.name(),
                    backoff_ms,
                    error = %e,
                    "Failed to open change stream, retrying"
                );
                if wait_or_closed(&tx, backoff_ms).await {
                    return;
                }
                backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
                continue;
            }
        };

        loop {
            tokio::select! {
                _ = tx.closed() => return,
                event = stream.next() => match event {
                    Some(Ok(_)) => {
                        if tx.send(()).await.is_err() {
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(collection = collection.name(), error = %e, "Change stream error, reconnecting");
                        break;
                    }
                    None => {
                        warn!(collection = collection.name(), "Change stream ended, reconnecting");
                        break;
                    }
                }
            }
        }

        if wait_or_closed(&tx, backoff_ms).await {
            return;
        }
        backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
    }
}

/// Sleep for the backoff period. Returns `true` if the receiver went away.
async fn wait_or_closed(tx: &mpsc::Sender<()>, backoff_ms: u64) -> bool {
    tokio::select! {
        _ = tx.closed() => true,
        _ = tokio::time::sleep(Duration::from_millis(backoff_ms)) => false,
    }
}

fn classify(collection: &str, err: mongodb::error::Error) -> StoreError {
    use mongodb::error::{ErrorKind, WriteFailure};

    match err.kind.as_ref() {
        ErrorKind::Command(c) if c.code == UNAUTHORIZED_CODE => {
            StoreError::permission_denied(collection)
        }
        ErrorKind::Write(WriteFailure::WriteError(w)) if w.code == DUPLICATE_KEY_CODE => {
            StoreError::duplicate(collection, w.message.clone())
        }
        _ => StoreError::Backend {
            collection: collection.to_string(),
            source: err,
        },
    }
}
