//! In-Memory Document Store
//!
//! Backs tests and offline development. Mirrors the semantics of the MongoDB
//! store: keyed-put `create`, merge-style `update`, `NotFound` on updating a
//! missing record. Records keep insertion order and `query` ignores the
//! ordering hint, which makes this the store without native ordering that the
//! in-memory sort fallback is exercised against.
//!
//! Write-failure injection: [`InMemoryDocumentStore::deny`] makes every
//! future operation of one kind on one collection fail with
//! `PermissionDenied`, for driving partial-failure paths in tests.

use crate::error::{StoreError, StoreResult};
use crate::query::RecordQuery;
use crate::store::{ChangeFeed, DocumentStore};
use async_trait::async_trait;
use bson::Document;
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Operation kinds, used to scope injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    List,
    Query,
    Create,
    Update,
}

/// In-process document store over ordered maps.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    data: RwLock<HashMap<String, IndexMap<String, Document>>>,
    watchers: Mutex<HashMap<String, Vec<mpsc::Sender<()>>>>,
    denied: RwLock<HashSet<(String, StoreOp)>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future `op` on `collection` fail with `PermissionDenied`.
    pub fn deny(&self, collection: &str, op: StoreOp) {
        self.denied.write().insert((collection.to_string(), op));
    }

    /// Clear all injected failures.
    pub fn clear_denials(&self) {
        self.denied.write().clear();
    }

    fn ensure_allowed(&self, collection: &str, op: StoreOp) -> StoreResult<()> {
        if self.denied.read().contains(&(collection.to_string(), op)) {
            return Err(StoreError::permission_denied(collection));
        }
        Ok(())
    }

    /// Wake the watchers of a collection. A full wakeup queue is fine: a
    /// pending tick already guarantees a re-read.
    fn notify(&self, collection: &str) {
        let mut watchers = self.watchers.lock();
        if let Some(senders) = watchers.get_mut(collection) {
            senders.retain(|tx| match tx.try_send(()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => true,
                Err(TrySendError::Closed(_)) => false,
            });
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        self.ensure_allowed(collection, StoreOp::Get)?;
        Ok(self
            .data
            .read()
            .get(collection)
            .and_then(|records| records.get(id))
            .cloned())
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        self.ensure_allowed(collection, StoreOp::List)?;
        Ok(self
            .data
            .read()
            .get(collection)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn query(&self, collection: &str, query: &RecordQuery) -> StoreResult<Vec<Document>> {
        self.ensure_allowed(collection, StoreOp::Query)?;
        Ok(self
            .data
            .read()
            .get(collection)
            .map(|records| {
                records
                    .values()
                    .filter(|record| query.matches(record))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create(
        &self,
        collection: &str,
        mut record: Document,
        id: Option<&str>,
    ) -> StoreResult<String> {
        self.ensure_allowed(collection, StoreOp::Create)?;
        let id = id
            .map(str::to_string)
            .unwrap_or_else(pd_common::ids::new_id);
        record.insert("_id", id.clone());
        self.data
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), record);
        self.notify(collection);
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, patch: Document) -> StoreResult<()> {
        self.ensure_allowed(collection, StoreOp::Update)?;
        {
            let mut data = self.data.write();
            let record = data
                .get_mut(collection)
                .and_then(|records| records.get_mut(id))
                .ok_or_else(|| StoreError::not_found(collection, id))?;
            for (key, value) in patch {
                record.insert(key, value);
            }
        }
        self.notify(collection);
        Ok(())
    }

    async fn watch(&self, collection: &str) -> StoreResult<ChangeFeed> {
        let (tx, rx) = mpsc::channel(16);
        self.watchers
            .lock()
            .entry(collection.to_string())
            .or_default()
            .push(tx);
        Ok(ChangeFeed::new(rx))
    }
}
