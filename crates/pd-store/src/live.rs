//! Live Queries
//!
//! Change-driven subscriptions over `DocumentStore` collections. A
//! subscription delivers the **full current result set** of its query, never
//! a diff: once immediately on registration, then once after every change to
//! the watched collection. Consumers replace state wholesale, so a missed or
//! coalesced change notification can never leave them permanently stale.
//!
//! Callbacks for one subscription run sequentially on the subscription's own
//! task. Delivery order across different subscriptions is unspecified.

use crate::error::StoreResult;
use crate::query::{sort_in_memory, RecordQuery};
use crate::store::DocumentStore;
use bson::Document;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::warn;

/// Handle for cancelling a live query.
///
/// Cancellation is caller-driven: dropping the handle does **not** stop
/// delivery, only [`Subscription::unsubscribe`] does.
pub struct Subscription {
    cancelled: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Subscription {
    /// Stop delivery. Idempotent: calling this more than once is a no-op,
    /// never an error. After the first call the callback is not invoked
    /// again.
    pub fn unsubscribe(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        !self.cancelled.load(Ordering::SeqCst)
    }
}

/// Register a live query on `collection`.
///
/// With a query, only matching records are delivered, re-sorted in memory
/// when the query carries an ordering (the fallback path, see crate docs).
/// Without one the whole collection is delivered unordered.
///
/// The callback receives the result set as raw records; typed delivery is
/// layered on by the domain repositories.
pub fn subscribe<F>(
    store: Arc<dyn DocumentStore>,
    collection: impl Into<String>,
    query: Option<RecordQuery>,
    callback: F,
) -> Subscription
where
    F: Fn(Vec<Document>) + Send + Sync + 'static,
{
    let collection = collection.into();
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();

    let task = tokio::spawn(async move {
        // Open the feed before the initial snapshot so no write can fall
        // between the two.
        let mut feed = match store.watch(&collection).await {
            Ok(feed) => feed,
            Err(e) => {
                warn!(collection = %collection, error = %e, "Could not open change feed; subscription is inert");
                return;
            }
        };

        loop {
            match current_result_set(store.as_ref(), &collection, query.as_ref()).await {
                Ok(records) => {
                    if flag.load(Ordering::SeqCst) {
                        return;
                    }
                    callback(records);
                }
                Err(e) => {
                    warn!(collection = %collection, error = %e, "Live query refresh failed, keeping subscription");
                }
            }

            if !feed.changed().await {
                return;
            }
        }
    });

    Subscription {
        cancelled,
        task: Mutex::new(Some(task)),
    }
}

async fn current_result_set(
    store: &dyn DocumentStore,
    collection: &str,
    query: Option<&RecordQuery>,
) -> StoreResult<Vec<Document>> {
    match query {
        Some(query) => {
            let mut records = store.query(collection, query).await?;
            if let Some(spec) = &query.order_by {
                sort_in_memory(&mut records, spec);
            }
            Ok(records)
        }
        None => store.list(collection).await,
    }
}
