//! Document Repository

use std::sync::Arc;

use pd_store::{collections, DocumentStore, RecordQuery};

use crate::document::entity::PropertyDocument;
use crate::shared::codec::{decode_all, encode};
use crate::shared::error::Result;

#[derive(Clone)]
pub struct DocumentRepository {
    store: Arc<dyn DocumentStore>,
}

impl DocumentRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn find_all(&self) -> Result<Vec<PropertyDocument>> {
        let records = self.store.list(collections::DOCUMENTS).await?;
        decode_all(collections::DOCUMENTS, records)
    }

    pub async fn find_by_property(&self, property_id: &str) -> Result<Vec<PropertyDocument>> {
        let query = RecordQuery::where_eq("propertyId", property_id);
        let records = self.store.query(collections::DOCUMENTS, &query).await?;
        decode_all(collections::DOCUMENTS, records)
    }

    pub async fn insert(&self, document: &PropertyDocument) -> Result<String> {
        let record = encode(document)?;
        let id = self
            .store
            .create(collections::DOCUMENTS, record, Some(&document.id))
            .await?;
        Ok(id)
    }
}
