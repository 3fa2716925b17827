//! Index Provisioning
//!
//! Ensures the MongoDB indexes the platform queries benefit from. Called on
//! startup. Failures are logged and reported, never fatal: queries stay
//! correct without indexes, they just scan (see the ordering note in the
//! crate docs).

use crate::collections;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Database, IndexModel};
use tracing::{info, warn};

/// Outcome of index provisioning
#[derive(Debug, Default)]
pub struct IndexReport {
    pub indexes_created: usize,
    /// Collections whose index build failed, with the error text
    pub warnings: Vec<String>,
}

impl IndexReport {
    pub fn is_success(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Create the standard indexes. Idempotent: MongoDB treats re-creating an
/// existing index as a no-op.
pub async fn ensure_indexes(db: &Database) -> IndexReport {
    let mut report = IndexReport::default();

    create(
        db,
        &mut report,
        collections::MAINTENANCE,
        vec![
            // Issues scoped to one property
            IndexModel::builder()
                .keys(doc! { "propertyId": 1 })
                .options(IndexOptions::builder().name("idx_property".to_string()).build())
                .build(),
            // Recency ordering for list views
            IndexModel::builder()
                .keys(doc! { "date": -1 })
                .options(IndexOptions::builder().name("idx_date".to_string()).build())
                .build(),
        ],
    )
    .await;

    create(
        db,
        &mut report,
        collections::DOCUMENTS,
        vec![IndexModel::builder()
            .keys(doc! { "propertyId": 1 })
            .options(IndexOptions::builder().name("idx_property".to_string()).build())
            .build()],
    )
    .await;

    create(
        db,
        &mut report,
        collections::CREDENTIALS,
        vec![IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .name("idx_email".to_string())
                    .unique(true)
                    .build(),
            )
            .build()],
    )
    .await;

    info!(
        indexes_created = report.indexes_created,
        warnings = report.warnings.len(),
        "Index provisioning complete"
    );

    report
}

async fn create(
    db: &Database,
    report: &mut IndexReport,
    collection: &str,
    indexes: Vec<IndexModel>,
) {
    let coll = db.collection::<mongodb::bson::Document>(collection);
    match coll.create_indexes(indexes).await {
        Ok(res) => {
            report.indexes_created += res.index_names.len();
        }
        Err(e) => {
            warn!(collection, error = %e, "Failed to create indexes");
            report.warnings.push(format!("{collection}: {e}"));
        }
    }
}
