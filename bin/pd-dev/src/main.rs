//! PropDesk Development Watcher
//!
//! Connects to MongoDB, provisions the standard indexes, then tails the live
//! dashboard queries: every delivered result set is logged with its size and
//! the analytics snapshot recomputed from the latest data. Useful for
//! watching the data layer react while a front end (or a mongo shell) writes
//! records.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PROPDESK_CONFIG` | (searches standard paths) | Config file path |
//! | `PROPDESK_MONGODB_URI` | `mongodb://localhost:27017/...` | MongoDB connection URL |
//! | `PROPDESK_MONGODB_DATABASE` | `propdesk` | Database name |
//! | `PROPDESK_STORAGE_BUCKET` | `uploads` | GridFS bucket for uploaded files |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use tokio::signal;
use tracing::{info, warn};

use pd_config::AppConfig;
use pd_platform::{compute_analytics, Dashboard, MaintenanceIssue, Property};
use pd_store::{ensure_indexes, DocumentStore, GridFsObjectStore, MongoDocumentStore, ObjectStore};

#[tokio::main]
async fn main() -> Result<()> {
    pd_common::logging::init_logging("pd-dev");

    info!("Starting PropDesk development watcher");

    let config = AppConfig::load()?;

    info!(
        "Connecting to MongoDB: {}/{}",
        config.mongodb.uri, config.mongodb.database
    );
    let client = mongodb::Client::with_uri_str(&config.mongodb.uri).await?;
    let db = client.database(&config.mongodb.database);

    let report = ensure_indexes(&db).await;
    if report.is_success() {
        info!(created = report.indexes_created, "Indexes provisioned");
    } else {
        for warning in &report.warnings {
            warn!("Index provisioning: {}", warning);
        }
    }

    let store: Arc<dyn DocumentStore> = Arc::new(MongoDocumentStore::new(&db));
    let objects: Arc<dyn ObjectStore> = Arc::new(GridFsObjectStore::new(
        &db,
        &config.storage.bucket,
        config.storage.public_base_url.clone(),
    ));
    let dashboard = Dashboard::new(store, objects);

    // Latest result sets, shared so either watcher refreshes the snapshot.
    let properties: Arc<Mutex<Vec<Property>>> = Arc::new(Mutex::new(Vec::new()));
    let issues: Arc<Mutex<Vec<MaintenanceIssue>>> = Arc::new(Mutex::new(Vec::new()));

    let property_watch = {
        let properties = properties.clone();
        let issues = issues.clone();
        dashboard.watch_properties(move |delivered| {
            info!(count = delivered.len(), "Properties result set");
            *properties.lock() = delivered;
            log_snapshot(&properties, &issues);
        })
    };

    let maintenance_watch = {
        let properties = properties.clone();
        let issues = issues.clone();
        dashboard.watch_maintenance(move |delivered| {
            info!(count = delivered.len(), "Maintenance result set (newest first)");
            if let Some(newest) = delivered.first() {
                info!(
                    issue = %newest.id,
                    date = %newest.date,
                    status = ?newest.status,
                    "Most recent issue"
                );
            }
            *issues.lock() = delivered;
            log_snapshot(&properties, &issues);
        })
    };

    info!("Watching properties and maintenance");
    info!("Press Ctrl+C to shutdown");

    shutdown_signal().await;
    info!("Shutdown signal received...");

    property_watch.unsubscribe();
    maintenance_watch.unsubscribe();

    info!("PropDesk development watcher shutdown complete");
    Ok(())
}

/// Recompute the portfolio snapshot from the latest result sets and log it
/// as a single JSON line.
fn log_snapshot(properties: &Mutex<Vec<Property>>, issues: &Mutex<Vec<MaintenanceIssue>>) {
    let snapshot = {
        let properties = properties.lock();
        let issues = issues.lock();
        compute_analytics(&properties, &issues)
    };
    match serde_json::to_string(&snapshot) {
        Ok(json) => info!(analytics = %json, "Portfolio snapshot"),
        Err(e) => warn!("Could not serialize analytics snapshot: {}", e),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
