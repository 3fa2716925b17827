//! GridFS Object Store Implementation
//!
//! Stores uploaded files in a MongoDB GridFS bucket, keyed by the standard
//! `{folder}/{timestamp_ms}_{safe}` object key. URLs are minted under the
//! configured public base URL; serving them is the API gateway's job, not
//! this layer's.

use crate::error::UploadError;
use crate::object::{object_key, ObjectStore, StoredObject};
use async_trait::async_trait;
use chrono::Utc;
use futures::io::AsyncWriteExt;
use mongodb::gridfs::GridFsBucket;
use mongodb::options::GridFsBucketOptions;
use mongodb::Database;
use tracing::debug;

/// GridFS-backed object store
pub struct GridFsObjectStore {
    bucket: GridFsBucket,
    public_base_url: String,
}

impl GridFsObjectStore {
    pub fn new(db: &Database, bucket_name: &str, public_base_url: impl Into<String>) -> Self {
        let options = GridFsBucketOptions::builder()
            .bucket_name(bucket_name.to_string())
            .build();
        Self {
            bucket: db.gridfs_bucket(options),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for GridFsObjectStore {
    async fn upload(
        &self,
        folder: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, UploadError> {
        let key = object_key(folder, filename, Utc::now());

        let mut stream = self
            .bucket
            .open_upload_stream(&key)
            .await
            .map_err(|e| UploadError::new(key.as_str(), e))?;
        stream
            .write_all(&bytes)
            .await
            .map_err(|e| UploadError::new(key.as_str(), e))?;
        stream
            .close()
            .await
            .map_err(|e| UploadError::new(key.as_str(), e))?;

        debug!(key = %key, size = bytes.len(), "Stored object in GridFS");

        Ok(StoredObject {
            url: format!("{}/{}", self.public_base_url, key),
            key,
            filename: filename.to_string(),
        })
    }
}
