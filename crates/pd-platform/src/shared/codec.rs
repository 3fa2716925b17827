//! Record Shape Validation
//!
//! Every record crossing the store boundary is decoded into its declared
//! entity type here. A record that does not fit fails fast as `Malformed`
//! instead of leaking undefined fields into views and aggregation.

use bson::Document;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::shared::error::{PlatformError, Result};

/// Decode one stored record into its entity type.
pub(crate) fn decode<T: DeserializeOwned>(collection: &str, record: Document) -> Result<T> {
    bson::from_document(record).map_err(|source| PlatformError::Malformed {
        collection: collection.to_string(),
        source,
    })
}

/// Decode a full result set, failing on the first malformed record.
pub(crate) fn decode_all<T: DeserializeOwned>(
    collection: &str,
    records: Vec<Document>,
) -> Result<Vec<T>> {
    records
        .into_iter()
        .map(|record| decode(collection, record))
        .collect()
}

/// Encode an entity for storage.
pub(crate) fn encode<T: Serialize>(entity: &T) -> Result<Document> {
    Ok(bson::to_document(entity)?)
}

/// Decode a live result set inside a watch callback, where errors cannot
/// propagate. Malformed records are logged and skipped so one bad document
/// does not silence the whole feed.
pub(crate) fn decode_lossy<T: DeserializeOwned>(collection: &str, records: Vec<Document>) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| match bson::from_document(record) {
            Ok(entity) => Some(entity),
            Err(error) => {
                warn!(collection, %error, "skipping malformed record in live result set");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize)]
    struct Probe {
        #[serde(rename = "_id")]
        id: String,
        label: String,
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let record = doc! { "_id": "p-1", "label": 42 };
        let err = decode::<Probe>("probes", record).unwrap_err();
        match err {
            PlatformError::Malformed { collection, .. } => assert_eq!(collection, "probes"),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let probe = Probe {
            id: "p-1".to_string(),
            label: "ok".to_string(),
        };
        let record = encode(&probe).unwrap();
        let back: Probe = decode("probes", record).unwrap();
        assert_eq!(back.id, "p-1");
        assert_eq!(back.label, "ok");
    }
}
