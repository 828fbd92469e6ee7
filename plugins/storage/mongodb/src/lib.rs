mod convert;

use std::future::Future;
use std::pin::Pin;

use futures::TryStreamExt;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};

use sheetsync_api::{PluginError, Record, RecordId, RecordStore};

pub use convert::{bson_to_value, document_to_record};

/// MongoDB RecordStore backend.
///
/// Record identifiers are the collection's `ObjectId` `_id` values, whose
/// leading four bytes are the creation second, so an `_id` range query is a
/// creation-time query.
pub struct MongoStore {
    collection: Collection<Document>,
}

impl MongoStore {
    /// Parse the connection string and bind to `database.collection`.
    ///
    /// The driver connects lazily; unreachable servers surface on the first
    /// query as an I/O error.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, PluginError> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| PluginError::config(format!("mongodb uri: {e}")))?;
        options.app_name = Some("sheetsync".to_string());

        let client = Client::with_options(options)
            .map_err(|e| PluginError::config(format!("mongodb client: {e}")))?;
        tracing::debug!(database, collection, "mongodb client ready");

        Ok(Self {
            collection: client.database(database).collection::<Document>(collection),
        })
    }
}

impl RecordStore for MongoStore {
    fn find_from(
        &self,
        min_id: RecordId,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Record>, PluginError>> + Send + '_>> {
        Box::pin(async move {
            let floor = ObjectId::from_bytes(min_id.bytes());
            let cursor = self
                .collection
                .find(doc! { "_id": { "$gte": floor } })
                .sort(doc! { "_id": 1 })
                .await
                .map_err(|e| PluginError::io(format!("mongodb find: {e}")))?;

            let docs: Vec<Document> = cursor
                .try_collect()
                .await
                .map_err(|e| PluginError::io(format!("mongodb cursor: {e}")))?;

            tracing::debug!(floor = %floor, count = docs.len(), "mongodb query done");
            docs.into_iter().map(document_to_record).collect()
        })
    }
}
