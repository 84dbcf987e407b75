use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::{doc, Bson, DateTime as BsonDateTime, Document},
    options::ClientOptions,
    Client as MongoClient, Database,
};
use serde::Serialize;
use service_core::error::AppError;
use std::time::Duration;

/// Schema-less persistence addressed by collection name.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts one document and returns its generated id.
    async fn insert(&self, collection: &str, document: Document) -> Result<String, AppError>;
    async fn list_collection_names(&self) -> Result<Vec<String>, AppError>;
    async fn ping(&self) -> Result<(), AppError>;
    fn database_name(&self) -> &str;
}

/// Serializes `value`, stamps `created_at`/`updated_at` and inserts it.
pub async fn create_document<T>(
    store: &dyn DocumentStore,
    collection: &str,
    value: &T,
) -> Result<String, AppError>
where
    T: Serialize + Sync,
{
    let mut document = mongodb::bson::to_document(value)?;
    let now = BsonDateTime::from_chrono(Utc::now());
    document.insert("created_at", now);
    document.insert("updated_at", now);

    store.insert(collection, document).await
}

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    /// Builds the client. The driver connects lazily, so an unreachable
    /// server surfaces on first use, bounded by `server_selection_timeout`.
    pub async fn connect(
        uri: &str,
        database: &str,
        server_selection_timeout: Duration,
    ) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let mut options = ClientOptions::parse(uri).await.map_err(|e| {
            tracing::error!("Failed to parse MongoDB connection string: {}", e);
            AppError::from(e)
        })?;
        options.app_name = Some("leads-service".to_string());
        options.server_selection_timeout = Some(server_selection_timeout);

        let client = MongoClient::with_options(options).map_err(|e| {
            tracing::error!("Failed to build MongoDB client: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "MongoDB client ready");
        Ok(Self { client, db })
    }

    pub async fn close(self) {
        tracing::info!("Shutting down MongoDB client");
        self.client.shutdown().await;
    }
}

#[async_trait]
impl DocumentStore for MongoDb {
    async fn insert(&self, collection: &str, document: Document) -> Result<String, AppError> {
        let result = self
            .db
            .collection::<Document>(collection)
            .insert_one(document, None)
            .await
            .map_err(|e| {
                tracing::error!(collection = %collection, "Failed to insert document: {}", e);
                AppError::from(e)
            })?;

        Ok(id_to_string(result.inserted_id))
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, AppError> {
        Ok(self.db.list_collection_names(None).await?)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    fn database_name(&self) -> &str {
        self.db.name()
    }
}

fn id_to_string(id: Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        inserted: Mutex<Vec<(String, Document)>>,
    }

    #[async_trait]
    impl DocumentStore for RecordingStore {
        async fn insert(&self, collection: &str, document: Document) -> Result<String, AppError> {
            self.inserted
                .lock()
                .unwrap()
                .push((collection.to_string(), document));
            Ok("generated".to_string())
        }

        async fn list_collection_names(&self) -> Result<Vec<String>, AppError> {
            Ok(Vec::new())
        }

        async fn ping(&self) -> Result<(), AppError> {
            Ok(())
        }

        fn database_name(&self) -> &str {
            "test"
        }
    }

    #[derive(Serialize)]
    struct Sample {
        name: &'static str,
    }

    #[tokio::test]
    async fn create_document_stamps_timestamps() {
        let store = RecordingStore::default();
        let id = create_document(&store, "lead", &Sample { name: "Ada" })
            .await
            .unwrap();
        assert_eq!(id, "generated");

        let inserted = store.inserted.lock().unwrap();
        let (collection, document) = &inserted[0];
        assert_eq!(collection, "lead");
        assert_eq!(document.get_str("name").unwrap(), "Ada");
        let created = document.get_datetime("created_at").unwrap();
        let updated = document.get_datetime("updated_at").unwrap();
        assert_eq!(created, updated);
    }

    #[test]
    fn object_ids_render_as_hex() {
        let oid = ObjectId::new();
        assert_eq!(id_to_string(Bson::ObjectId(oid)), oid.to_hex());
        assert_eq!(id_to_string(Bson::String("abc".into())), "abc");
    }
}
