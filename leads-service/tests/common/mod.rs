#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use flate2::read::GzDecoder;
use leads_service::services::{ArchiveExporter, DocumentStore, ExclusionSet};
use leads_service::startup::{build_router, AppState, DatabaseEnv};
use mongodb::bson::{oid::ObjectId, Document};
use service_core::error::AppError;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Store that keeps inserted documents in memory.
#[derive(Default)]
pub struct InMemoryStore {
    pub collections: Vec<String>,
    pub inserted: Mutex<Vec<(String, Document)>>,
}

impl InMemoryStore {
    pub fn with_collections(count: usize) -> Self {
        Self {
            collections: (0..count).map(|i| format!("collection_{i}")).collect(),
            inserted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert(&self, collection: &str, document: Document) -> Result<String, AppError> {
        self.inserted
            .lock()
            .unwrap()
            .push((collection.to_string(), document));
        Ok(ObjectId::new().to_hex())
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, AppError> {
        Ok(self.collections.clone())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    fn database_name(&self) -> &str {
        "leads_test"
    }
}

/// Store whose server is never reachable.
pub struct FailingStore;

#[async_trait]
impl DocumentStore for FailingStore {
    async fn insert(&self, _collection: &str, _document: Document) -> Result<String, AppError> {
        Err(AppError::DatabaseError(anyhow::anyhow!(
            "Server selection timeout: No available servers"
        )))
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, AppError> {
        Err(AppError::DatabaseError(anyhow::anyhow!(
            "Server selection timeout: No available servers. Topology: Unknown"
        )))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::ServiceUnavailable)
    }

    fn database_name(&self) -> &str {
        "leads_test"
    }
}

pub fn state(store: Option<Arc<dyn DocumentStore>>, export_root: &Path) -> AppState {
    AppState {
        store,
        exporter: Arc::new(ArchiveExporter::new(
            export_root,
            "backend",
            ExclusionSet::default(),
        )),
        database_env: DatabaseEnv {
            url_set: true,
            name_set: false,
        },
    }
}

pub fn router(store: Option<Arc<dyn DocumentStore>>, export_root: &Path) -> Router {
    build_router(state(store, export_root))
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// Entry name -> contents for every entry in a `.tar.gz`.
pub fn unpack(bytes: &[u8]) -> BTreeMap<String, Vec<u8>> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    let mut files = BTreeMap::new();
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        let name = entry.path().unwrap().to_string_lossy().into_owned();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        files.insert(name, data);
    }
    files
}
