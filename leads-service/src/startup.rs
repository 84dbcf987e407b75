//! Router construction and server lifecycle.

use crate::config::{self, LeadsConfig};
use crate::handlers;
use crate::services::{ArchiveExporter, DocumentStore, ExclusionSet, MongoDb};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Presence of the store variables, reported by `GET /test`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DatabaseEnv {
    pub url_set: bool,
    pub name_set: bool,
}

impl DatabaseEnv {
    pub fn from_env() -> Self {
        Self {
            url_set: config::database_url_set(),
            name_set: config::database_name_set(),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no store could be configured; lead submissions then fail
    /// and `/test` reports the database as unavailable.
    pub store: Option<Arc<dyn DocumentStore>>,
    pub exporter: Arc<ArchiveExporter>,
    pub database_env: DatabaseEnv,
}

impl AppState {
    pub fn new(config: &LeadsConfig, store: Option<Arc<dyn DocumentStore>>) -> Self {
        let excludes = ExclusionSet::with_defaults(&config.export.extra_excludes);
        Self {
            store,
            exporter: Arc::new(ArchiveExporter::new(
                config.export.root.clone(),
                config.export.prefix.clone(),
                excludes,
            )),
            database_env: DatabaseEnv::from_env(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::read_root))
        .route("/api/hello", get(handlers::hello))
        .route("/api/leads", post(handlers::create_lead))
        .route("/test", get(handlers::test_database))
        .route("/download-backend", get(handlers::download_backend))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        // route_layer so MatchedPath is available for metric labels
        .route_layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(CorsLayer::very_permissive())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    mongo: Option<MongoDb>,
}

impl Application {
    /// Opens the MongoDB client (when configured) and binds the listener.
    pub async fn build(config: LeadsConfig) -> Result<Self, AppError> {
        let mongo = match &config.database {
            Some(db) => match MongoDb::connect(&db.url, &db.name, db.timeout()).await {
                Ok(mongo) => Some(mongo),
                Err(e) => {
                    tracing::warn!("Database unavailable, continuing without it: {}", e);
                    None
                }
            },
            None => {
                tracing::warn!("DATABASE_URL or DATABASE_NAME not set; lead storage disabled");
                None
            }
        };

        let store = mongo
            .clone()
            .map(|db| Arc::new(db) as Arc<dyn DocumentStore>);

        let mut app = Self::build_with_store(config, store).await?;
        app.mongo = mongo;
        Ok(app)
    }

    /// Binds the listener around an already constructed store.
    pub async fn build_with_store(
        config: LeadsConfig,
        store: Option<Arc<dyn DocumentStore>>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(&config, store);
        tracing::info!(
            root = %state.exporter.root().display(),
            prefix = %state.exporter.prefix(),
            excluded = state.exporter.excludes().len(),
            "Archive export configured"
        );

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router: build_router(state),
            mongo: None,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Serves until `signal` resolves, then closes the store client.
    pub async fn run_with_shutdown<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let result = axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await;

        if let Some(mongo) = self.mongo {
            mongo.close().await;
        }

        result.map_err(|e| {
            tracing::error!("Server error: {}", e);
            e
        })
    }
}
