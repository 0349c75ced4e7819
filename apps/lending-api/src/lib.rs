//! # Lending API
//!
//! HTTP/JSON server for the lending tracker.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Lending API Server                               │
//! │                                                                         │
//! │  Client ──► axum Router ──► routes::* ──► InventoryService ──► Store     │
//! │               │                               │                         │
//! │        TraceLayer + CORS               one mutation lock                │
//! │                                                                         │
//! │  AppState (Clone, cheap)                                                │
//! │  └── inventory: Arc<InventoryService<Arc<dyn RecordStore>>>             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The router is built by [`create_router`] so tests can drive it in-process
//! without binding a socket.

pub mod config;
pub mod error;
pub mod routes;

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use lending_store::{
    InventoryService, JsonFileStore, RecordStore, SqliteConfig, SqliteStore, StoreResult,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{ApiConfig, StoreBackend};

pub use crate::config::ConfigError;
pub use crate::error::{ApiError, ErrorCode};

/// Store handle with the backend chosen at runtime.
pub type SharedStore = Arc<dyn RecordStore>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub inventory: Arc<InventoryService<SharedStore>>,
}

impl AppState {
    /// Wraps a store in a fresh inventory service.
    pub fn new(store: SharedStore) -> Self {
        AppState {
            inventory: Arc::new(InventoryService::new(store)),
        }
    }

    /// Opens the store selected by the configuration.
    pub async fn from_config(config: &ApiConfig) -> StoreResult<Self> {
        let store = open_store(config).await?;
        Ok(Self::new(store))
    }
}

/// Opens the configured record store.
pub async fn open_store(config: &ApiConfig) -> StoreResult<SharedStore> {
    let store: SharedStore = match config.storage.backend {
        StoreBackend::Json => Arc::new(JsonFileStore::open(&config.storage.data_dir)?),
        StoreBackend::Sqlite => {
            let sqlite = SqliteConfig::new(config.storage.database_path());
            Arc::new(SqliteStore::connect(sqlite).await?)
        }
    };

    info!(backend = store.backend(), "Record store ready");
    Ok(store)
}

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health::health))
        .route(
            "/api/items",
            get(routes::items::list_items).post(routes::items::add_item),
        )
        .route("/api/checkedout", get(routes::checkouts::list_open_checkouts))
        .route("/api/checkout", post(routes::checkouts::checkout))
        .route("/api/return", post(routes::checkouts::return_item))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds the configured address and serves until `shutdown` resolves.
pub async fn serve<F>(config: &ApiConfig, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, "Lending API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
