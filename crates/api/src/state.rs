use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::cache::OutputCache;
use crate::catalog::CatalogService;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: cinedex_db::DbPool,
    /// Server configuration (read by the auth extractors).
    pub config: Arc<ServerConfig>,
    /// Movie and rating orchestration.
    pub catalog: Arc<CatalogService>,
    /// Output-cache invalidation hook.
    pub output_cache: Arc<OutputCache>,
    /// Cancelled when the server starts shutting down. Each request gets a
    /// child token so in-flight catalog calls abort with it.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Assemble state around a pool, building the catalog service on top of it.
    pub fn new(pool: cinedex_db::DbPool, config: ServerConfig, shutdown: CancellationToken) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(pool.clone())),
            pool,
            config: Arc::new(config),
            output_cache: Arc::new(OutputCache::new()),
            shutdown,
        }
    }
}
