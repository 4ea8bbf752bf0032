//! lms-space library interface
//!
//! Exposes the session engine and HTTP router for the binary and for
//! integration tests.

pub mod api;
pub mod colors;
pub mod config;
pub mod embedding;
pub mod error;
pub mod models;
pub mod sealed;
pub mod services;
pub mod session;

pub use crate::error::{ApiError, ApiResult, SpaceError};

use axum::Router;
use chrono::{DateTime, Utc};
use lms_common::vault::SealedBundle;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::config::SpaceConfig;
use crate::services::{CatalogConnector, CatalogService};
use crate::session::SessionState;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// The single dashboard session
    pub session: Arc<RwLock<SessionState>>,
    /// Authenticated catalog, present once unlocked
    pub catalog: Arc<RwLock<Option<Arc<dyn CatalogService>>>>,
    /// Builds a catalog session from decrypted credentials
    pub connector: Arc<dyn CatalogConnector>,
    pub bundle: Arc<SealedBundle>,
    pub config: Arc<SpaceConfig>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(
        config: SpaceConfig,
        bundle: SealedBundle,
        connector: Arc<dyn CatalogConnector>,
    ) -> Self {
        Self {
            session: Arc::new(RwLock::new(SessionState::new(config.embedding))),
            catalog: Arc::new(RwLock::new(None)),
            connector,
            bundle: Arc::new(bundle),
            config: Arc::new(config),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // UI routes (HTML pages)
        .merge(api::ui_routes())
        // API routes
        .merge(api::session_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
