use std::sync::Arc;

use slate_core::store::CallSheetStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Call sheet record store (PostgreSQL in production, in-memory in tests).
    pub store: Arc<dyn CallSheetStore>,
    pub config: Arc<ServerConfig>,
}
