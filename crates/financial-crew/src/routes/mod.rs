//! HTTP routes
//!
//! - `/` - the form
//! - `/analyze` - form submission, runs one analysis
//! - `/api/health` - health check

pub mod health;
pub mod ui;

use crate::config::AppConfig;
use crate::engine::CrewEngine;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state of the web page
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn CrewEngine>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(engine: Arc<dyn CrewEngine>, config: AppConfig) -> Self {
        Self {
            engine,
            config: Arc::new(config),
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    Router::new()
        .merge(ui::router(state))
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
}
