pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod image;
pub mod models;
pub mod store;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::store::EventStore;

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub config: config::Config,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>, config: config::Config) -> Arc<Self> {
        Arc::new(Self { store, config })
    }
}

/// Builds the full router: banner, health check, and the event routes under the
/// configured prefix.
pub fn app(state: Arc<AppState>) -> Router {
    let http = &state.config.http;
    let body_limit = DefaultBodyLimit::max(http.max_upload_bytes);
    let cors = config::create_cors_layer(&http.cors_allowed_origins);

    let api = controllers::routes();
    let router = Router::new()
        .route("/", get(|| async { "Event Board API v1.0" }))
        .route("/health", get(|| async { "OK" }));

    // axum refuses to nest at the root
    let router = if http.api_prefix.is_empty() {
        router.merge(api)
    } else {
        router.nest(&http.api_prefix, api)
    };

    router
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
