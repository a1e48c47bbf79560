// src/api/http/router.rs
// HTTP router composition for REST API endpoints

use axum::{
    Router,
    routing::{get, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{
    handlers::{address_handler, health_handler},
    things::{list_things, update_thing, update_thing_by_body},
};
use crate::state::AppState;

/// Main HTTP router with state attached and request tracing enabled.
pub fn http_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(health_handler))

        // Drains
        .route("/things", get(list_things).put(update_thing_by_body))
        .route("/things/{id}", put(update_thing))

        // Address search
        .route("/address", get(address_handler))

        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
