use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::features::auth::{handlers, services::ApiKeyService};

/// Public bootstrap route: mint a key without prior credentials
pub fn public_routes(service: Arc<ApiKeyService>) -> Router {
    Router::new()
        .route("/api/keys", post(handlers::create_api_key))
        .with_state(service)
}

/// Key management for authenticated callers
pub fn protected_routes(service: Arc<ApiKeyService>) -> Router {
    Router::new()
        .route("/api/keys", get(handlers::list_api_keys))
        .route("/api/keys/{key}", delete(handlers::revoke_api_key))
        .with_state(service)
}
