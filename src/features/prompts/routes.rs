use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::prompts::{handlers, services::PromptService};

/// Prompt CRUD, forking, likes and version history.
/// Authentication middleware is applied by the caller.
pub fn routes(service: Arc<PromptService>) -> Router {
    Router::new()
        .route(
            "/api/prompts",
            post(handlers::create_prompt).get(handlers::list_prompts),
        )
        .route(
            "/api/prompts/{id}",
            get(handlers::get_prompt)
                .put(handlers::update_prompt)
                .delete(handlers::delete_prompt),
        )
        .route("/api/prompts/{id}/fork", post(handlers::fork_prompt))
        .route("/api/prompts/{id}/like", post(handlers::toggle_like))
        .route("/api/prompts/{id}/versions", get(handlers::list_versions))
        .route(
            "/api/prompts/{id}/versions/{version_number}/restore",
            post(handlers::restore_version),
        )
        .with_state(service)
}
