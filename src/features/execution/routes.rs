use axum::{routing::post, Router};

use crate::features::execution::handlers::{self, ExecutionState};

/// The two execution endpoints. They are NOT behind the auth middleware:
/// the handlers authenticate themselves so that even a 401 writes its
/// audit-log row.
pub fn routes(state: ExecutionState) -> Router {
    Router::new()
        .route("/api/run/prompt", post(handlers::run_prompt))
        .route("/api/run/flow", post(handlers::run_flow))
        .with_state(state)
}
