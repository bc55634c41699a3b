use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::features::flows::{handlers, services::FlowService};

/// Flow and step management. Authentication middleware is applied by the caller.
pub fn routes(service: Arc<FlowService>) -> Router {
    Router::new()
        .route(
            "/api/flows",
            post(handlers::create_flow).get(handlers::list_flows),
        )
        .route(
            "/api/flows/{id}",
            get(handlers::get_flow).delete(handlers::delete_flow),
        )
        .route("/api/flows/{id}/steps", post(handlers::add_flow_step))
        .route(
            "/api/flows/{id}/steps/{step_id}",
            put(handlers::update_flow_step).delete(handlers::delete_flow_step),
        )
        .with_state(service)
}
