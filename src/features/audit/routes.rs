use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::audit::{handlers, services::AuditLogService};

/// Call-log history for authenticated callers
pub fn routes(service: Arc<AuditLogService>) -> Router {
    Router::new()
        .route("/api/logs", get(handlers::list_logs))
        .with_state(service)
}
