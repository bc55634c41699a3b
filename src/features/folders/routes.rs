use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::features::folders::{handlers, services::FolderService};

/// Folder tree management. Authentication middleware is applied by the caller.
pub fn routes(service: Arc<FolderService>) -> Router {
    Router::new()
        .route(
            "/api/folders",
            get(handlers::list_folders).post(handlers::create_folder),
        )
        .route(
            "/api/folders/{id}",
            put(handlers::update_folder).delete(handlers::delete_folder),
        )
        .with_state(service)
}
