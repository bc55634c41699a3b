use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Folders form a tree via `parent_id`; `position` orders siblings.
/// Deleting a folder reassigns its contents to the root, never cascades.
#[derive(Debug, Clone, FromRow)]
pub struct Folder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub color: String,
    pub parent_id: Option<Uuid>,
    pub position: i32,
    pub is_shared: bool,
    pub created_at: DateTime<Utc>,
}
