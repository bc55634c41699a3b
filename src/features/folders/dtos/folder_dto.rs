use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::folders::models::Folder;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFolderDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    /// Hex color used by clients when rendering the folder
    pub color: Option<String>,

    pub parent_id: Option<Uuid>,

    pub position: Option<i32>,

    pub is_shared: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFolderDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    pub color: Option<String>,

    pub parent_id: Option<Uuid>,

    pub position: Option<i32>,

    pub is_shared: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FolderResponseDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub color: String,
    pub parent_id: Option<Uuid>,
    pub position: i32,
    pub is_shared: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Folder> for FolderResponseDto {
    fn from(f: Folder) -> Self {
        Self {
            id: f.id,
            user_id: f.user_id,
            name: f.name,
            color: f.color,
            parent_id: f.parent_id,
            position: f.position,
            is_shared: f.is_shared,
            created_at: f.created_at,
        }
    }
}
