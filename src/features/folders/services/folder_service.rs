use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::folders::dtos::{CreateFolderDto, UpdateFolderDto};
use crate::features::folders::models::Folder;

const FOLDER_COLUMNS: &str =
    "id, user_id, name, color, parent_id, position, is_shared, created_at";

const DEFAULT_COLOR: &str = "#6366f1";

pub struct FolderService {
    pool: PgPool,
}

impl FolderService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Folder> {
        sqlx::query_as::<_, Folder>(&format!(
            "SELECT {FOLDER_COLUMNS} FROM folders WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("Folder with id {} not found", id)))
    }

    pub async fn create(&self, user_id: Uuid, dto: CreateFolderDto) -> Result<Folder> {
        // A nested folder must hang off one of the caller's own folders
        if let Some(parent_id) = dto.parent_id {
            self.find_owned(parent_id, user_id).await.map_err(|_| {
                AppError::BadRequest("Parent folder does not exist".to_string())
            })?;
        }

        let folder = sqlx::query_as::<_, Folder>(&format!(
            r#"
            INSERT INTO folders (user_id, name, color, parent_id, position, is_shared)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {FOLDER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&dto.name)
        .bind(dto.color.as_deref().unwrap_or(DEFAULT_COLOR))
        .bind(dto.parent_id)
        .bind(dto.position.unwrap_or(0))
        .bind(dto.is_shared.unwrap_or(false))
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(folder)
    }

    /// Flat list of the caller's folders; clients build the tree from
    /// `parent_id`, siblings ordered by `position`.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Folder>> {
        let folders = sqlx::query_as::<_, Folder>(&format!(
            "SELECT {FOLDER_COLUMNS} FROM folders WHERE user_id = $1 ORDER BY position, name"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(folders)
    }

    pub async fn update(&self, id: Uuid, user_id: Uuid, dto: UpdateFolderDto) -> Result<Folder> {
        self.find_owned(id, user_id).await?;

        if let Some(parent_id) = dto.parent_id {
            if parent_id == id {
                return Err(AppError::BadRequest(
                    "A folder cannot be its own parent".to_string(),
                ));
            }
            self.find_owned(parent_id, user_id).await.map_err(|_| {
                AppError::BadRequest("Parent folder does not exist".to_string())
            })?;
        }

        let folder = sqlx::query_as::<_, Folder>(&format!(
            r#"
            UPDATE folders
            SET name = COALESCE($1, name),
                color = COALESCE($2, color),
                parent_id = COALESCE($3, parent_id),
                position = COALESCE($4, position),
                is_shared = COALESCE($5, is_shared)
            WHERE id = $6 AND user_id = $7
            RETURNING {FOLDER_COLUMNS}
            "#
        ))
        .bind(&dto.name)
        .bind(&dto.color)
        .bind(dto.parent_id)
        .bind(dto.position)
        .bind(dto.is_shared)
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(folder)
    }

    /// Delete a folder. Contained prompts and child folders are reassigned
    /// to the root rather than deleted.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        self.find_owned(id, user_id).await?;

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("UPDATE folders SET parent_id = NULL WHERE parent_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        sqlx::query("UPDATE prompts SET folder_id = NULL WHERE folder_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;

        Ok(())
    }
}
