use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::prompts::dtos::{
    CreatePromptDto, LikeResponseDto, PromptQueryParams, PromptScope, UpdatePromptDto,
};
use crate::features::prompts::models::{Like, Prompt, PromptAccess, PromptVersion};
use crate::shared::password::hash_password;

/// Column list shared by every query returning a full prompt row
const PROMPT_COLUMNS: &str = "id, user_id, title, content, access, tags, views, like_count, \
     fork_count, original_prompt_id, is_password_protected, password_hash, current_version, \
     total_versions, folder_id, notes, output_sample, media_urls, created_at";

const VERSION_COLUMNS: &str =
    "id, prompt_id, version_number, title, content, commit_message, is_current, created_at";

pub struct PromptService {
    pool: PgPool,
}

impl PromptService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a prompt row without any visibility check. Used by the
    /// executor, which applies its own access/password rules.
    pub async fn find(&self, id: Uuid) -> Result<Option<Prompt>> {
        let prompt = sqlx::query_as::<_, Prompt>(&format!(
            "SELECT {PROMPT_COLUMNS} FROM prompts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(prompt)
    }

    /// Fetch a prompt the caller may see (owner or public)
    pub async fn get_for_caller(&self, id: Uuid, caller_id: Uuid) -> Result<Prompt> {
        let prompt = self
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Prompt with id {} not found", id)))?;

        if !prompt.is_visible_to(caller_id) {
            return Err(AppError::Forbidden("This prompt is private".to_string()));
        }

        Ok(prompt)
    }

    /// Create a new prompt with its initial version snapshot
    pub async fn create(&self, user_id: Uuid, dto: CreatePromptDto) -> Result<Prompt> {
        let password_hash = match dto.password.as_deref() {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let prompt = sqlx::query_as::<_, Prompt>(&format!(
            r#"
            INSERT INTO prompts
                (user_id, title, content, access, tags, is_password_protected, password_hash,
                 folder_id, notes, output_sample, media_urls)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {PROMPT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&dto.title)
        .bind(&dto.content)
        .bind(dto.access.unwrap_or(PromptAccess::Private))
        .bind(dto.tags.clone().unwrap_or_default())
        .bind(password_hash.is_some())
        .bind(&password_hash)
        .bind(dto.folder_id)
        .bind(&dto.notes)
        .bind(&dto.output_sample)
        .bind(&dto.media_urls)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        sqlx::query(
            r#"
            INSERT INTO prompt_versions (prompt_id, version_number, title, content, commit_message, is_current)
            VALUES ($1, 1, $2, $3, $4, TRUE)
            "#,
        )
        .bind(prompt.id)
        .bind(&prompt.title)
        .bind(&prompt.content)
        .bind("Initial version")
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;

        Ok(prompt)
    }

    /// List prompts with pagination, search and scope
    pub async fn list(
        &self,
        caller_id: Uuid,
        params: &PromptQueryParams,
    ) -> Result<(Vec<Prompt>, i64)> {
        // Both scopes reference $1 so the bind positions stay fixed across
        // every branch; for the public gallery the check is vacuous.
        let scope_clause = match params.scope {
            PromptScope::Mine => "user_id = $1",
            PromptScope::Public => "access = 'public' AND $1::uuid IS NOT NULL",
        };

        let search_pattern = params.search.as_ref().map(|s| format!("%{}%", s));
        if let Some(ref search) = search_pattern {
            let where_clause = format!(
                "WHERE {} AND (title ILIKE $2 OR content ILIKE $2)",
                scope_clause
            );

            let count_query = format!("SELECT COUNT(*) FROM prompts {}", where_clause);
            let total: i64 = sqlx::query_scalar(&count_query)
                .bind(caller_id)
                .bind(search)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::Database)?;

            let query = format!(
                "SELECT {PROMPT_COLUMNS} FROM prompts {} ORDER BY created_at {} LIMIT $3 OFFSET $4",
                where_clause,
                params.sort.as_sql()
            );

            let prompts: Vec<Prompt> = sqlx::query_as(&query)
                .bind(caller_id)
                .bind(search)
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::Database)?;

            Ok((prompts, total))
        } else {
            let where_clause = format!("WHERE {}", scope_clause);

            let count_query = format!("SELECT COUNT(*) FROM prompts {}", where_clause);
            let total: i64 = sqlx::query_scalar(&count_query)
                .bind(caller_id)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::Database)?;

            let query = format!(
                "SELECT {PROMPT_COLUMNS} FROM prompts {} ORDER BY created_at {} LIMIT $2 OFFSET $3",
                where_clause,
                params.sort.as_sql()
            );

            let prompts: Vec<Prompt> = sqlx::query_as(&query)
                .bind(caller_id)
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::Database)?;

            Ok((prompts, total))
        }
    }

    /// Update a prompt. A title or content change snapshots a new immutable
    /// version and moves the `is_current` flag to it.
    pub async fn update(&self, id: Uuid, user_id: Uuid, dto: UpdatePromptDto) -> Result<Prompt> {
        let existing = self
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Prompt with id {} not found", id)))?;

        if existing.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the owner can update this prompt".to_string(),
            ));
        }

        let password_hash = match dto.password.as_deref() {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let snapshots_version = dto.title.is_some() || dto.content.is_some();

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let mut updated = sqlx::query_as::<_, Prompt>(&format!(
            r#"
            UPDATE prompts
            SET title = COALESCE($1, title),
                content = COALESCE($2, content),
                access = COALESCE($3, access),
                tags = COALESCE($4, tags),
                folder_id = COALESCE($5, folder_id),
                notes = COALESCE($6, notes),
                output_sample = COALESCE($7, output_sample),
                media_urls = COALESCE($8, media_urls),
                password_hash = COALESCE($9, password_hash),
                is_password_protected = is_password_protected OR $10
            WHERE id = $11
            RETURNING {PROMPT_COLUMNS}
            "#
        ))
        .bind(&dto.title)
        .bind(&dto.content)
        .bind(dto.access)
        .bind(&dto.tags)
        .bind(dto.folder_id)
        .bind(&dto.notes)
        .bind(&dto.output_sample)
        .bind(&dto.media_urls)
        .bind(&password_hash)
        .bind(password_hash.is_some())
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        if snapshots_version {
            let new_version = existing.total_versions + 1;

            sqlx::query("UPDATE prompt_versions SET is_current = FALSE WHERE prompt_id = $1 AND is_current")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;

            sqlx::query(
                r#"
                INSERT INTO prompt_versions (prompt_id, version_number, title, content, commit_message, is_current)
                VALUES ($1, $2, $3, $4, $5, TRUE)
                "#,
            )
            .bind(id)
            .bind(new_version)
            .bind(&updated.title)
            .bind(&updated.content)
            .bind(&dto.commit_message)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

            updated = sqlx::query_as::<_, Prompt>(&format!(
                r#"
                UPDATE prompts
                SET current_version = $1, total_versions = $1
                WHERE id = $2
                RETURNING {PROMPT_COLUMNS}
                "#
            ))
            .bind(new_version)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;

        Ok(updated)
    }

    /// Delete a prompt and (via cascade) its versions, likes and flow steps
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM prompts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Prompt with id {} not found",
                id
            )));
        }

        Ok(())
    }

    /// Fork a prompt into a private copy owned by the caller.
    ///
    /// A fork cannot itself be forked; that is rejected explicitly rather
    /// than silently creating a second-generation copy.
    pub async fn fork(&self, id: Uuid, user_id: Uuid) -> Result<Prompt> {
        let source = self
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Prompt with id {} not found", id)))?;

        if source.is_fork() {
            return Err(AppError::Validation(
                "This prompt is already a fork and cannot be forked again".to_string(),
            ));
        }

        if !source.is_visible_to(user_id) {
            return Err(AppError::Forbidden(
                "Only public prompts can be forked".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let fork = sqlx::query_as::<_, Prompt>(&format!(
            r#"
            INSERT INTO prompts (user_id, title, content, access, tags, original_prompt_id, notes, output_sample, media_urls)
            VALUES ($1, $2, $3, 'private', $4, $5, $6, $7, $8)
            RETURNING {PROMPT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&source.title)
        .bind(&source.content)
        .bind(&source.tags)
        .bind(source.id)
        .bind(&source.notes)
        .bind(&source.output_sample)
        .bind(&source.media_urls)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        sqlx::query(
            r#"
            INSERT INTO prompt_versions (prompt_id, version_number, title, content, commit_message, is_current)
            VALUES ($1, 1, $2, $3, $4, TRUE)
            "#,
        )
        .bind(fork.id)
        .bind(&fork.title)
        .bind(&fork.content)
        .bind(format!("Forked from {}", source.id))
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        sqlx::query("UPDATE prompts SET fork_count = fork_count + 1 WHERE id = $1")
            .bind(source.id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;

        Ok(fork)
    }

    /// Toggle the caller's like on a prompt
    pub async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> Result<LikeResponseDto> {
        let prompt = self.get_for_caller(id, user_id).await?;

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let removed = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND prompt_id = $2")
            .bind(user_id)
            .bind(prompt.id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let (liked, like_count) = if removed.rows_affected() == 0 {
            let _like = sqlx::query_as::<_, Like>(
                r#"
                INSERT INTO likes (user_id, prompt_id)
                VALUES ($1, $2)
                RETURNING user_id, prompt_id, created_at
                "#,
            )
            .bind(user_id)
            .bind(prompt.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

            let count: i32 = sqlx::query_scalar(
                "UPDATE prompts SET like_count = like_count + 1 WHERE id = $1 RETURNING like_count",
            )
            .bind(prompt.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

            (true, count)
        } else {
            let count: i32 = sqlx::query_scalar(
                "UPDATE prompts SET like_count = GREATEST(like_count - 1, 0) WHERE id = $1 RETURNING like_count",
            )
            .bind(prompt.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

            (false, count)
        };

        tx.commit().await.map_err(AppError::Database)?;

        Ok(LikeResponseDto { liked, like_count })
    }

    /// List the version history, newest first
    pub async fn versions(&self, id: Uuid, caller_id: Uuid) -> Result<Vec<PromptVersion>> {
        // Visibility follows the prompt itself
        self.get_for_caller(id, caller_id).await?;

        let versions = sqlx::query_as::<_, PromptVersion>(&format!(
            "SELECT {VERSION_COLUMNS} FROM prompt_versions WHERE prompt_id = $1 ORDER BY version_number DESC"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(versions)
    }

    /// Restore an earlier version: the prompt's title/content revert to the
    /// snapshot and the `is_current` flag moves back to it.
    pub async fn restore_version(
        &self,
        id: Uuid,
        version_number: i32,
        user_id: Uuid,
    ) -> Result<Prompt> {
        let prompt = self
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Prompt with id {} not found", id)))?;

        if prompt.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the owner can restore versions".to_string(),
            ));
        }

        let version = sqlx::query_as::<_, PromptVersion>(&format!(
            "SELECT {VERSION_COLUMNS} FROM prompt_versions WHERE prompt_id = $1 AND version_number = $2"
        ))
        .bind(id)
        .bind(version_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Version {} not found for prompt {}",
                version_number, id
            ))
        })?;

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("UPDATE prompt_versions SET is_current = FALSE WHERE prompt_id = $1 AND is_current")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        sqlx::query("UPDATE prompt_versions SET is_current = TRUE WHERE id = $1")
            .bind(version.id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let restored = sqlx::query_as::<_, Prompt>(&format!(
            r#"
            UPDATE prompts
            SET title = $1, content = $2, current_version = $3
            WHERE id = $4
            RETURNING {PROMPT_COLUMNS}
            "#
        ))
        .bind(&version.title)
        .bind(&version.content)
        .bind(version.version_number)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;

        Ok(restored)
    }

    /// Atomic view-count increment; the executor treats failure here as
    /// best-effort and never fails the request over it.
    pub async fn increment_views(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE prompts SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(())
    }
}
