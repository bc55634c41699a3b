use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::models::{ApiCaller, ApiKey};
use crate::shared::constants::{API_KEY_PREFIX, PBM_API_KEY_TYPE};

/// Service for minting and resolving caller API keys
pub struct ApiKeyService {
    pool: PgPool,
}

impl ApiKeyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a bearer token to its caller. Only keys of the recognized
    /// `pbm_api_key` type match; anything else resolves to `None`.
    pub async fn authenticate(&self, token: &str) -> Result<Option<ApiCaller>> {
        let key = sqlx::query_as::<_, ApiKey>(
            r#"
            SELECT key, user_id, key_type, created_at
            FROM api_keys
            WHERE key = $1 AND key_type = $2
            "#,
        )
        .bind(token)
        .bind(PBM_API_KEY_TYPE)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(key.map(|k| ApiCaller {
            user_id: k.user_id,
            key: k.key,
        }))
    }

    /// Mint a new key. When `user_id` is absent a fresh user id is generated,
    /// which doubles as the bootstrap path for new accounts.
    pub async fn mint(&self, user_id: Option<Uuid>) -> Result<ApiKey> {
        let user_id = user_id.unwrap_or_else(Uuid::new_v4);
        let key = format!("{}{}", API_KEY_PREFIX, Uuid::new_v4().simple());

        let created = sqlx::query_as::<_, ApiKey>(
            r#"
            INSERT INTO api_keys (key, user_id, key_type)
            VALUES ($1, $2, $3)
            RETURNING key, user_id, key_type, created_at
            "#,
        )
        .bind(&key)
        .bind(user_id)
        .bind(PBM_API_KEY_TYPE)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(created)
    }

    /// List the caller's keys
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ApiKey>> {
        let keys = sqlx::query_as::<_, ApiKey>(
            r#"
            SELECT key, user_id, key_type, created_at
            FROM api_keys
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(keys)
    }

    /// Revoke one of the caller's own keys
    pub async fn revoke(&self, user_id: Uuid, key: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM api_keys
            WHERE key = $1 AND user_id = $2
            "#,
        )
        .bind(key)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("API key not found".to_string()));
        }

        Ok(())
    }
}
