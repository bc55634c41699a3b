use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::auth::models::ApiKey;

/// Request to mint a new caller key. `user_id` is optional: omitting it
/// creates a fresh user id (bootstrap for a new account).
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateApiKeyDto {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiKeyResponseDto {
    pub key: String,
    pub user_id: Uuid,
    pub key_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<ApiKey> for ApiKeyResponseDto {
    fn from(k: ApiKey) -> Self {
        Self {
            key: k.key,
            user_id: k.user_id,
            key_type: k.key_type,
            created_at: k.created_at,
        }
    }
}
