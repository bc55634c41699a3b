use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Bearer credential for calling this service's endpoints. Distinct from the
/// `api_key` request field, which authenticates to the downstream AI vendor.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ApiKey {
    pub key: String,
    pub user_id: Uuid,
    pub key_type: String,
    pub created_at: DateTime<Utc>,
}

/// The caller resolved from a valid bearer API key.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[allow(dead_code)]
pub struct ApiCaller {
    pub user_id: Uuid,
    /// The key the caller authenticated with
    #[serde(skip)]
    pub key: String,
}
