use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One user's like on one prompt; the pair is unique and toggled.
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)]
pub struct Like {
    pub user_id: Uuid,
    pub prompt_id: Uuid,
    pub created_at: DateTime<Utc>,
}
