use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// An ordered pipeline of prompt steps owned by one user
#[derive(Debug, Clone, FromRow)]
pub struct Flow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
