use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Immutable snapshot of a prompt at one version number. Created on every
/// edit, never mutated afterwards; exactly one row per prompt carries
/// `is_current = true` (enforced by a partial unique index).
#[derive(Debug, Clone, FromRow)]
pub struct PromptVersion {
    pub id: Uuid,
    pub prompt_id: Uuid,
    pub version_number: i32,
    pub title: Option<String>,
    pub content: String,
    pub commit_message: Option<String>,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
}
