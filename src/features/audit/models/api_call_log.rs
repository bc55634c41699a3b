use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Append-only record of one inbound execution call. Secrets are redacted
/// from `request_body` before the row is written.
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)]
pub struct ApiCallLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub endpoint: String,
    pub method: String,
    pub status: i32,
    pub request_body: Option<String>,
    pub response_body: Option<String>,
    pub duration_ms: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data for one log insert. `user_id` is absent when the caller never
/// authenticated (the 401 path still writes its row).
#[derive(Debug, Clone)]
pub struct NewApiCallLog {
    pub user_id: Option<Uuid>,
    pub endpoint: String,
    pub method: String,
    pub status: i32,
    pub request_body: Option<String>,
    pub response_body: Option<String>,
    pub duration_ms: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
