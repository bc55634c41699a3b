use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::audit::models::{ApiCallLog, NewApiCallLog};
use crate::shared::constants::{REDACTED_API_KEY, REDACTED_PASSWORD};
use crate::shared::types::PaginationQuery;

const LOG_COLUMNS: &str = "id, user_id, endpoint, method, status, request_body, response_body, \
     duration_ms, ip_address, user_agent, created_at";

/// Produce the loggable copy of a request body: the provider `api_key` and
/// the prompt `password` are replaced before anything is persisted. A body
/// that is not a JSON object is stored as-is (it carries no known secrets).
pub fn redact_request_body(body: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(mut value) => {
            if let Some(object) = value.as_object_mut() {
                if object.contains_key("api_key") {
                    object.insert(
                        "api_key".to_string(),
                        serde_json::Value::String(REDACTED_API_KEY.to_string()),
                    );
                }
                if object.contains_key("password") {
                    object.insert(
                        "password".to_string(),
                        serde_json::Value::String(REDACTED_PASSWORD.to_string()),
                    );
                }
            }
            value.to_string()
        }
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    }
}

/// Best-effort audit trail for the execution endpoints.
///
/// Writes happen on a detached task so they can neither delay nor fail the
/// request that produced them; insert errors are logged and dropped.
pub struct AuditLogService {
    pool: PgPool,
}

impl AuditLogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fire-and-forget insert of one log row
    pub fn record(&self, entry: NewApiCallLog) {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            if let Err(e) = Self::insert(&pool, &entry).await {
                tracing::error!(
                    "Failed to write api call log for {} {}: {:?}",
                    entry.method,
                    entry.endpoint,
                    e
                );
            }
        });
    }

    async fn insert(pool: &PgPool, entry: &NewApiCallLog) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO api_call_logs
                (user_id, endpoint, method, status, request_body, response_body,
                 duration_ms, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(entry.user_id)
        .bind(&entry.endpoint)
        .bind(&entry.method)
        .bind(entry.status)
        .bind(&entry.request_body)
        .bind(&entry.response_body)
        .bind(entry.duration_ms)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// The caller's own call history, newest first
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        params: &PaginationQuery,
    ) -> Result<(Vec<ApiCallLog>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_call_logs WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let logs = sqlx::query_as::<_, ApiCallLog>(&format!(
            "SELECT {LOG_COLUMNS} FROM api_call_logs WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok((logs, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_replaces_api_key_and_password() {
        let body = br#"{"prompt_id":"abc","api_key":"sk-very-secret","password":"hunter2"}"#;
        let redacted = redact_request_body(body);

        assert!(!redacted.contains("sk-very-secret"));
        assert!(!redacted.contains("hunter2"));
        assert!(redacted.contains(REDACTED_API_KEY));
        assert!(redacted.contains(REDACTED_PASSWORD));
        assert!(redacted.contains("abc"));
    }

    #[test]
    fn test_redact_leaves_other_fields_alone() {
        let body = br#"{"prompt_id":"abc","variables":{"name":"Ada"}}"#;
        let redacted = redact_request_body(body);
        let value: serde_json::Value = serde_json::from_str(&redacted).unwrap();
        assert_eq!(value["variables"]["name"], "Ada");
        assert!(value.get("api_key").is_none());
    }

    #[test]
    fn test_redact_passes_non_json_through() {
        let redacted = redact_request_body(b"not json at all");
        assert_eq!(redacted, "not json at all");
    }
}
