use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::audit::models::ApiCallLog;

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiCallLogResponseDto {
    pub id: Uuid,
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

impl From<ApiCallLog> for ApiCallLogResponseDto {
    fn from(log: ApiCallLog) -> Self {
        Self {
            id: log.id,
            endpoint: log.endpoint,
            method: log.method,
            status: log.status,
            request_body: log.request_body,
            response_body: log.response_body,
            duration_ms: log.duration_ms,
            ip_address: log.ip_address,
            user_agent: log.user_agent,
            created_at: log.created_at,
        }
    }
}
