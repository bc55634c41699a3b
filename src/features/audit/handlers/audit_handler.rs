use axum::{extract::Query, extract::State, Json};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::audit::dtos::ApiCallLogResponseDto;
use crate::features::audit::services::AuditLogService;
use crate::features::auth::models::ApiCaller;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List the caller's execution call logs, newest first
#[utoipa::path(
    get,
    path = "/api/logs",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Call logs retrieved", body = ApiResponse<Vec<ApiCallLogResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "logs"
)]
pub async fn list_logs(
    caller: ApiCaller,
    State(service): State<Arc<AuditLogService>>,
    Query(params): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ApiCallLogResponseDto>>>> {
    let (logs, total) = service.list_for_user(caller.user_id, &params).await?;
    let dtos: Vec<ApiCallLogResponseDto> = logs.into_iter().map(|l| l.into()).collect();
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}
