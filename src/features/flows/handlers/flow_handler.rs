use axum::{extract::Path, extract::State, Json};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::models::ApiCaller;
use crate::features::flows::dtos::{
    CreateFlowDto, CreateFlowStepDto, FlowDetailResponseDto, FlowResponseDto, FlowStepResponseDto,
    UpdateFlowStepDto,
};
use crate::features::flows::services::FlowService;
use crate::shared::types::ApiResponse;

/// Create a flow
#[utoipa::path(
    post,
    path = "/api/flows",
    request_body = CreateFlowDto,
    responses(
        (status = 200, description = "Flow created", body = ApiResponse<FlowResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "flows"
)]
pub async fn create_flow(
    caller: ApiCaller,
    State(service): State<Arc<FlowService>>,
    AppJson(dto): AppJson<CreateFlowDto>,
) -> Result<Json<ApiResponse<FlowResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let flow = service.create(caller.user_id, &dto.name).await?;
    Ok(Json(ApiResponse::success(Some(flow.into()), None, None)))
}

/// List the caller's flows
#[utoipa::path(
    get,
    path = "/api/flows",
    responses(
        (status = 200, description = "Flows retrieved", body = ApiResponse<Vec<FlowResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "flows"
)]
pub async fn list_flows(
    caller: ApiCaller,
    State(service): State<Arc<FlowService>>,
) -> Result<Json<ApiResponse<Vec<FlowResponseDto>>>> {
    let flows = service.list(caller.user_id).await?;
    let dtos: Vec<FlowResponseDto> = flows.into_iter().map(|f| f.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Get a flow with its ordered steps
#[utoipa::path(
    get,
    path = "/api/flows/{id}",
    params(
        ("id" = Uuid, Path, description = "Flow ID")
    ),
    responses(
        (status = 200, description = "Flow found", body = ApiResponse<FlowDetailResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Flow not found")
    ),
    security(("bearer_auth" = [])),
    tag = "flows"
)]
pub async fn get_flow(
    caller: ApiCaller,
    State(service): State<Arc<FlowService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FlowDetailResponseDto>>> {
    let (flow, steps) = service.get_with_steps(id, caller.user_id).await?;
    let detail = FlowDetailResponseDto {
        id: flow.id,
        user_id: flow.user_id,
        name: flow.name,
        created_at: flow.created_at,
        steps: steps.into_iter().map(|s| s.into()).collect(),
    };
    Ok(Json(ApiResponse::success(Some(detail), None, None)))
}

/// Delete a flow and its steps
#[utoipa::path(
    delete,
    path = "/api/flows/{id}",
    params(
        ("id" = Uuid, Path, description = "Flow ID")
    ),
    responses(
        (status = 200, description = "Flow deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Flow not found")
    ),
    security(("bearer_auth" = [])),
    tag = "flows"
)]
pub async fn delete_flow(
    caller: ApiCaller,
    State(service): State<Arc<FlowService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id, caller.user_id).await?;
    Ok(Json(ApiResponse::success(None, None, None)))
}

/// Add a step to a flow
#[utoipa::path(
    post,
    path = "/api/flows/{id}/steps",
    params(
        ("id" = Uuid, Path, description = "Flow ID")
    ),
    request_body = CreateFlowStepDto,
    responses(
        (status = 200, description = "Step added", body = ApiResponse<FlowStepResponseDto>),
        (status = 400, description = "Validation error or unknown prompt"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Flow not found")
    ),
    security(("bearer_auth" = [])),
    tag = "flows"
)]
pub async fn add_flow_step(
    caller: ApiCaller,
    State(service): State<Arc<FlowService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CreateFlowStepDto>,
) -> Result<Json<ApiResponse<FlowStepResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let step = service.add_step(id, caller.user_id, dto).await?;
    Ok(Json(ApiResponse::success(Some(step.into()), None, None)))
}

/// Update a step's title, position or overrides
#[utoipa::path(
    put,
    path = "/api/flows/{id}/steps/{step_id}",
    params(
        ("id" = Uuid, Path, description = "Flow ID"),
        ("step_id" = Uuid, Path, description = "Step ID")
    ),
    request_body = UpdateFlowStepDto,
    responses(
        (status = 200, description = "Step updated", body = ApiResponse<FlowStepResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Flow or step not found")
    ),
    security(("bearer_auth" = [])),
    tag = "flows"
)]
pub async fn update_flow_step(
    caller: ApiCaller,
    State(service): State<Arc<FlowService>>,
    Path((id, step_id)): Path<(Uuid, Uuid)>,
    AppJson(dto): AppJson<UpdateFlowStepDto>,
) -> Result<Json<ApiResponse<FlowStepResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let step = service
        .update_step(id, step_id, caller.user_id, dto)
        .await?;
    Ok(Json(ApiResponse::success(Some(step.into()), None, None)))
}

/// Remove a step from a flow
#[utoipa::path(
    delete,
    path = "/api/flows/{id}/steps/{step_id}",
    params(
        ("id" = Uuid, Path, description = "Flow ID"),
        ("step_id" = Uuid, Path, description = "Step ID")
    ),
    responses(
        (status = 200, description = "Step removed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Flow or step not found")
    ),
    security(("bearer_auth" = [])),
    tag = "flows"
)]
pub async fn delete_flow_step(
    caller: ApiCaller,
    State(service): State<Arc<FlowService>>,
    Path((id, step_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete_step(id, step_id, caller.user_id).await?;
    Ok(Json(ApiResponse::success(None, None, None)))
}
