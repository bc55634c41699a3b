use axum::{extract::Path, extract::Query, extract::State, Json};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::models::ApiCaller;
use crate::features::prompts::dtos::{
    CreatePromptDto, LikeResponseDto, PromptQueryParams, PromptResponseDto,
    PromptVersionResponseDto, UpdatePromptDto,
};
use crate::features::prompts::services::PromptService;
use crate::shared::types::{ApiResponse, Meta};

/// Create a new prompt
#[utoipa::path(
    post,
    path = "/api/prompts",
    request_body = CreatePromptDto,
    responses(
        (status = 200, description = "Prompt created", body = ApiResponse<PromptResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "prompts"
)]
pub async fn create_prompt(
    caller: ApiCaller,
    State(service): State<Arc<PromptService>>,
    AppJson(dto): AppJson<CreatePromptDto>,
) -> Result<Json<ApiResponse<PromptResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let prompt = service.create(caller.user_id, dto).await?;
    Ok(Json(ApiResponse::success(Some(prompt.into()), None, None)))
}

/// List prompts (own or public gallery) with pagination and search
#[utoipa::path(
    get,
    path = "/api/prompts",
    params(PromptQueryParams),
    responses(
        (status = 200, description = "Prompts retrieved", body = ApiResponse<Vec<PromptResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "prompts"
)]
pub async fn list_prompts(
    caller: ApiCaller,
    State(service): State<Arc<PromptService>>,
    Query(params): Query<PromptQueryParams>,
) -> Result<Json<ApiResponse<Vec<PromptResponseDto>>>> {
    let (prompts, total) = service.list(caller.user_id, &params).await?;
    let dtos: Vec<PromptResponseDto> = prompts.into_iter().map(|p| p.into()).collect();
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Get a prompt by ID (owner or public)
#[utoipa::path(
    get,
    path = "/api/prompts/{id}",
    params(
        ("id" = Uuid, Path, description = "Prompt ID")
    ),
    responses(
        (status = 200, description = "Prompt found", body = ApiResponse<PromptResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Prompt is private"),
        (status = 404, description = "Prompt not found")
    ),
    security(("bearer_auth" = [])),
    tag = "prompts"
)]
pub async fn get_prompt(
    caller: ApiCaller,
    State(service): State<Arc<PromptService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PromptResponseDto>>> {
    let prompt = service.get_for_caller(id, caller.user_id).await?;
    Ok(Json(ApiResponse::success(Some(prompt.into()), None, None)))
}

/// Update a prompt; title/content changes snapshot a new version
#[utoipa::path(
    put,
    path = "/api/prompts/{id}",
    params(
        ("id" = Uuid, Path, description = "Prompt ID")
    ),
    request_body = UpdatePromptDto,
    responses(
        (status = 200, description = "Prompt updated", body = ApiResponse<PromptResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Prompt not found")
    ),
    security(("bearer_auth" = [])),
    tag = "prompts"
)]
pub async fn update_prompt(
    caller: ApiCaller,
    State(service): State<Arc<PromptService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdatePromptDto>,
) -> Result<Json<ApiResponse<PromptResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let prompt = service.update(id, caller.user_id, dto).await?;
    Ok(Json(ApiResponse::success(Some(prompt.into()), None, None)))
}

/// Delete a prompt
#[utoipa::path(
    delete,
    path = "/api/prompts/{id}",
    params(
        ("id" = Uuid, Path, description = "Prompt ID")
    ),
    responses(
        (status = 200, description = "Prompt deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Prompt not found")
    ),
    security(("bearer_auth" = [])),
    tag = "prompts"
)]
pub async fn delete_prompt(
    caller: ApiCaller,
    State(service): State<Arc<PromptService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id, caller.user_id).await?;
    Ok(Json(ApiResponse::success(None, None, None)))
}

/// Fork a public prompt into a private copy owned by the caller
#[utoipa::path(
    post,
    path = "/api/prompts/{id}/fork",
    params(
        ("id" = Uuid, Path, description = "Prompt ID")
    ),
    responses(
        (status = 200, description = "Fork created", body = ApiResponse<PromptResponseDto>),
        (status = 400, description = "Prompt is already a fork"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Prompt is private"),
        (status = 404, description = "Prompt not found")
    ),
    security(("bearer_auth" = [])),
    tag = "prompts"
)]
pub async fn fork_prompt(
    caller: ApiCaller,
    State(service): State<Arc<PromptService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PromptResponseDto>>> {
    let fork = service.fork(id, caller.user_id).await?;
    Ok(Json(ApiResponse::success(Some(fork.into()), None, None)))
}

/// Toggle the caller's like on a prompt
#[utoipa::path(
    post,
    path = "/api/prompts/{id}/like",
    params(
        ("id" = Uuid, Path, description = "Prompt ID")
    ),
    responses(
        (status = 200, description = "Like toggled", body = ApiResponse<LikeResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Prompt not found")
    ),
    security(("bearer_auth" = [])),
    tag = "prompts"
)]
pub async fn toggle_like(
    caller: ApiCaller,
    State(service): State<Arc<PromptService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<LikeResponseDto>>> {
    let result = service.toggle_like(id, caller.user_id).await?;
    Ok(Json(ApiResponse::success(Some(result), None, None)))
}

/// List a prompt's version history, newest first
#[utoipa::path(
    get,
    path = "/api/prompts/{id}/versions",
    params(
        ("id" = Uuid, Path, description = "Prompt ID")
    ),
    responses(
        (status = 200, description = "Version history", body = ApiResponse<Vec<PromptVersionResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Prompt not found")
    ),
    security(("bearer_auth" = [])),
    tag = "prompts"
)]
pub async fn list_versions(
    caller: ApiCaller,
    State(service): State<Arc<PromptService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<PromptVersionResponseDto>>>> {
    let versions = service.versions(id, caller.user_id).await?;
    let dtos: Vec<PromptVersionResponseDto> = versions.into_iter().map(|v| v.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Restore an earlier version as the current one
#[utoipa::path(
    post,
    path = "/api/prompts/{id}/versions/{version_number}/restore",
    params(
        ("id" = Uuid, Path, description = "Prompt ID"),
        ("version_number" = i32, Path, description = "Version number to restore")
    ),
    responses(
        (status = 200, description = "Version restored", body = ApiResponse<PromptResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Prompt or version not found")
    ),
    security(("bearer_auth" = [])),
    tag = "prompts"
)]
pub async fn restore_version(
    caller: ApiCaller,
    State(service): State<Arc<PromptService>>,
    Path((id, version_number)): Path<(Uuid, i32)>,
) -> Result<Json<ApiResponse<PromptResponseDto>>> {
    let prompt = service
        .restore_version(id, version_number, caller.user_id)
        .await?;
    Ok(Json(ApiResponse::success(Some(prompt.into()), None, None)))
}
