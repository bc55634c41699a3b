use axum::{extract::Path, extract::State, Json};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::models::ApiCaller;
use crate::features::folders::dtos::{CreateFolderDto, FolderResponseDto, UpdateFolderDto};
use crate::features::folders::services::FolderService;
use crate::shared::types::ApiResponse;

/// Create a folder
#[utoipa::path(
    post,
    path = "/api/folders",
    request_body = CreateFolderDto,
    responses(
        (status = 200, description = "Folder created", body = ApiResponse<FolderResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "folders"
)]
pub async fn create_folder(
    caller: ApiCaller,
    State(service): State<Arc<FolderService>>,
    AppJson(dto): AppJson<CreateFolderDto>,
) -> Result<Json<ApiResponse<FolderResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let folder = service.create(caller.user_id, dto).await?;
    Ok(Json(ApiResponse::success(Some(folder.into()), None, None)))
}

/// List the caller's folders as a flat list
#[utoipa::path(
    get,
    path = "/api/folders",
    responses(
        (status = 200, description = "Folders retrieved", body = ApiResponse<Vec<FolderResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "folders"
)]
pub async fn list_folders(
    caller: ApiCaller,
    State(service): State<Arc<FolderService>>,
) -> Result<Json<ApiResponse<Vec<FolderResponseDto>>>> {
    let folders = service.list(caller.user_id).await?;
    let dtos: Vec<FolderResponseDto> = folders.into_iter().map(|f| f.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Update a folder
#[utoipa::path(
    put,
    path = "/api/folders/{id}",
    params(
        ("id" = Uuid, Path, description = "Folder ID")
    ),
    request_body = UpdateFolderDto,
    responses(
        (status = 200, description = "Folder updated", body = ApiResponse<FolderResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Folder not found")
    ),
    security(("bearer_auth" = [])),
    tag = "folders"
)]
pub async fn update_folder(
    caller: ApiCaller,
    State(service): State<Arc<FolderService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateFolderDto>,
) -> Result<Json<ApiResponse<FolderResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let folder = service.update(id, caller.user_id, dto).await?;
    Ok(Json(ApiResponse::success(Some(folder.into()), None, None)))
}

/// Delete a folder, reassigning its contents to the root
#[utoipa::path(
    delete,
    path = "/api/folders/{id}",
    params(
        ("id" = Uuid, Path, description = "Folder ID")
    ),
    responses(
        (status = 200, description = "Folder deleted; contents moved to root"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Folder not found")
    ),
    security(("bearer_auth" = [])),
    tag = "folders"
)]
pub async fn delete_folder(
    caller: ApiCaller,
    State(service): State<Arc<FolderService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id, caller.user_id).await?;
    Ok(Json(ApiResponse::success(None, None, None)))
}
