use axum::{extract::Path, extract::State, Json};
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{ApiKeyResponseDto, CreateApiKeyDto};
use crate::features::auth::models::ApiCaller;
use crate::features::auth::services::ApiKeyService;
use crate::shared::types::ApiResponse;

/// Mint a new caller API key (public bootstrap endpoint)
#[utoipa::path(
    post,
    path = "/api/keys",
    request_body = CreateApiKeyDto,
    responses(
        (status = 200, description = "API key created; the key is only returned here", body = ApiResponse<ApiKeyResponseDto>)
    ),
    tag = "api-keys"
)]
pub async fn create_api_key(
    State(service): State<Arc<ApiKeyService>>,
    AppJson(dto): AppJson<CreateApiKeyDto>,
) -> Result<Json<ApiResponse<ApiKeyResponseDto>>> {
    let key = service.mint(dto.user_id).await?;
    Ok(Json(ApiResponse::success(Some(key.into()), None, None)))
}

/// List the caller's API keys
#[utoipa::path(
    get,
    path = "/api/keys",
    responses(
        (status = 200, description = "Caller's API keys", body = ApiResponse<Vec<ApiKeyResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "api-keys"
)]
pub async fn list_api_keys(
    caller: ApiCaller,
    State(service): State<Arc<ApiKeyService>>,
) -> Result<Json<ApiResponse<Vec<ApiKeyResponseDto>>>> {
    let keys = service.list_for_user(caller.user_id).await?;
    let dtos: Vec<ApiKeyResponseDto> = keys.into_iter().map(|k| k.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Revoke one of the caller's API keys
#[utoipa::path(
    delete,
    path = "/api/keys/{key}",
    params(
        ("key" = String, Path, description = "The key to revoke")
    ),
    responses(
        (status = 200, description = "API key revoked"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "API key not found")
    ),
    security(("bearer_auth" = [])),
    tag = "api-keys"
)]
pub async fn revoke_api_key(
    caller: ApiCaller,
    State(service): State<Arc<ApiKeyService>>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    service.revoke(caller.user_id, &key).await?;
    Ok(Json(ApiResponse::success(None, None, None)))
}
