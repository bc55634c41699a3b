use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::audit::{dtos as audit_dtos, handlers as audit_handlers};
use crate::features::auth::{dtos as auth_dtos, handlers as auth_handlers};
use crate::features::execution::{dtos as execution_dtos, handlers as execution_handlers};
use crate::features::flows::{dtos as flows_dtos, handlers as flows_handlers};
use crate::features::folders::{dtos as folders_dtos, handlers as folders_handlers};
use crate::features::prompts::{dtos as prompts_dtos, handlers as prompts_handlers};
use crate::shared::llm::Provider;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // API keys
        auth_handlers::api_key_handler::create_api_key,
        auth_handlers::api_key_handler::list_api_keys,
        auth_handlers::api_key_handler::revoke_api_key,
        // Prompts
        prompts_handlers::prompt_handler::create_prompt,
        prompts_handlers::prompt_handler::list_prompts,
        prompts_handlers::prompt_handler::get_prompt,
        prompts_handlers::prompt_handler::update_prompt,
        prompts_handlers::prompt_handler::delete_prompt,
        prompts_handlers::prompt_handler::fork_prompt,
        prompts_handlers::prompt_handler::toggle_like,
        prompts_handlers::prompt_handler::list_versions,
        prompts_handlers::prompt_handler::restore_version,
        // Folders
        folders_handlers::folder_handler::create_folder,
        folders_handlers::folder_handler::list_folders,
        folders_handlers::folder_handler::update_folder,
        folders_handlers::folder_handler::delete_folder,
        // Flows
        flows_handlers::flow_handler::create_flow,
        flows_handlers::flow_handler::list_flows,
        flows_handlers::flow_handler::get_flow,
        flows_handlers::flow_handler::delete_flow,
        flows_handlers::flow_handler::add_flow_step,
        flows_handlers::flow_handler::update_flow_step,
        flows_handlers::flow_handler::delete_flow_step,
        // Execution
        execution_handlers::run_handler::run_prompt,
        execution_handlers::run_handler::run_flow,
        // Logs
        audit_handlers::audit_handler::list_logs,
    ),
    components(
        schemas(
            // Shared
            Meta,
            Provider,
            // API keys
            auth_dtos::CreateApiKeyDto,
            auth_dtos::ApiKeyResponseDto,
            ApiResponse<auth_dtos::ApiKeyResponseDto>,
            ApiResponse<Vec<auth_dtos::ApiKeyResponseDto>>,
            // Prompts
            prompts_dtos::CreatePromptDto,
            prompts_dtos::UpdatePromptDto,
            prompts_dtos::PromptResponseDto,
            prompts_dtos::PromptVersionResponseDto,
            prompts_dtos::LikeResponseDto,
            prompts_dtos::PromptQueryParams,
            ApiResponse<prompts_dtos::PromptResponseDto>,
            ApiResponse<Vec<prompts_dtos::PromptResponseDto>>,
            ApiResponse<Vec<prompts_dtos::PromptVersionResponseDto>>,
            ApiResponse<prompts_dtos::LikeResponseDto>,
            // Folders
            folders_dtos::CreateFolderDto,
            folders_dtos::UpdateFolderDto,
            folders_dtos::FolderResponseDto,
            ApiResponse<folders_dtos::FolderResponseDto>,
            ApiResponse<Vec<folders_dtos::FolderResponseDto>>,
            // Flows
            flows_dtos::CreateFlowDto,
            flows_dtos::CreateFlowStepDto,
            flows_dtos::UpdateFlowStepDto,
            flows_dtos::FlowResponseDto,
            flows_dtos::FlowStepResponseDto,
            flows_dtos::FlowDetailResponseDto,
            ApiResponse<flows_dtos::FlowResponseDto>,
            ApiResponse<Vec<flows_dtos::FlowResponseDto>>,
            ApiResponse<flows_dtos::FlowDetailResponseDto>,
            ApiResponse<flows_dtos::FlowStepResponseDto>,
            // Execution
            execution_dtos::RunPromptRequest,
            execution_dtos::RunFlowRequest,
            execution_dtos::RunPromptResponse,
            execution_dtos::RunFlowResponse,
            execution_dtos::PromptRunInfo,
            execution_dtos::FlowRunInfo,
            execution_dtos::FlowStepInfo,
            execution_dtos::RunErrorResponse,
            // Logs
            audit_dtos::ApiCallLogResponseDto,
            ApiResponse<Vec<audit_dtos::ApiCallLogResponseDto>>,
        )
    ),
    tags(
        (name = "api-keys", description = "Caller API key management"),
        (name = "prompts", description = "Prompt CRUD, forking, likes and version history"),
        (name = "folders", description = "Folder tree organization"),
        (name = "flows", description = "Multi-step prompt flows"),
        (name = "execution", description = "Prompt and flow execution against AI providers"),
        (name = "logs", description = "Execution call logs"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Promptby API",
        version = "0.1.0",
        description = "Prompt management and execution service",
    )
)]
pub struct ApiDoc;

/// Adds the bearer API-key security scheme to the OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("API key")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
