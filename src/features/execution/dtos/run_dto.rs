use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::execution::error::ExecutionError;
use crate::shared::llm::Provider;

fn default_provider() -> Provider {
    Provider::Groq
}

fn default_model() -> String {
    "llama3-8b-8192".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

/// Wire shape of `POST /api/run/prompt`. `prompt_id` and `api_key` are
/// required; their absence is reported with a field-specific message rather
/// than a serde error, so they deserialize as options here.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RunPromptRequest {
    pub prompt_id: Option<Uuid>,

    #[serde(default)]
    pub variables: HashMap<String, String>,

    /// The *target provider's* key, not the caller's bearer key
    pub api_key: Option<String>,

    #[serde(default = "default_provider")]
    pub provider: Provider,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    pub password: Option<String>,
}

/// Wire shape of `POST /api/run/flow`
#[derive(Debug, Deserialize, ToSchema)]
pub struct RunFlowRequest {
    pub flow_id: Option<Uuid>,

    #[serde(default)]
    pub variables: HashMap<String, String>,

    pub api_key: Option<String>,

    #[serde(default = "default_provider")]
    pub provider: Provider,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

/// A validated single-prompt run
#[derive(Debug, Clone)]
pub struct PromptRunParams {
    pub prompt_id: Uuid,
    pub variables: HashMap<String, String>,
    pub api_key: String,
    pub provider: Provider,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub password: Option<String>,
}

/// A validated flow run
#[derive(Debug, Clone)]
pub struct FlowRunParams {
    pub flow_id: Uuid,
    pub variables: HashMap<String, String>,
    pub api_key: String,
    pub provider: Provider,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

pub fn parse_run_prompt_request(body: &[u8]) -> Result<PromptRunParams, ExecutionError> {
    let raw: RunPromptRequest = serde_json::from_slice(body)
        .map_err(|e| ExecutionError::validation(format!("Invalid request body: {}", e)))?;

    let prompt_id = raw
        .prompt_id
        .ok_or_else(|| ExecutionError::validation("Missing required field: prompt_id"))?;

    let api_key = raw
        .api_key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ExecutionError::validation("Missing required field: api_key"))?;

    Ok(PromptRunParams {
        prompt_id,
        variables: raw.variables,
        api_key,
        provider: raw.provider,
        model: raw.model,
        temperature: raw.temperature,
        max_tokens: raw.max_tokens,
        password: raw.password,
    })
}

pub fn parse_run_flow_request(body: &[u8]) -> Result<FlowRunParams, ExecutionError> {
    let raw: RunFlowRequest = serde_json::from_slice(body)
        .map_err(|e| ExecutionError::validation(format!("Invalid request body: {}", e)))?;

    let flow_id = raw
        .flow_id
        .ok_or_else(|| ExecutionError::validation("Missing required field: flow_id"))?;

    let api_key = raw
        .api_key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ExecutionError::validation("Missing required field: api_key"))?;

    Ok(FlowRunParams {
        flow_id,
        variables: raw.variables,
        api_key,
        provider: raw.provider,
        model: raw.model,
        temperature: raw.temperature,
        max_tokens: raw.max_tokens,
    })
}

// =============================================================================
// RESPONSES
// =============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct PromptRunInfo {
    pub id: Uuid,
    pub title: Option<String>,
    pub processed_content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RunPromptResponse {
    pub success: bool,
    pub output: String,
    pub prompt: PromptRunInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FlowStepInfo {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FlowRunInfo {
    pub id: Uuid,
    pub name: String,
    pub steps: Vec<FlowStepInfo>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RunFlowResponse {
    pub success: bool,
    /// The last step's output
    pub output: String,
    /// Every step's output keyed by step id
    pub step_outputs: HashMap<Uuid, String>,
    pub flow: FlowRunInfo,
}

/// Error wire shape shared by both execution endpoints
#[derive(Debug, Serialize, ToSchema)]
pub struct RunErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(rename = "missingVariables", skip_serializing_if = "Option::is_none")]
    pub missing_variables: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_applies_documented_defaults() {
        let body = br#"{"prompt_id":"c6f1b6a0-0000-0000-0000-000000000001","api_key":"sk-x"}"#;
        let params = parse_run_prompt_request(body).unwrap();
        assert_eq!(params.provider, Provider::Groq);
        assert_eq!(params.model, "llama3-8b-8192");
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.max_tokens, 1000);
        assert!(params.variables.is_empty());
        assert!(params.password.is_none());
    }

    #[test]
    fn test_parse_missing_prompt_id_is_field_specific() {
        let err = parse_run_prompt_request(br#"{"api_key":"sk-x"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: prompt_id");
    }

    #[test]
    fn test_parse_missing_api_key_is_field_specific() {
        let err = parse_run_prompt_request(
            br#"{"prompt_id":"c6f1b6a0-0000-0000-0000-000000000001"}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: api_key");

        let err = parse_run_prompt_request(
            br#"{"prompt_id":"c6f1b6a0-0000-0000-0000-000000000001","api_key":""}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: api_key");
    }

    #[test]
    fn test_parse_malformed_json_is_validation_error() {
        let err = parse_run_prompt_request(b"{not json").unwrap_err();
        assert!(err.to_string().starts_with("Invalid request body"));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_parse_flow_request_overrides() {
        let body = br#"{
            "flow_id": "c6f1b6a0-0000-0000-0000-000000000002",
            "api_key": "sk-x",
            "provider": "anthropic",
            "model": "claude-sonnet",
            "temperature": 0.2,
            "max_tokens": 256,
            "variables": {"topic": "cats"}
        }"#;
        let params = parse_run_flow_request(body).unwrap();
        assert_eq!(params.provider, Provider::Anthropic);
        assert_eq!(params.model, "claude-sonnet");
        assert_eq!(params.max_tokens, 256);
        assert_eq!(params.variables.get("topic").map(String::as_str), Some("cats"));
    }

    #[test]
    fn test_parse_unknown_provider_rejected() {
        let body = br#"{
            "flow_id": "c6f1b6a0-0000-0000-0000-000000000002",
            "api_key": "sk-x",
            "provider": "mistral"
        }"#;
        let err = parse_run_flow_request(body).unwrap_err();
        assert!(err.to_string().starts_with("Invalid request body"));
    }
}
