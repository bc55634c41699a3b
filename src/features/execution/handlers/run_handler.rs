use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use std::time::Instant;

use crate::features::audit::models::NewApiCallLog;
use crate::features::audit::services::{redact_request_body, AuditLogService};
use crate::features::auth::models::ApiCaller;
use crate::features::auth::services::ApiKeyService;
use crate::features::execution::dtos::{
    parse_run_flow_request, parse_run_prompt_request, RunErrorResponse, RunFlowRequest,
    RunFlowResponse, RunPromptRequest, RunPromptResponse,
};
use crate::features::execution::error::ExecutionError;
use crate::features::execution::services::{ExecutionService, FlowExecutionService};

/// State for the execution handlers
#[derive(Clone)]
pub struct ExecutionState {
    pub keys: Arc<ApiKeyService>,
    pub audit: Arc<AuditLogService>,
    pub prompt_executor: Arc<ExecutionService>,
    pub flow_executor: Arc<FlowExecutionService>,
}

/// Resolve the caller from the Authorization header. Missing header, wrong
/// scheme and unknown key all collapse to the same 401.
async fn authenticate(
    state: &ExecutionState,
    headers: &HeaderMap,
) -> Result<ApiCaller, ExecutionError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| ExecutionError::Auth("Invalid API key".to_string()))?;

    state
        .keys
        .authenticate(token)
        .await
        .map_err(ExecutionError::from)?
        .ok_or_else(|| ExecutionError::Auth("Invalid API key".to_string()))
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        })
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Serialize the outcome, write the single audit row for this invocation,
/// and build the HTTP response. The audit write is fire-and-forget: it can
/// neither delay nor change the response already computed here.
fn finish<T: serde::Serialize>(
    state: &ExecutionState,
    endpoint: &str,
    headers: &HeaderMap,
    body: &Bytes,
    caller: Option<&ApiCaller>,
    started: Instant,
    result: Result<T, ExecutionError>,
) -> Response {
    let (status, response_body) = match result {
        Ok(response) => (
            StatusCode::OK,
            serde_json::to_value(response).unwrap_or(serde_json::Value::Null),
        ),
        Err(e) => (
            e.status_code(),
            serde_json::to_value(e.to_body()).unwrap_or(serde_json::Value::Null),
        ),
    };

    state.audit.record(NewApiCallLog {
        user_id: caller.map(|c| c.user_id),
        endpoint: endpoint.to_string(),
        method: "POST".to_string(),
        status: status.as_u16() as i32,
        request_body: Some(redact_request_body(body)),
        response_body: serde_json::to_string(&response_body).ok(),
        duration_ms: started.elapsed().as_millis() as i64,
        ip_address: client_ip(headers),
        user_agent: user_agent(headers),
    });

    (status, Json(response_body)).into_response()
}

/// Execute a single prompt against an AI provider
#[utoipa::path(
    post,
    path = "/api/run/prompt",
    request_body = RunPromptRequest,
    responses(
        (status = 200, description = "Prompt executed", body = RunPromptResponse),
        (status = 400, description = "Malformed body, missing field, or unresolved variables", body = RunErrorResponse),
        (status = 401, description = "Invalid API key or prompt password", body = RunErrorResponse),
        (status = 403, description = "Prompt is private", body = RunErrorResponse),
        (status = 404, description = "Prompt not found", body = RunErrorResponse),
        (status = 500, description = "Provider failure", body = RunErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "execution"
)]
pub async fn run_prompt(
    State(state): State<ExecutionState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let started = Instant::now();

    let (caller, result) = match authenticate(&state, &headers).await {
        Ok(caller) => {
            let outcome = match parse_run_prompt_request(&body) {
                Ok(params) => state.prompt_executor.run(caller.user_id, params).await,
                Err(e) => Err(e),
            };
            (Some(caller), outcome)
        }
        Err(e) => (None, Err(e)),
    };

    finish(
        &state,
        "/api/run/prompt",
        &headers,
        &body,
        caller.as_ref(),
        started,
        result,
    )
}

/// Execute a flow: its steps run strictly in order, each step's output
/// feeding the next step's input
#[utoipa::path(
    post,
    path = "/api/run/flow",
    request_body = RunFlowRequest,
    responses(
        (status = 200, description = "Flow executed", body = RunFlowResponse),
        (status = 400, description = "Malformed body, missing field, or unresolved variables", body = RunErrorResponse),
        (status = 401, description = "Invalid API key", body = RunErrorResponse),
        (status = 403, description = "Not the flow owner", body = RunErrorResponse),
        (status = 404, description = "Flow or steps not found", body = RunErrorResponse),
        (status = 500, description = "Provider failure", body = RunErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "execution"
)]
pub async fn run_flow(
    State(state): State<ExecutionState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let started = Instant::now();

    let (caller, result) = match authenticate(&state, &headers).await {
        Ok(caller) => {
            let outcome = match parse_run_flow_request(&body) {
                Ok(params) => state.flow_executor.run(caller.user_id, params).await,
                Err(e) => Err(e),
            };
            (Some(caller), outcome)
        }
        Err(e) => (None, Err(e)),
    };

    finish(
        &state,
        "/api/run/flow",
        &headers,
        &body,
        caller.as_ref(),
        started,
        result,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_ip_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        assert_eq!(client_ip(&headers), Some("203.0.113.9".to_string()));
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        assert_eq!(client_ip(&headers), Some("10.0.0.2".to_string()));
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }

    #[test]
    fn test_user_agent_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, "curl/8.0".parse().unwrap());
        assert_eq!(user_agent(&headers), Some("curl/8.0".to_string()));
    }
}
