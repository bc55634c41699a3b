use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::features::execution::dtos::{
    FlowRunInfo, FlowRunParams, FlowStepInfo, RunFlowResponse,
};
use crate::features::execution::error::ExecutionError;
use crate::features::flows::models::ExecutableStep;
use crate::features::flows::services::FlowService;
use crate::shared::llm::{CompletionBackend, CompletionRequest};
use crate::shared::template::substitute_variables;

/// Merge a step's override variables with the request-level map.
///
/// Step-level values are loaded first and request-level values are written
/// over them, so a request-level name silently wins on collision.
fn step_variables(
    overrides: Option<&serde_json::Value>,
    request_vars: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = HashMap::new();

    if let Some(serde_json::Value::Object(map)) = overrides {
        for (name, value) in map {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            merged.insert(name.clone(), value);
        }
    }

    merged.extend(request_vars.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Execute the resolved steps strictly in order, threading each step's
/// output into the next step's input as a plain-text reference block. A
/// failure at any step aborts the remaining steps.
async fn run_steps(
    steps: &[ExecutableStep],
    params: &FlowRunParams,
    backend: &dyn CompletionBackend,
) -> Result<(String, HashMap<Uuid, String>), ExecutionError> {
    let mut step_outputs = HashMap::new();
    let mut previous_output: Option<String> = None;

    for step in steps {
        let variables = step_variables(step.variables.as_ref(), &params.variables);

        let rendered = substitute_variables(&step.content, &variables)
            .map_err(|e| ExecutionError::missing_variables_in_step(&step.step_title, e.missing))?;

        let input = match &previous_output {
            Some(previous) => format!("Reference from previous step:\n{}\n\n{}", previous, rendered),
            None => rendered,
        };

        let output = backend
            .complete(CompletionRequest {
                provider: params.provider,
                api_key: params.api_key.clone(),
                model: params.model.clone(),
                prompt: input,
                temperature: params.temperature,
                max_tokens: params.max_tokens,
            })
            .await
            .map_err(|e| ExecutionError::Provider(e.0))?;

        step_outputs.insert(step.id, output.clone());
        previous_output = Some(output);
    }

    let last_output = previous_output
        .ok_or_else(|| ExecutionError::NotFound("Flow has no steps".to_string()))?;

    Ok((last_output, step_outputs))
}

/// Multi-step executor behind `POST /api/run/flow`. Flows carry no public
/// visibility, so execution is owner-only.
pub struct FlowExecutionService {
    flows: Arc<FlowService>,
    backend: Arc<dyn CompletionBackend>,
}

impl FlowExecutionService {
    pub fn new(flows: Arc<FlowService>, backend: Arc<dyn CompletionBackend>) -> Self {
        Self { flows, backend }
    }

    pub async fn run(
        &self,
        caller_id: Uuid,
        params: FlowRunParams,
    ) -> Result<RunFlowResponse, ExecutionError> {
        let flow = self
            .flows
            .find(params.flow_id)
            .await
            .map_err(ExecutionError::from)?
            .ok_or_else(|| ExecutionError::NotFound("Flow not found".to_string()))?;

        if flow.user_id != caller_id {
            return Err(ExecutionError::Forbidden(
                "You do not have access to this flow".to_string(),
            ));
        }

        let steps = self
            .flows
            .steps_for_execution(flow.id)
            .await
            .map_err(ExecutionError::from)?;

        if steps.is_empty() {
            return Err(ExecutionError::NotFound("Flow has no steps".to_string()));
        }

        let (output, step_outputs) = run_steps(&steps, &params, self.backend.as_ref()).await?;

        Ok(RunFlowResponse {
            success: true,
            output,
            step_outputs,
            flow: FlowRunInfo {
                id: flow.id,
                name: flow.name,
                steps: steps
                    .iter()
                    .map(|s| FlowStepInfo {
                        id: s.id,
                        title: s.step_title.clone(),
                        order_index: s.order_index,
                    })
                    .collect(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::llm::{Provider, ProviderError};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use std::sync::Mutex;

    /// Replays queued outputs and records every prompt it was given
    struct ScriptedBackend {
        prompts_seen: Mutex<Vec<String>>,
        outputs: Mutex<Vec<Result<String, ProviderError>>>,
    }

    impl ScriptedBackend {
        fn new(outputs: Vec<Result<String, ProviderError>>) -> Self {
            Self {
                prompts_seen: Mutex::new(Vec::new()),
                outputs: Mutex::new(outputs),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts_seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
            self.prompts_seen.lock().unwrap().push(request.prompt);
            let mut outputs = self.outputs.lock().unwrap();
            if outputs.is_empty() {
                return Err(ProviderError("no scripted output left".to_string()));
            }
            outputs.remove(0)
        }
    }

    fn step(n: u128, title: &str, content: &str, variables: Option<serde_json::Value>) -> ExecutableStep {
        ExecutableStep {
            id: Uuid::from_u128(n),
            order_index: n as i32,
            step_title: title.to_string(),
            content: content.to_string(),
            variables,
        }
    }

    fn flow_params(variables: &[(&str, &str)]) -> FlowRunParams {
        FlowRunParams {
            flow_id: Uuid::from_u128(99),
            variables: variables
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            api_key: "sk-provider".to_string(),
            provider: Provider::Groq,
            model: "llama3-8b-8192".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }

    #[tokio::test]
    async fn test_steps_run_in_order_and_thread_context() {
        let steps = vec![
            step(1, "Draft", "Write a draft about {{topic}}", None),
            step(2, "Improve", "Improve: {{topic}}", None),
        ];
        let backend = ScriptedBackend::new(vec![
            Ok("draft text".to_string()),
            Ok("improved text".to_string()),
        ]);

        let (output, step_outputs) =
            run_steps(&steps, &flow_params(&[("topic", "cats")]), &backend)
                .await
                .unwrap();

        let prompts = backend.prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0], "Write a draft about cats");
        // Step 2's input carries step 1's output with the exact framing
        assert_eq!(
            prompts[1],
            "Reference from previous step:\ndraft text\n\nImprove: cats"
        );

        assert_eq!(output, "improved text");
        assert_eq!(
            step_outputs.get(&Uuid::from_u128(1)).map(String::as_str),
            Some("draft text")
        );
        assert_eq!(
            step_outputs.get(&Uuid::from_u128(2)).map(String::as_str),
            Some("improved text")
        );
    }

    #[tokio::test]
    async fn test_first_step_has_no_reference_block() {
        let steps = vec![step(1, "Only", "Just {{x}}", None)];
        let backend = ScriptedBackend::new(vec![Ok("done".to_string())]);

        run_steps(&steps, &flow_params(&[("x", "this")]), &backend)
            .await
            .unwrap();

        assert_eq!(backend.prompts(), vec!["Just this".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_variable_aborts_flow_with_step_qualified_error() {
        let steps = vec![
            step(1, "Draft", "No variables here", None),
            step(2, "Summarize", "Summarize in {{tone}} tone", None),
            step(3, "Never runs", "{{x}}", None),
        ];
        let backend = ScriptedBackend::new(vec![
            Ok("first output".to_string()),
            Ok("unreachable".to_string()),
        ]);

        let err = run_steps(&steps, &flow_params(&[]), &backend)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Missing variables in step \"Summarize\": tone"
        );
        // Step 1 ran; steps 2 and 3 never reached the provider
        assert_eq!(backend.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_aborts_remaining_steps() {
        let steps = vec![
            step(1, "A", "a", None),
            step(2, "B", "b", None),
            step(3, "C", "c", None),
        ];
        let backend = ScriptedBackend::new(vec![
            Ok("a out".to_string()),
            Err(ProviderError("groq API error (500): boom".to_string())),
        ]);

        let err = run_steps(&steps, &flow_params(&[]), &backend)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(backend.prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_request_variables_win_over_step_overrides() {
        let steps = vec![step(
            1,
            "Tone",
            "Write in {{tone}} tone",
            Some(serde_json::json!({"tone": "formal"})),
        )];
        let backend = ScriptedBackend::new(vec![Ok("done".to_string())]);

        run_steps(&steps, &flow_params(&[("tone", "casual")]), &backend)
            .await
            .unwrap();

        assert_eq!(backend.prompts(), vec!["Write in casual tone".to_string()]);
    }

    #[tokio::test]
    async fn test_step_overrides_apply_when_request_is_silent() {
        let steps = vec![step(
            1,
            "Tone",
            "Write in {{tone}} tone about {{topic}}",
            Some(serde_json::json!({"tone": "formal"})),
        )];
        let backend = ScriptedBackend::new(vec![Ok("done".to_string())]);

        run_steps(&steps, &flow_params(&[("topic", "storage engines")]), &backend)
            .await
            .unwrap();

        assert_eq!(
            backend.prompts(),
            vec!["Write in formal tone about storage engines".to_string()]
        );
    }

    #[test]
    fn test_step_variables_stringifies_non_string_overrides() {
        let merged = step_variables(
            Some(&serde_json::json!({"count": 3, "name": "Ada"})),
            &HashMap::new(),
        );
        assert_eq!(merged.get("count").map(String::as_str), Some("3"));
        assert_eq!(merged.get("name").map(String::as_str), Some("Ada"));
    }
}
