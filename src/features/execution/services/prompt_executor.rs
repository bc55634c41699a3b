use std::sync::Arc;
use uuid::Uuid;

use crate::features::execution::dtos::{PromptRunInfo, PromptRunParams, RunPromptResponse};
use crate::features::execution::error::ExecutionError;
use crate::features::prompts::models::Prompt;
use crate::features::prompts::services::PromptService;
use crate::shared::llm::{CompletionBackend, CompletionRequest};
use crate::shared::password::verify_password;
use crate::shared::template::substitute_variables;

/// Apply the access and password gates, then substitute variables.
///
/// The password gate only applies to non-owners; owners run their own
/// protected prompts without one. Verification is a bcrypt comparison
/// against the stored hash, never plaintext equality.
fn authorize_and_render(
    prompt: &Prompt,
    caller_id: Uuid,
    params: &PromptRunParams,
) -> Result<String, ExecutionError> {
    if !prompt.is_visible_to(caller_id) {
        return Err(ExecutionError::Forbidden(
            "This prompt is private".to_string(),
        ));
    }

    if prompt.is_password_protected && prompt.user_id != caller_id {
        let password = params.password.as_deref().ok_or_else(|| {
            ExecutionError::Password("Password required for this prompt".to_string())
        })?;

        let hash = prompt.password_hash.as_deref().ok_or_else(|| {
            tracing::error!("Prompt {} is password protected but has no hash", prompt.id);
            ExecutionError::Unexpected("Internal server error".to_string())
        })?;

        let matches = verify_password(password, hash)
            .map_err(|_| ExecutionError::Unexpected("Internal server error".to_string()))?;

        if !matches {
            return Err(ExecutionError::Password("Invalid password".to_string()));
        }
    }

    substitute_variables(&prompt.content, &params.variables)
        .map_err(|e| ExecutionError::missing_variables(e.missing))
}

/// Run the full gate-substitute-dispatch sequence for one loaded prompt
async fn execute_prompt(
    prompt: &Prompt,
    caller_id: Uuid,
    params: &PromptRunParams,
    backend: &dyn CompletionBackend,
) -> Result<RunPromptResponse, ExecutionError> {
    let processed = authorize_and_render(prompt, caller_id, params)?;

    let output = backend
        .complete(CompletionRequest {
            provider: params.provider,
            api_key: params.api_key.clone(),
            model: params.model.clone(),
            prompt: processed.clone(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        })
        .await
        .map_err(|e| ExecutionError::Provider(e.0))?;

    Ok(RunPromptResponse {
        success: true,
        output,
        prompt: PromptRunInfo {
            id: prompt.id,
            title: prompt.title.clone(),
            processed_content: processed,
        },
    })
}

/// Single-prompt executor behind `POST /api/run/prompt`. One pass, no
/// retries; any failure short-circuits to its error response.
pub struct ExecutionService {
    prompts: Arc<PromptService>,
    backend: Arc<dyn CompletionBackend>,
}

impl ExecutionService {
    pub fn new(prompts: Arc<PromptService>, backend: Arc<dyn CompletionBackend>) -> Self {
        Self { prompts, backend }
    }

    pub async fn run(
        &self,
        caller_id: Uuid,
        params: PromptRunParams,
    ) -> Result<RunPromptResponse, ExecutionError> {
        let prompt = self
            .prompts
            .find(params.prompt_id)
            .await
            .map_err(ExecutionError::from)?
            .ok_or_else(|| ExecutionError::NotFound("Prompt not found".to_string()))?;

        let response = execute_prompt(&prompt, caller_id, &params, self.backend.as_ref()).await?;

        // Best-effort view count; a failure here never fails the request
        if let Err(e) = self.prompts.increment_views(prompt.id).await {
            tracing::warn!("Failed to increment views for prompt {}: {:?}", prompt.id, e);
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::prompts::models::PromptAccess;
    use crate::shared::llm::{Provider, ProviderError};
    use crate::shared::password::hash_password;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeBackend {
        prompts_seen: Mutex<Vec<String>>,
        output: String,
    }

    impl FakeBackend {
        fn returning(output: &str) -> Self {
            Self {
                prompts_seen: Mutex::new(Vec::new()),
                output: output.to_string(),
            }
        }
    }

    #[async_trait]
    impl CompletionBackend for FakeBackend {
        async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
            self.prompts_seen.lock().unwrap().push(request.prompt);
            Ok(self.output.clone())
        }
    }

    fn owner_id() -> Uuid {
        Uuid::from_u128(10)
    }

    fn stranger_id() -> Uuid {
        Uuid::from_u128(20)
    }

    fn prompt_with(content: &str) -> Prompt {
        Prompt {
            id: Uuid::from_u128(1),
            user_id: owner_id(),
            title: Some("Order status".to_string()),
            content: content.to_string(),
            access: PromptAccess::Public,
            tags: vec![],
            views: 0,
            like_count: 0,
            fork_count: 0,
            original_prompt_id: None,
            is_password_protected: false,
            password_hash: None,
            current_version: 1,
            total_versions: 1,
            folder_id: None,
            notes: None,
            output_sample: None,
            media_urls: None,
            created_at: Utc::now(),
        }
    }

    fn params_with(variables: &[(&str, &str)], password: Option<&str>) -> PromptRunParams {
        PromptRunParams {
            prompt_id: Uuid::from_u128(1),
            variables: variables
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            api_key: "sk-provider".to_string(),
            provider: Provider::Groq,
            model: "llama3-8b-8192".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            password: password.map(|p| p.to_string()),
        }
    }

    #[tokio::test]
    async fn test_happy_path_returns_output_and_processed_content() {
        let prompt = prompt_with("Hello {{name}}");
        let backend = FakeBackend::returning("Hi Ada!");
        let params = params_with(&[("name", "Ada")], None);

        let response = execute_prompt(&prompt, stranger_id(), &params, &backend)
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.output, "Hi Ada!");
        assert_eq!(response.prompt.processed_content, "Hello Ada");
        assert_eq!(
            *backend.prompts_seen.lock().unwrap(),
            vec!["Hello Ada".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_variables_yield_exact_residual_list() {
        let prompt = prompt_with("Hello {{name}}, your order {{id}} is {{status}}");
        let backend = FakeBackend::returning("unused");
        let params = params_with(&[("name", "Ada"), ("id", "42")], None);

        let err = execute_prompt(&prompt, stranger_id(), &params, &backend)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        match err {
            ExecutionError::Validation {
                missing_variables, ..
            } => assert_eq!(missing_variables, Some(vec!["status".to_string()])),
            other => panic!("expected validation error, got {:?}", other),
        }
        // The provider must never be reached with unresolved placeholders
        assert!(backend.prompts_seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_private_prompt_rejects_non_owner() {
        let mut prompt = prompt_with("secret {{x}}");
        prompt.access = PromptAccess::Private;
        let backend = FakeBackend::returning("unused");

        let err = execute_prompt(&prompt, stranger_id(), &params_with(&[("x", "1")], None), &backend)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        // The owner still passes
        let response = execute_prompt(&prompt, owner_id(), &params_with(&[("x", "1")], None), &backend)
            .await
            .unwrap();
        assert!(response.success);
    }

    #[tokio::test]
    async fn test_password_gate_for_non_owner() {
        let mut prompt = prompt_with("classified");
        prompt.is_password_protected = true;
        prompt.password_hash = Some(hash_password("s3cret").unwrap());
        let backend = FakeBackend::returning("ok");

        // No password -> 401
        let err = execute_prompt(&prompt, stranger_id(), &params_with(&[], None), &backend)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        // Wrong password -> 401 with the specific message
        let err = execute_prompt(&prompt, stranger_id(), &params_with(&[], Some("nope")), &backend)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Invalid password");

        // Correct password -> success
        let response =
            execute_prompt(&prompt, stranger_id(), &params_with(&[], Some("s3cret")), &backend)
                .await
                .unwrap();
        assert!(response.success);
    }

    #[tokio::test]
    async fn test_owner_bypasses_password_gate() {
        let mut prompt = prompt_with("classified");
        prompt.is_password_protected = true;
        prompt.password_hash = Some(hash_password("s3cret").unwrap());
        let backend = FakeBackend::returning("ok");

        let response = execute_prompt(&prompt, owner_id(), &params_with(&[], None), &backend)
            .await
            .unwrap();
        assert!(response.success);
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces_as_provider_error() {
        struct FailingBackend;

        #[async_trait]
        impl CompletionBackend for FailingBackend {
            async fn complete(&self, _request: CompletionRequest) -> Result<String, ProviderError> {
                Err(ProviderError("groq API error (503): overloaded".to_string()))
            }
        }

        let prompt = prompt_with("no variables");
        let err = execute_prompt(&prompt, stranger_id(), &params_with(&[], None), &FailingBackend)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("groq API error"));
    }

    #[tokio::test]
    async fn test_duplicate_placeholders_all_replaced() {
        let prompt = prompt_with("{{name}} likes {{name}}");
        let backend = FakeBackend::returning("ok");
        let mut variables = HashMap::new();
        variables.insert("name".to_string(), "Ada".to_string());

        let mut params = params_with(&[], None);
        params.variables = variables;

        let response = execute_prompt(&prompt, stranger_id(), &params, &backend)
            .await
            .unwrap();
        assert_eq!(response.prompt.processed_content, "Ada likes Ada");
    }
}
