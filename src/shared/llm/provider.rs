//! Single adapter over the supported LLM vendors.
//!
//! Each vendor differs in three places only: the endpoint URL, how the API
//! key travels (bearer header, `x-api-key` header, or URL query parameter)
//! and the JSON shape of the request/response. Those differences live in a
//! per-vendor configuration; the dispatch path is shared.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use utoipa::ToSchema;

/// Raised on a non-2xx vendor response or a response body missing the
/// expected completion field. No retries are attempted anywhere; a vendor
/// outage surfaces directly as the request's failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ProviderError(pub String);

/// Supported LLM vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
    Llama,
    Groq,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::OpenAi => write!(f, "openai"),
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::Google => write!(f, "google"),
            Provider::Llama => write!(f, "llama"),
            Provider::Groq => write!(f, "groq"),
        }
    }
}

/// How the vendor expects the API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthStyle {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `x-api-key: <key>` plus the anthropic-version header
    ApiKeyHeader,
    /// `?key=<key>` appended to the endpoint URL
    QueryParam,
}

/// Which request/response envelope the vendor speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WireFormat {
    /// `/chat/completions` with `choices[0].message.content`
    OpenAiChat,
    /// `/v1/messages` with `content[0].text`
    AnthropicMessages,
    /// `:generateContent` with `candidates[0].content.parts[0].text`
    GoogleGenerateContent,
}

impl Provider {
    fn auth_style(&self) -> AuthStyle {
        match self {
            Provider::OpenAi | Provider::Llama | Provider::Groq => AuthStyle::Bearer,
            Provider::Anthropic => AuthStyle::ApiKeyHeader,
            Provider::Google => AuthStyle::QueryParam,
        }
    }

    fn wire_format(&self) -> WireFormat {
        match self {
            Provider::OpenAi | Provider::Llama | Provider::Groq => WireFormat::OpenAiChat,
            Provider::Anthropic => WireFormat::AnthropicMessages,
            Provider::Google => WireFormat::GoogleGenerateContent,
        }
    }

    fn endpoint(&self, model: &str, api_key: &str) -> String {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1/chat/completions".to_string(),
            Provider::Groq => "https://api.groq.com/openai/v1/chat/completions".to_string(),
            Provider::Llama => "https://api.llama-api.com/chat/completions".to_string(),
            Provider::Anthropic => "https://api.anthropic.com/v1/messages".to_string(),
            Provider::Google => format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
                model,
                urlencoding::encode(api_key)
            ),
        }
    }
}

/// Normalized completion request handed to the adapter.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Seam between the executors and the vendor HTTP calls. The production
/// implementation is [`ProviderClient`]; tests substitute a recording fake.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;
}

/// Build the vendor-specific request body for the normalized inputs.
fn build_request_body(request: &CompletionRequest) -> Value {
    match request.provider.wire_format() {
        WireFormat::OpenAiChat => json!({
            "model": request.model,
            "messages": [{"role": "user", "content": request.prompt}],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        }),
        WireFormat::AnthropicMessages => json!({
            "model": request.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "messages": [{"role": "user", "content": request.prompt}],
        }),
        WireFormat::GoogleGenerateContent => json!({
            "contents": [{"parts": [{"text": request.prompt}]}],
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": request.max_tokens,
            },
        }),
    }
}

/// Pull the completion text out of a vendor response body.
fn extract_completion(provider: Provider, body: &Value) -> Option<String> {
    let text = match provider.wire_format() {
        WireFormat::OpenAiChat => body["choices"][0]["message"]["content"].as_str(),
        WireFormat::AnthropicMessages => body["content"][0]["text"].as_str(),
        WireFormat::GoogleGenerateContent => {
            body["candidates"][0]["content"]["parts"][0]["text"].as_str()
        }
    };
    text.map(|t| t.to_string())
}

/// HTTP adapter for all supported vendors.
pub struct ProviderClient {
    client: reqwest::Client,
}

impl ProviderClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("promptby-core/0.1")
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

impl Default for ProviderClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionBackend for ProviderClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let provider = request.provider;
        let url = provider.endpoint(&request.model, &request.api_key);
        let body = build_request_body(&request);

        let mut http_request = self.client.post(&url).json(&body);
        http_request = match provider.auth_style() {
            AuthStyle::Bearer => http_request.bearer_auth(&request.api_key),
            AuthStyle::ApiKeyHeader => http_request
                .header("x-api-key", &request.api_key)
                .header("anthropic-version", "2023-06-01"),
            AuthStyle::QueryParam => http_request,
        };

        let response = http_request.send().await.map_err(|e| {
            tracing::error!("{} request failed: {:?}", provider, e);
            ProviderError(format!("{} request failed: {}", provider, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!("{} returned status {}: {}", provider, status, detail);
            return Err(ProviderError(format!(
                "{} API error ({}): {}",
                provider,
                status.as_u16(),
                detail
            )));
        }

        let parsed: Value = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse {} response: {:?}", provider, e);
            ProviderError(format!("Failed to parse {} response: {}", provider, e))
        })?;

        extract_completion(provider, &parsed).ok_or_else(|| {
            ProviderError(format!("{} response missing completion text", provider))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_for(provider: Provider) -> CompletionRequest {
        CompletionRequest {
            provider,
            api_key: "sk-test".to_string(),
            model: "test-model".to_string(),
            prompt: "hello".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }

    #[test]
    fn test_provider_deserializes_lowercase_names() {
        assert_eq!(
            serde_json::from_str::<Provider>("\"openai\"").unwrap(),
            Provider::OpenAi
        );
        assert_eq!(
            serde_json::from_str::<Provider>("\"groq\"").unwrap(),
            Provider::Groq
        );
        assert!(serde_json::from_str::<Provider>("\"mistral\"").is_err());
    }

    #[test]
    fn test_openai_compatible_request_body() {
        let body = build_request_body(&request_for(Provider::Groq));
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["max_tokens"], 1000);
    }

    #[test]
    fn test_google_request_body_uses_generation_config() {
        let body = build_request_body(&request_for(Provider::Google));
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1000);
        assert!(body.get("model").is_none());
    }

    #[test]
    fn test_google_endpoint_embeds_model_and_encoded_key() {
        let url = Provider::Google.endpoint("gemini-pro", "k/with slash");
        assert!(url.contains("/models/gemini-pro:generateContent"));
        assert!(url.contains("key=k%2Fwith%20slash"));
    }

    #[test]
    fn test_extract_completion_openai_shape() {
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "hi there"}}]
        });
        assert_eq!(
            extract_completion(Provider::OpenAi, &body),
            Some("hi there".to_string())
        );
    }

    #[test]
    fn test_extract_completion_anthropic_shape() {
        let body = serde_json::json!({
            "content": [{"type": "text", "text": "claude says hi"}]
        });
        assert_eq!(
            extract_completion(Provider::Anthropic, &body),
            Some("claude says hi".to_string())
        );
    }

    #[test]
    fn test_extract_completion_google_shape() {
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "gemini says hi"}]}}]
        });
        assert_eq!(
            extract_completion(Provider::Google, &body),
            Some("gemini says hi".to_string())
        );
    }

    #[test]
    fn test_extract_completion_missing_field_is_none() {
        let body = serde_json::json!({"error": {"message": "quota exceeded"}});
        assert_eq!(extract_completion(Provider::OpenAi, &body), None);
        assert_eq!(extract_completion(Provider::Anthropic, &body), None);
        assert_eq!(extract_completion(Provider::Google, &body), None);
    }
}
