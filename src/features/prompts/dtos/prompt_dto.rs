use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::prompts::models::{Prompt, PromptAccess, PromptVersion};
use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

// Sort direction
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Desc,
    Asc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Listing scope: the caller's own prompts or the public gallery
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PromptScope {
    #[default]
    Mine,
    Public,
}

// Helper functions for defaults
fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

// Query params for listing prompts
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct PromptQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,

    /// Search in title or content
    pub search: Option<String>,

    /// Which prompts to list (default: the caller's own)
    #[serde(default)]
    pub scope: PromptScope,

    /// Sort direction on created_at (default: desc)
    #[serde(default)]
    pub sort: SortDirection,
}

impl PromptQueryParams {
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }

    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

// Create request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePromptDto {
    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub content: String,

    pub access: Option<PromptAccess>,

    pub tags: Option<Vec<String>>,

    pub folder_id: Option<Uuid>,

    pub notes: Option<String>,

    pub output_sample: Option<String>,

    pub media_urls: Option<Vec<String>>,

    /// Setting a password marks the prompt as password protected
    #[validate(length(min = 1, max = 128))]
    pub password: Option<String>,
}

// Update request; a title or content change snapshots a new version
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePromptDto {
    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub content: Option<String>,

    pub access: Option<PromptAccess>,

    pub tags: Option<Vec<String>>,

    pub folder_id: Option<Uuid>,

    pub notes: Option<String>,

    pub output_sample: Option<String>,

    pub media_urls: Option<Vec<String>>,

    /// Recorded on the version snapshot created by this edit
    #[validate(length(max = 500))]
    pub commit_message: Option<String>,

    /// Replaces the prompt password
    #[validate(length(min = 1, max = 128))]
    pub password: Option<String>,
}

// Response DTO (never exposes the password hash)
#[derive(Debug, Serialize, ToSchema)]
pub struct PromptResponseDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: Option<String>,
    pub content: String,
    pub access: PromptAccess,
    pub tags: Vec<String>,
    pub views: i32,
    pub like_count: i32,
    pub fork_count: i32,
    pub original_prompt_id: Option<Uuid>,
    pub is_password_protected: bool,
    pub current_version: i32,
    pub total_versions: i32,
    pub folder_id: Option<Uuid>,
    pub notes: Option<String>,
    pub output_sample: Option<String>,
    pub media_urls: Option<Vec<String>>,
    /// Unique placeholder names found in the content, in first-occurrence order
    pub variables: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Prompt> for PromptResponseDto {
    fn from(p: Prompt) -> Self {
        let variables = crate::shared::template::extract_variables(&p.content);
        Self {
            id: p.id,
            user_id: p.user_id,
            title: p.title,
            content: p.content,
            access: p.access,
            tags: p.tags,
            views: p.views,
            like_count: p.like_count,
            fork_count: p.fork_count,
            original_prompt_id: p.original_prompt_id,
            is_password_protected: p.is_password_protected,
            current_version: p.current_version,
            total_versions: p.total_versions,
            folder_id: p.folder_id,
            notes: p.notes,
            output_sample: p.output_sample,
            media_urls: p.media_urls,
            variables,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PromptVersionResponseDto {
    pub id: Uuid,
    pub prompt_id: Uuid,
    pub version_number: i32,
    pub title: Option<String>,
    pub content: String,
    pub commit_message: Option<String>,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
}

impl From<PromptVersion> for PromptVersionResponseDto {
    fn from(v: PromptVersion) -> Self {
        Self {
            id: v.id,
            prompt_id: v.prompt_id,
            version_number: v.version_number,
            title: v.title,
            content: v.content,
            commit_message: v.commit_message,
            is_current: v.is_current,
            created_at: v.created_at,
        }
    }
}

/// Result of a like toggle
#[derive(Debug, Serialize, ToSchema)]
pub struct LikeResponseDto {
    pub liked: bool,
    pub like_count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_dto_surfaces_variables_and_hides_hash() {
        let prompt = Prompt {
            id: Uuid::from_u128(1),
            user_id: Uuid::from_u128(2),
            title: Some("Greeting".to_string()),
            content: "Hello {{name}}, welcome to {{place}}".to_string(),
            access: PromptAccess::Public,
            tags: vec!["demo".to_string()],
            views: 0,
            like_count: 0,
            fork_count: 0,
            original_prompt_id: None,
            is_password_protected: true,
            password_hash: Some("$2b$12$secret".to_string()),
            current_version: 1,
            total_versions: 1,
            folder_id: None,
            notes: None,
            output_sample: None,
            media_urls: None,
            created_at: Utc::now(),
        };

        let dto = PromptResponseDto::from(prompt);
        assert_eq!(dto.variables, vec!["name", "place"]);

        let json = serde_json::to_string(&dto).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("$2b$12$secret"));
    }

    #[test]
    fn test_query_params_defaults() {
        let params: PromptQueryParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, DEFAULT_PAGE_SIZE);
        assert!(matches!(params.scope, PromptScope::Mine));
    }
}
