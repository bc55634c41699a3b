use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Prompt visibility, matching the database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "prompt_access", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PromptAccess {
    Public,
    Private,
}

impl std::fmt::Display for PromptAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromptAccess::Public => write!(f, "public"),
            PromptAccess::Private => write!(f, "private"),
        }
    }
}

/// Database model for a prompt. A non-null `original_prompt_id` marks the
/// row as a fork; forks cannot be forked again.
#[derive(Debug, Clone, FromRow)]
pub struct Prompt {
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
    pub password_hash: Option<String>,
    pub current_version: i32,
    pub total_versions: i32,
    pub folder_id: Option<Uuid>,
    pub notes: Option<String>,
    pub output_sample: Option<String>,
    pub media_urls: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

impl Prompt {
    pub fn is_fork(&self) -> bool {
        self.original_prompt_id.is_some()
    }

    pub fn is_visible_to(&self, user_id: Uuid) -> bool {
        self.access == PromptAccess::Public || self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn prompt() -> Prompt {
        Prompt {
            id: Uuid::from_u128(1),
            user_id: Uuid::from_u128(2),
            title: None,
            content: "hello".to_string(),
            access: PromptAccess::Private,
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

    #[test]
    fn test_fork_is_marked_by_original_prompt_id() {
        let mut p = prompt();
        assert!(!p.is_fork());
        p.original_prompt_id = Some(Uuid::from_u128(7));
        assert!(p.is_fork());
    }

    #[test]
    fn test_private_prompt_visible_only_to_owner() {
        let p = prompt();
        assert!(p.is_visible_to(p.user_id));
        assert!(!p.is_visible_to(Uuid::from_u128(42)));
    }

    #[test]
    fn test_public_prompt_visible_to_everyone() {
        let mut p = prompt();
        p.access = PromptAccess::Public;
        assert!(p.is_visible_to(Uuid::from_u128(42)));
    }

    #[test]
    fn test_access_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PromptAccess::Public).unwrap(),
            "\"public\""
        );
        assert_eq!(
            serde_json::from_str::<PromptAccess>("\"private\"").unwrap(),
            PromptAccess::Private
        );
    }
}
