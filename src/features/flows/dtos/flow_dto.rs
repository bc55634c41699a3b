use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::flows::models::{Flow, FlowStepWithOverride};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFlowDto {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFlowStepDto {
    pub prompt_id: Uuid,

    #[validate(length(min = 1, max = 200))]
    pub step_title: String,

    /// Position in the pipeline; appended after the last step when omitted
    pub order_index: Option<i32>,

    /// Replaces the linked prompt's content for this step only
    pub custom_content: Option<String>,

    /// Step-level variable defaults, applied before request-level variables
    pub variables: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFlowStepDto {
    #[validate(length(min = 1, max = 200))]
    pub step_title: Option<String>,

    pub order_index: Option<i32>,

    pub custom_content: Option<String>,

    pub variables: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FlowResponseDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Flow> for FlowResponseDto {
    fn from(f: Flow) -> Self {
        Self {
            id: f.id,
            user_id: f.user_id,
            name: f.name,
            created_at: f.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FlowStepResponseDto {
    pub id: Uuid,
    pub prompt_id: Uuid,
    pub order_index: i32,
    pub step_title: String,
    pub custom_content: Option<String>,
    pub variables: Option<serde_json::Value>,
}

impl From<FlowStepWithOverride> for FlowStepResponseDto {
    fn from(s: FlowStepWithOverride) -> Self {
        Self {
            id: s.id,
            prompt_id: s.prompt_id,
            order_index: s.order_index,
            step_title: s.step_title,
            custom_content: s.custom_content,
            variables: s.variables,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FlowDetailResponseDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub steps: Vec<FlowStepResponseDto>,
}
