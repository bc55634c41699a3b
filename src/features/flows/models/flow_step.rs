use sqlx::FromRow;
use uuid::Uuid;

/// One step of a flow. `order_index` ascending defines execution order.
#[derive(Debug, Clone, FromRow)]
pub struct FlowStep {
    pub id: Uuid,
    pub flow_id: Uuid,
    pub prompt_id: Uuid,
    pub order_index: i32,
    pub step_title: String,
}

/// A step joined with its optional override row, as returned to clients
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)]
pub struct FlowStepWithOverride {
    pub id: Uuid,
    pub flow_id: Uuid,
    pub prompt_id: Uuid,
    pub order_index: i32,
    pub step_title: String,
    pub custom_content: Option<String>,
    pub variables: Option<serde_json::Value>,
}

/// A step resolved for execution: the effective content is the override's
/// `custom_content` when present, otherwise the linked prompt's content.
#[derive(Debug, Clone, FromRow)]
pub struct ExecutableStep {
    pub id: Uuid,
    pub order_index: i32,
    pub step_title: String,
    pub content: String,
    pub variables: Option<serde_json::Value>,
}
