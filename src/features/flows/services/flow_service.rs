use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::flows::dtos::{CreateFlowStepDto, UpdateFlowStepDto};
use crate::features::flows::models::{ExecutableStep, Flow, FlowStep, FlowStepWithOverride};

const FLOW_COLUMNS: &str = "id, user_id, name, created_at";

const STEP_WITH_OVERRIDE_QUERY: &str = r#"
    SELECT s.id, s.flow_id, s.prompt_id, s.order_index, s.step_title,
           o.custom_content, o.variables
    FROM flow_steps s
    LEFT JOIN flow_step_overrides o ON o.flow_step_id = s.id
    WHERE s.flow_id = $1
    ORDER BY s.order_index ASC
"#;

pub struct FlowService {
    pool: PgPool,
}

impl FlowService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a flow row without ownership checks (used by the executor,
    /// which enforces owner-only access itself)
    pub async fn find(&self, id: Uuid) -> Result<Option<Flow>> {
        let flow = sqlx::query_as::<_, Flow>(&format!(
            "SELECT {FLOW_COLUMNS} FROM flows WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(flow)
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Flow> {
        let flow = self
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Flow with id {} not found", id)))?;

        if flow.user_id != user_id {
            return Err(AppError::Forbidden(
                "You do not have access to this flow".to_string(),
            ));
        }

        Ok(flow)
    }

    pub async fn create(&self, user_id: Uuid, name: &str) -> Result<Flow> {
        let flow = sqlx::query_as::<_, Flow>(&format!(
            "INSERT INTO flows (user_id, name) VALUES ($1, $2) RETURNING {FLOW_COLUMNS}"
        ))
        .bind(user_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(flow)
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Flow>> {
        let flows = sqlx::query_as::<_, Flow>(&format!(
            "SELECT {FLOW_COLUMNS} FROM flows WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(flows)
    }

    pub async fn get_with_steps(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<(Flow, Vec<FlowStepWithOverride>)> {
        let flow = self.find_owned(id, user_id).await?;

        let steps = sqlx::query_as::<_, FlowStepWithOverride>(STEP_WITH_OVERRIDE_QUERY)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok((flow, steps))
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        self.find_owned(id, user_id).await?;

        sqlx::query("DELETE FROM flows WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(())
    }

    /// Append or insert a step. Without an explicit `order_index` the step
    /// lands after the current last one.
    pub async fn add_step(
        &self,
        flow_id: Uuid,
        user_id: Uuid,
        dto: CreateFlowStepDto,
    ) -> Result<FlowStepWithOverride> {
        self.find_owned(flow_id, user_id).await?;

        // The linked prompt must exist and be usable by the flow owner
        let prompt_visible: Option<bool> = sqlx::query_scalar(
            "SELECT access = 'public' OR user_id = $2 FROM prompts WHERE id = $1",
        )
        .bind(dto.prompt_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        match prompt_visible {
            None => {
                return Err(AppError::BadRequest(format!(
                    "Prompt with id {} does not exist",
                    dto.prompt_id
                )))
            }
            Some(false) => {
                return Err(AppError::Forbidden(
                    "Cannot reference a private prompt you do not own".to_string(),
                ))
            }
            Some(true) => {}
        }

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let order_index = match dto.order_index {
            Some(index) => index,
            None => {
                let max: Option<i32> = sqlx::query_scalar(
                    "SELECT MAX(order_index) FROM flow_steps WHERE flow_id = $1",
                )
                .bind(flow_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::Database)?;
                max.map_or(0, |m| m + 1)
            }
        };

        let step = sqlx::query_as::<_, FlowStep>(
            r#"
            INSERT INTO flow_steps (flow_id, prompt_id, order_index, step_title)
            VALUES ($1, $2, $3, $4)
            RETURNING id, flow_id, prompt_id, order_index, step_title
            "#,
        )
        .bind(flow_id)
        .bind(dto.prompt_id)
        .bind(order_index)
        .bind(&dto.step_title)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        if dto.custom_content.is_some() || dto.variables.is_some() {
            sqlx::query(
                r#"
                INSERT INTO flow_step_overrides (flow_step_id, custom_content, variables)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(step.id)
            .bind(&dto.custom_content)
            .bind(&dto.variables)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;

        Ok(FlowStepWithOverride {
            id: step.id,
            flow_id: step.flow_id,
            prompt_id: step.prompt_id,
            order_index: step.order_index,
            step_title: step.step_title,
            custom_content: dto.custom_content,
            variables: dto.variables,
        })
    }

    pub async fn update_step(
        &self,
        flow_id: Uuid,
        step_id: Uuid,
        user_id: Uuid,
        dto: UpdateFlowStepDto,
    ) -> Result<FlowStepWithOverride> {
        self.find_owned(flow_id, user_id).await?;

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let step = sqlx::query_as::<_, FlowStep>(
            r#"
            UPDATE flow_steps
            SET step_title = COALESCE($1, step_title),
                order_index = COALESCE($2, order_index)
            WHERE id = $3 AND flow_id = $4
            RETURNING id, flow_id, prompt_id, order_index, step_title
            "#,
        )
        .bind(&dto.step_title)
        .bind(dto.order_index)
        .bind(step_id)
        .bind(flow_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound(format!("Flow step with id {} not found", step_id)))?;

        if dto.custom_content.is_some() || dto.variables.is_some() {
            sqlx::query(
                r#"
                INSERT INTO flow_step_overrides (flow_step_id, custom_content, variables)
                VALUES ($1, $2, $3)
                ON CONFLICT (flow_step_id) DO UPDATE
                SET custom_content = COALESCE(EXCLUDED.custom_content, flow_step_overrides.custom_content),
                    variables = COALESCE(EXCLUDED.variables, flow_step_overrides.variables)
                "#,
            )
            .bind(step_id)
            .bind(&dto.custom_content)
            .bind(&dto.variables)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        }

        let updated = sqlx::query_as::<_, FlowStepWithOverride>(
            r#"
            SELECT s.id, s.flow_id, s.prompt_id, s.order_index, s.step_title,
                   o.custom_content, o.variables
            FROM flow_steps s
            LEFT JOIN flow_step_overrides o ON o.flow_step_id = s.id
            WHERE s.id = $1
            "#,
        )
        .bind(step.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;

        Ok(updated)
    }

    pub async fn delete_step(&self, flow_id: Uuid, step_id: Uuid, user_id: Uuid) -> Result<()> {
        self.find_owned(flow_id, user_id).await?;

        let result = sqlx::query("DELETE FROM flow_steps WHERE id = $1 AND flow_id = $2")
            .bind(step_id)
            .bind(flow_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Flow step with id {} not found",
                step_id
            )));
        }

        Ok(())
    }

    /// Resolve the flow's steps for execution, in `order_index` order. The
    /// effective content is the override's `custom_content` when present,
    /// otherwise the linked prompt's content.
    pub async fn steps_for_execution(&self, flow_id: Uuid) -> Result<Vec<ExecutableStep>> {
        let steps = sqlx::query_as::<_, ExecutableStep>(
            r#"
            SELECT s.id, s.order_index, s.step_title,
                   COALESCE(o.custom_content, p.content) AS content,
                   o.variables
            FROM flow_steps s
            JOIN prompts p ON p.id = s.prompt_id
            LEFT JOIN flow_step_overrides o ON o.flow_step_id = s.id
            WHERE s.flow_id = $1
            ORDER BY s.order_index ASC
            "#,
        )
        .bind(flow_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(steps)
    }
}
