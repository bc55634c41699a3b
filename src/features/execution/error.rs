use axum::http::StatusCode;
use thiserror::Error;

use crate::core::error::AppError;
use crate::features::execution::dtos::RunErrorResponse;

/// Error taxonomy of the execution endpoints. Each variant maps to exactly
/// one HTTP status and is returned to the caller as
/// `{"success": false, "error": <message>}`; nothing beyond the message is
/// exposed.
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    /// Missing or unrecognized bearer API key
    #[error("{0}")]
    Auth(String),

    /// Malformed body, missing required field, or unresolved placeholders
    #[error("{message}")]
    Validation {
        message: String,
        missing_variables: Option<Vec<String>>,
    },

    /// Prompt, flow, or flow steps absent
    #[error("{0}")]
    NotFound(String),

    /// Private-access or cross-user denial
    #[error("{0}")]
    Forbidden(String),

    /// Password gate: password missing or hash mismatch
    #[error("{0}")]
    Password(String),

    /// Downstream AI vendor failure
    #[error("{0}")]
    Provider(String),

    /// Anything uncaught
    #[error("{0}")]
    Unexpected(String),
}

impl ExecutionError {
    pub fn validation(message: impl Into<String>) -> Self {
        ExecutionError::Validation {
            message: message.into(),
            missing_variables: None,
        }
    }

    pub fn missing_variables(missing: Vec<String>) -> Self {
        ExecutionError::Validation {
            message: format!("Missing required variables: {}", missing.join(", ")),
            missing_variables: Some(missing),
        }
    }

    /// Step-qualified variant used by the flow executor
    pub fn missing_variables_in_step(step_title: &str, missing: Vec<String>) -> Self {
        ExecutionError::Validation {
            message: format!(
                "Missing variables in step \"{}\": {}",
                step_title,
                missing.join(", ")
            ),
            missing_variables: Some(missing),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ExecutionError::Auth(_) | ExecutionError::Password(_) => StatusCode::UNAUTHORIZED,
            ExecutionError::Validation { .. } => StatusCode::BAD_REQUEST,
            ExecutionError::NotFound(_) => StatusCode::NOT_FOUND,
            ExecutionError::Forbidden(_) => StatusCode::FORBIDDEN,
            ExecutionError::Provider(_) | ExecutionError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn to_body(&self) -> RunErrorResponse {
        let missing_variables = match self {
            ExecutionError::Validation {
                missing_variables, ..
            } => missing_variables.clone(),
            _ => None,
        };

        RunErrorResponse {
            success: false,
            error: self.to_string(),
            missing_variables,
        }
    }
}

impl From<AppError> for ExecutionError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::NotFound(msg) => ExecutionError::NotFound(msg),
            AppError::Forbidden(msg) => ExecutionError::Forbidden(msg),
            other => {
                tracing::error!("Unexpected error during execution: {:?}", other);
                ExecutionError::Unexpected("Internal server error".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_variant_maps_to_one_status() {
        assert_eq!(
            ExecutionError::Auth("Invalid API key".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ExecutionError::Password("Invalid password".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ExecutionError::validation("bad body").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ExecutionError::NotFound("Prompt not found".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ExecutionError::Forbidden("private".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ExecutionError::Provider("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ExecutionError::Unexpected("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_variables_body_shape() {
        let err = ExecutionError::missing_variables(vec!["status".to_string()]);
        let body = err.to_body();
        assert!(!body.success);
        assert_eq!(body.error, "Missing required variables: status");
        assert_eq!(body.missing_variables, Some(vec!["status".to_string()]));

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["missingVariables"][0], "status");
    }

    #[test]
    fn test_step_qualified_message() {
        let err = ExecutionError::missing_variables_in_step(
            "Summarize",
            vec!["topic".to_string(), "tone".to_string()],
        );
        assert_eq!(
            err.to_string(),
            "Missing variables in step \"Summarize\": topic, tone"
        );
    }

    #[test]
    fn test_plain_errors_omit_missing_variables_key() {
        let body = ExecutionError::Auth("Invalid API key".into()).to_body();
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("missingVariables"));
    }

    #[test]
    fn test_app_error_conversion_masks_internals() {
        let err: ExecutionError = AppError::Internal("pool exhausted".to_string()).into();
        assert_eq!(err.to_string(), "Internal server error");

        let err: ExecutionError = AppError::NotFound("Prompt not found".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
