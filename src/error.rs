use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Model artifact error: {0}")]
    Artifact(String),

    #[error("Please complete these fields: {}", .0.join(", "))]
    IncompleteInput(Vec<String>),

    #[error("Invalid value for field '{field}': {reason}")]
    Encoding { field: String, reason: String },

    // Cause is logged where the classifier call fails; clients only ever
    // see this generic message.
    #[error("Prediction failed")]
    Prediction,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::IncompleteInput(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::Encoding { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Prediction => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            _ => {
                tracing::error!("Internal server error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let mut body = json!({
            "error": error_message,
            "status": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        if let AppError::IncompleteInput(missing) = &self {
            body["missing"] = json!(missing);
        }

        (status, Json(body)).into_response()
    }
}

// Helper for artifact load/parse failures, keeps the offending path in the
// message shown to the operator.
pub fn artifact_error(path: &str, err: impl std::fmt::Display) -> AppError {
    AppError::Artifact(format!("{path}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_input_lists_labels() {
        let err = AppError::IncompleteInput(vec![
            "Red Blood Cells*".to_string(),
            "Hypertension*".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Please complete these fields: Red Blood Cells*, Hypertension*"
        );
    }

    #[test]
    fn test_prediction_failure_is_opaque() {
        assert_eq!(AppError::Prediction.to_string(), "Prediction failed");
    }
}
