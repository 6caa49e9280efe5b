//! Error handling for the Weather Prediction Service
//!
//! Every failure leaves the service as `{ success: false, error, code, field? }`

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{InputError, SchemaError};
use thiserror::Error;

use crate::model::ModelError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Client errors
    #[error("Invalid input: {message}")]
    InvalidInput { field: String, message: String },

    // Readiness
    #[error("Model not loaded")]
    ModelNotLoaded,

    // Deployment inconsistencies
    #[error("Feature arity mismatch: model expects {expected} features, encoder produced {actual}")]
    FeatureArityMismatch { expected: usize, actual: usize },

    #[error("Missing summary field: {0}")]
    MissingSummaryField(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Inference errors
    #[error("Model error: {0}")]
    Model(ModelError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            AppError::ModelNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput { .. } => "INVALID_INPUT",
            AppError::ModelNotLoaded => "MODEL_NOT_LOADED",
            AppError::FeatureArityMismatch { .. } => "FEATURE_ARITY_MISMATCH",
            AppError::MissingSummaryField(_) => "MISSING_SUMMARY_FIELD",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Model(_) => "MODEL_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        AppError::InvalidInput {
            field: err.field.to_string(),
            message: err.message,
        }
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::FeatureArityMismatch { expected, actual } => {
                AppError::FeatureArityMismatch { expected, actual }
            }
            ModelError::Schema(SchemaError::MissingSummaryField(name)) => {
                AppError::MissingSummaryField(name)
            }
            // Raised while assembling a deployment
            ModelError::Io { .. }
            | ModelError::Parse(_)
            | ModelError::UnsupportedFormat(_)
            | ModelError::SchemaVersionMismatch { .. }
            | ModelError::Schema(_)
            | ModelError::Features(_)
            | ModelError::InvalidTree { .. }
            | ModelError::InvalidScaler { .. }
            | ModelError::LocationPolicy
            | ModelError::HorizonTooLong { .. } => AppError::Configuration(err.to_string()),
            ModelError::OutputArityMismatch { .. } => AppError::Model(err),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::invalid_input("body", rejection.body_text())
    }
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let field = match &self {
            AppError::InvalidInput { field, .. } => Some(field.clone()),
            _ => None,
        };

        if status.is_server_error() {
            tracing::error!(code = self.code(), "Error: {}", self);
        } else {
            tracing::warn!(code = self.code(), "Rejected: {}", self);
        }

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code: self.code().to_string(),
            field,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_keeps_field() {
        let err: AppError = InputError::new("latitude", "latitude must be between -90 and 90").into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "INVALID_INPUT");
        assert!(matches!(err, AppError::InvalidInput { ref field, .. } if field == "latitude"));
    }

    #[test]
    fn test_model_error_mapping() {
        let err: AppError = ModelError::FeatureArityMismatch {
            expected: 3,
            actual: 4,
        }
        .into();
        assert_eq!(err.code(), "FEATURE_ARITY_MISMATCH");

        let err: AppError =
            ModelError::Schema(SchemaError::MissingSummaryField("Albedo".into())).into();
        assert_eq!(err.code(), "MISSING_SUMMARY_FIELD");

        let err: AppError = ModelError::UnsupportedFormat(7).into();
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_loaded_is_unavailable() {
        assert_eq!(
            AppError::ModelNotLoaded.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
