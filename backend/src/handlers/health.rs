//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` once the model is loaded, `degraded` otherwise
    pub status: String,
    pub model_loaded: bool,
    pub target_variables: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Why the model is missing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub version: String,
}

/// Health check endpoint handler. Always answers 200, even without a model.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let deployment = state.model.get();

    let (status, detail) = match (&deployment, state.model.failure()) {
        (Some(_), _) => ("healthy", None),
        (None, Some(failure)) => ("degraded", Some(failure.to_string())),
        (None, None) => ("degraded", Some("model is loading".to_string())),
    };

    Json(HealthResponse {
        status: status.to_string(),
        model_loaded: deployment.is_some(),
        target_variables: deployment
            .as_ref()
            .map_or(0, |d| d.interpreter().width()),
        schema_version: deployment.as_ref().map(|d| d.schema_version().to_string()),
        detail,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
