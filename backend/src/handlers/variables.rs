//! Variable listing handler

use axum::{extract::State, Json};
use shared::VariablesResponse;

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Names, units and categories of every model output, in output order
pub async fn list_variables(State(state): State<AppState>) -> AppResult<Json<VariablesResponse>> {
    let deployment = state.model.get().ok_or(AppError::ModelNotLoaded)?;
    let interpreter = deployment.interpreter();

    Ok(Json(VariablesResponse {
        schema_version: deployment.schema_version().to_string(),
        variables: interpreter.descriptors().to_vec(),
    }))
}
