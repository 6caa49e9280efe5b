//! HTTP handlers for prediction endpoints

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use shared::{ConditionsResponse, PredictionRequest, PredictionResponse};

use crate::error::{AppError, AppResult};
use crate::services::{Prediction, PredictionService};
use crate::AppState;

/// Tree inference is CPU-bound, so it runs off the async workers
async fn run_prediction(
    state: AppState,
    body: Result<Json<PredictionRequest>, JsonRejection>,
) -> AppResult<Prediction> {
    let Json(request) = body?;
    let service = PredictionService::new(state.model);
    tokio::task::spawn_blocking(move || service.predict(&request))
        .await
        .map_err(|e| AppError::Internal(format!("prediction task failed: {e}")))?
}

/// Predict every model output for a date and optional location
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<PredictionRequest>, JsonRejection>,
) -> AppResult<Json<PredictionResponse>> {
    let prediction = run_prediction(state, body).await?;
    Ok(Json(prediction.into_response()))
}

/// Detailed conditions report for a date and optional location
pub async fn predict_conditions(
    State(state): State<AppState>,
    body: Result<Json<PredictionRequest>, JsonRejection>,
) -> AppResult<Json<ConditionsResponse>> {
    let prediction = run_prediction(state, body).await?;
    Ok(Json(prediction.into_report()))
}
