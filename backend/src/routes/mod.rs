//! Route definitions for the Weather Prediction Service

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Service routes. Mounted both at the root and under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/variables", get(handlers::list_variables))
        .route("/predict", post(handlers::predict))
        .route("/predict/conditions", post(handlers::predict_conditions))
}
