//! Weather Prediction Service - backend library
//!
//! Serves a pre-trained multi-output regression model over HTTP. A request
//! carries a date and optional coordinates; the response carries every
//! model output as a named, unit-annotated variable with a heuristic
//! confidence score, plus a human-readable weather summary.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;

pub use config::Config;

use model::ModelSlot;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub model: Arc<ModelSlot>,
}

impl AppState {
    /// State with an empty model slot
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            model: Arc::new(ModelSlot::new()),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // The dashboard is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .merge(routes::api_routes())
        .nest("/api", routes::api_routes())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Weather Prediction Service API"
}
