//! Fixtures shared by the integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use shared::{
    DateWindow, Feature, FeatureEncoder, LocationPolicy, OutputSchema, RequestPolicy,
    SummaryBindings, TargetSpec, WindBinding,
};
use tower::ServiceExt;
use weather_prediction_backend::{
    create_app,
    model::{Deployment, Model, ModelError, RawPrediction},
    AppState, Config,
};

pub const SCHEMA_VERSION: &str = "fixture-1";

/// Sample artifact shipped with the repository
pub fn sample_artifact_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../models/environment_2023.json")
}

pub fn targets() -> Vec<TargetSpec> {
    vec![
        TargetSpec::new("Air temperature", "K"),
        TargetSpec::new("Wind speed", "m/s"),
        TargetSpec::new("Total precipitation rate", "kg/m²/s"),
        TargetSpec::new("Albedo", "%"),
        TargetSpec {
            name: "Soil moisture 0-10 cm".to_string(),
            unit: None,
        },
    ]
}

pub fn bindings() -> SummaryBindings {
    SummaryBindings {
        air_temperature: "Air temperature".to_string(),
        wind: WindBinding::Speed {
            speed: "Wind speed".to_string(),
        },
        precipitation: "Total precipitation rate".to_string(),
        albedo: "Albedo".to_string(),
        snowfall: None,
        specific_humidity: None,
        surface_pressure: None,
    }
}

pub fn schema() -> OutputSchema {
    OutputSchema::new(SCHEMA_VERSION, targets(), bindings())
}

/// One output vector matching [`targets`]: 20 °C, light wind, dry, bright
pub fn fixture_outputs() -> Vec<f64> {
    vec![293.15, 3.0, 0.0, 20.0, 25.0]
}

/// Model returning fixed outputs and counting its calls
#[derive(Debug, Clone)]
pub struct CountingModel {
    pub width: usize,
    pub outputs: Vec<f64>,
    pub calls: Arc<AtomicUsize>,
}

impl CountingModel {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            outputs: fixture_outputs(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Model for CountingModel {
    fn kind(&self) -> &'static str {
        "counting"
    }

    fn expected_input_width(&self) -> usize {
        self.width
    }

    fn output_width(&self) -> usize {
        self.outputs.len()
    }

    fn predict(&self, features: &[f64]) -> Result<RawPrediction, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if features.len() != self.width {
            return Err(ModelError::FeatureArityMismatch {
                expected: self.width,
                actual: features.len(),
            });
        }
        Ok(RawPrediction {
            values: self.outputs.clone(),
            spread: None,
        })
    }
}

pub fn training_year_policy() -> RequestPolicy {
    RequestPolicy {
        location: LocationPolicy::Optional,
        window: DateWindow::TrainingYear { year: 2023 },
    }
}

pub fn horizon_policy() -> RequestPolicy {
    RequestPolicy {
        location: LocationPolicy::Required,
        window: DateWindow::Horizon { days: 7 },
    }
}

/// Date-only deployment trained on 2023
pub fn date_only_deployment(model: CountingModel) -> Deployment {
    let encoder =
        FeatureEncoder::new(vec![Feature::Year, Feature::SinDay, Feature::CosDay]).unwrap();
    Deployment::new(Box::new(model), encoder, schema(), training_year_policy()).unwrap()
}

/// Location deployment with a seven-day horizon
pub fn horizon_deployment(model: CountingModel) -> Deployment {
    let encoder = FeatureEncoder::new(vec![
        Feature::Year,
        Feature::Month,
        Feature::Day,
        Feature::SinDayOfYear,
        Feature::CosDayOfYear,
        Feature::Latitude,
        Feature::Longitude,
    ])
    .unwrap();
    Deployment::new(Box::new(model), encoder, schema(), horizon_policy()).unwrap()
}

/// App with an empty model slot
pub fn empty_app() -> (Router, AppState) {
    let state = AppState::new(Config::default());
    (create_app(state.clone()), state)
}

pub fn app_with(deployment: Deployment) -> (Router, AppState) {
    let (app, state) = empty_app();
    state.model.install(deployment);
    (app, state)
}

/// Minimal artifact document around the fixture schema
pub fn artifact_json() -> Value {
    let targets = targets();
    json!({
        "format_version": 1,
        "features": ["year", "sin_day", "cos_day"],
        "date_window": {"kind": "training_year", "year": 2023},
        "schema": {
            "version": SCHEMA_VERSION,
            "checksum": OutputSchema::compute_checksum(SCHEMA_VERSION, &targets),
            "targets": targets,
            "summary": {
                "air_temperature": "Air temperature",
                "wind": {"speed": "Wind speed"},
                "precipitation": "Total precipitation rate",
                "albedo": "Albedo"
            }
        },
        "model": {
            "kind": "random_forest",
            "n_features": 3,
            "n_outputs": 5,
            "trees": [
                {"nodes": [
                    {"type": "split", "feature": 2, "threshold": 0.0, "left": 1, "right": 2},
                    {"type": "leaf", "value": [300.0, 2.0, 0.00002, 15.0, 20.0]},
                    {"type": "leaf", "value": [275.0, 5.0, 0.00005, 30.0, 30.0]}
                ]},
                {"nodes": [
                    {"type": "leaf", "value": [285.0, 4.0, 0.00003, 22.0, 24.0]}
                ]}
            ]
        }
    })
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read(response).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: String) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    read(response).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}
