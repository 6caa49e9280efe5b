//! Prediction request and response models

use serde::{Deserialize, Serialize};

use crate::models::weather::{WeatherReport, WeatherSummary};
use crate::types::{ConfidenceMethod, HeuristicConfidence, Location, VariableCategory};
use crate::validation::{validate_location, InputError};

/// Coordinates as sent by the dashboard. Both short and long keys are
/// accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LocationInput {
    #[serde(default, alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lng", alias = "lon")]
    pub longitude: Option<f64>,
}

/// Body of `POST /predict`.
///
/// Coordinates may be nested under `location` or given at the top level.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PredictionRequest {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<LocationInput>,
    #[serde(default, alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lng", alias = "lon")]
    pub longitude: Option<f64>,
}

impl PredictionRequest {
    pub fn new(date: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            date: Some(date.into()),
            location: location.map(|l| LocationInput {
                latitude: Some(l.latitude),
                longitude: Some(l.longitude),
            }),
            latitude: None,
            longitude: None,
        }
    }

    /// Validated coordinates, if any were given
    pub fn location(&self) -> Result<Option<Location>, InputError> {
        let nested = self.location.clone().unwrap_or_default();
        let latitude = nested.latitude.or(self.latitude);
        let longitude = nested.longitude.or(self.longitude);

        match (latitude, longitude) {
            (None, None) => Ok(None),
            (Some(latitude), Some(longitude)) => {
                let location = Location::new(latitude, longitude);
                validate_location(&location)?;
                Ok(Some(location))
            }
            _ => Err(InputError::new(
                "location",
                "both latitude and longitude must be provided",
            )),
        }
    }
}

/// One named model output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variable {
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub category: VariableCategory,
    pub confidence: HeuristicConfidence,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceEntry {
    pub variable: String,
    pub confidence: HeuristicConfidence,
}

/// The `n` most confident entries, highest first. Ties keep their order.
pub fn top_confidence(entries: &[ConfidenceEntry], n: usize) -> Vec<ConfidenceEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.confidence.value().total_cmp(&a.confidence.value()));
    sorted.truncate(n);
    sorted
}

/// Static description of one output, for clients building their own tables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariableDescriptor {
    pub name: String,
    pub unit: String,
    pub category: VariableCategory,
}

/// Response of `POST /predict`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionResponse {
    pub prediction_id: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub schema_version: String,
    pub summary: WeatherSummary,
    pub variables: Vec<Variable>,
    pub confidence: Vec<ConfidenceEntry>,
    pub top_confidence: Vec<ConfidenceEntry>,
    pub confidence_method: ConfidenceMethod,
}

/// Response of `POST /predict/conditions`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionsResponse {
    pub success: bool,
    pub data: WeatherReport,
}

/// Response of `GET /variables`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariablesResponse {
    pub schema_version: String,
    pub variables: Vec<VariableDescriptor>,
}
