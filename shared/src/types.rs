//! Common types used across the service

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Validate)]
pub struct Location {
    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be between -90 and 90"))]
    pub latitude: f64,
    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "longitude must be between -180 and 180"
    ))]
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Human readable coordinates, e.g. `40.70°N, 74.00°W`
    pub fn coordinates_label(&self) -> String {
        let ns = if self.latitude >= 0.0 { 'N' } else { 'S' };
        let ew = if self.longitude >= 0.0 { 'E' } else { 'W' };
        format!(
            "{:.2}°{}, {:.2}°{}",
            self.latitude.abs(),
            ns,
            self.longitude.abs(),
            ew
        )
    }
}

/// Presentation category of a predicted variable, derived from its name
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VariableCategory {
    Temperature,
    Moisture,
    Radiation,
    Precipitation,
    Other,
}

impl VariableCategory {
    /// Keyword match on the variable name. Temperature wins over the others,
    /// so "Snow surface temperature" is a temperature.
    pub fn from_name(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains("temperature") {
            VariableCategory::Temperature
        } else if name.contains("moisture") || name.contains("humidity") {
            VariableCategory::Moisture
        } else if name.contains("radiation") || name.contains("flux") {
            VariableCategory::Radiation
        } else if name.contains("precipitation") || name.contains("rain") || name.contains("snow")
        {
            VariableCategory::Precipitation
        } else {
            VariableCategory::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VariableCategory::Temperature => "temperature",
            VariableCategory::Moisture => "moisture",
            VariableCategory::Radiation => "radiation",
            VariableCategory::Precipitation => "precipitation",
            VariableCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for VariableCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a deployment needs coordinates with each request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LocationPolicy {
    Required,
    #[default]
    Optional,
}

/// Longest forecast horizon a deployment may declare
pub const MAX_HORIZON_DAYS: u32 = 366;

/// Range of dates a deployment accepts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateWindow {
    /// Only dates inside the year the model was trained on
    TrainingYear { year: i32 },
    /// Today up to `days` days ahead, inclusive
    Horizon { days: u32 },
}

/// Request rules that come with a deployed model
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestPolicy {
    pub location: LocationPolicy,
    pub window: DateWindow,
}

/// A heuristic reliability score in [0, 1].
///
/// This is not a calibrated prediction interval. The regressors behind the
/// service only produce point estimates, so the score is derived from
/// out-of-band signals such as ensemble agreement or a per-variable prior.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(from = "f64", into = "f64")]
pub struct HeuristicConfidence(f64);

impl HeuristicConfidence {
    /// Clamps into [0, 1]; NaN becomes 0.
    pub fn new(score: f64) -> Self {
        if score.is_nan() {
            return Self(0.0);
        }
        Self(score.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for HeuristicConfidence {
    fn from(score: f64) -> Self {
        Self::new(score)
    }
}

impl From<HeuristicConfidence> for f64 {
    fn from(confidence: HeuristicConfidence) -> Self {
        confidence.0
    }
}

/// How the confidence scores of a response were produced
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceMethod {
    /// Fixed per-category prior adjusted by value magnitude
    CategoryPrior,
    /// Prior scaled by how closely the ensemble members agree
    EnsembleAgreement,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_name() {
        assert_eq!(
            VariableCategory::from_name("Air temperature"),
            VariableCategory::Temperature
        );
        assert_eq!(
            VariableCategory::from_name("Soil moisture 0-10 cm"),
            VariableCategory::Moisture
        );
        assert_eq!(
            VariableCategory::from_name("Specific humidity"),
            VariableCategory::Moisture
        );
        assert_eq!(
            VariableCategory::from_name("Net shortwave radiation flux"),
            VariableCategory::Radiation
        );
        assert_eq!(
            VariableCategory::from_name("Rain precipitation rate"),
            VariableCategory::Precipitation
        );
        assert_eq!(VariableCategory::from_name("Albedo"), VariableCategory::Other);
    }

    #[test]
    fn test_temperature_keyword_takes_priority() {
        assert_eq!(
            VariableCategory::from_name("Snow surface temperature"),
            VariableCategory::Temperature
        );
    }

    #[test]
    fn test_coordinates_label_hemispheres() {
        assert_eq!(Location::new(40.7, -74.0).coordinates_label(), "40.70°N, 74.00°W");
        assert_eq!(Location::new(-33.87, 151.21).coordinates_label(), "33.87°S, 151.21°E");
    }

    #[test]
    fn test_heuristic_confidence_is_clamped() {
        assert_eq!(HeuristicConfidence::new(1.7).value(), 1.0);
        assert_eq!(HeuristicConfidence::new(-0.2).value(), 0.0);
        assert_eq!(HeuristicConfidence::new(f64::NAN).value(), 0.0);
        assert_eq!(HeuristicConfidence::new(0.42).value(), 0.42);
    }

    #[test]
    fn test_heuristic_confidence_deserialize_is_clamped() {
        let score: HeuristicConfidence = serde_json::from_str("7.5").unwrap();
        assert_eq!(score.value(), 1.0);

        let score: HeuristicConfidence = serde_json::from_str("-3").unwrap();
        assert_eq!(score.value(), 0.0);

        // JSON has no NaN literal; non-finite values arrive through From<f64>
        assert_eq!(HeuristicConfidence::from(f64::NAN).value(), 0.0);

        assert_eq!(serde_json::to_string(&HeuristicConfidence::new(0.5)).unwrap(), "0.5");
    }

    #[test]
    fn test_date_window_serde() {
        let window: DateWindow =
            serde_json::from_str(r#"{"kind":"horizon","days":7}"#).unwrap();
        assert_eq!(window, DateWindow::Horizon { days: 7 });

        let window: DateWindow =
            serde_json::from_str(r#"{"kind":"training_year","year":2023}"#).unwrap();
        assert_eq!(window, DateWindow::TrainingYear { year: 2023 });
    }
}
