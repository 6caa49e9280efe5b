//! WebAssembly module for the Weather Prediction dashboard
//!
//! Provides client-side helpers for:
//! - Request pre-validation before posting to `/predict`
//! - Variable categories and descriptive labels
//! - Ranking confidence entries
//!
//! Nothing here produces predictions; that stays on the server.

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Check a request date. Returns the error message, or nothing when valid.
#[wasm_bindgen]
pub fn validate_request_date(date: &str) -> Option<String> {
    parse_request_date(Some(date)).err().map(|e| e.to_string())
}

/// Check a coordinate pair. Returns the error message, or nothing when valid.
#[wasm_bindgen]
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Option<String> {
    validate_location(&Location::new(latitude, longitude))
        .err()
        .map(|e| e.to_string())
}

/// Presentation category of a variable name
#[wasm_bindgen]
pub fn variable_category(name: &str) -> String {
    VariableCategory::from_name(name).to_string()
}

/// Beaufort-style label for a wind speed in m/s
#[wasm_bindgen]
pub fn describe_wind(speed: f64) -> String {
    wind_description(speed).to_string()
}

/// Label for a relative humidity in percent
#[wasm_bindgen]
pub fn describe_humidity(relative_humidity: f64) -> String {
    humidity_description(relative_humidity).to_string()
}

/// Comfort label for a temperature in °C and relative humidity in percent
#[wasm_bindgen]
pub fn comfort_level(temperature_c: f64, relative_humidity: f64) -> String {
    shared::models::comfort_level(temperature_c, relative_humidity).to_string()
}

#[wasm_bindgen]
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    shared::models::kelvin_to_celsius(kelvin)
}

/// Rank a JSON array of `{variable, confidence}` entries and keep the first `n`
#[wasm_bindgen]
pub fn top_confidence(entries_json: &str, n: usize) -> Result<String, JsValue> {
    let entries: Vec<ConfidenceEntry> = serde_json::from_str(entries_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid confidence JSON: {}", e)))?;

    serde_json::to_string(&shared::models::top_confidence(&entries, n))
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_request_date() {
        assert_eq!(validate_request_date("2023-02-15"), None);
        assert_eq!(validate_request_date("2023-02-15T06:30"), None);
        let message = validate_request_date("2023-13-01").unwrap();
        assert!(message.starts_with("date:"));
    }

    #[test]
    fn test_validate_coordinates() {
        assert_eq!(validate_coordinates(40.7, -74.0), None);
        assert!(validate_coordinates(95.0, 0.0)
            .unwrap()
            .contains("latitude must be between -90 and 90"));
        assert!(validate_coordinates(0.0, 181.0).unwrap().starts_with("longitude"));
    }

    #[test]
    fn test_labels() {
        assert_eq!(variable_category("Rain precipitation rate"), "precipitation");
        assert_eq!(describe_wind(0.2), "Calm");
        assert_eq!(describe_wind(20.0), "High winds");
        assert_eq!(describe_humidity(55.0), "Comfortable");
        assert_eq!(comfort_level(22.0, 50.0), "Pleasant");
        assert!((kelvin_to_celsius(273.15)).abs() < 1e-9);
    }

    #[test]
    fn test_top_confidence_entries() {
        let json = r#"[
            {"variable": "a", "confidence": 0.6},
            {"variable": "b", "confidence": 0.9},
            {"variable": "c", "confidence": 0.7}
        ]"#;
        let top: Vec<ConfidenceEntry> =
            serde_json::from_str(&top_confidence(json, 2).unwrap()).unwrap();
        let names: Vec<_> = top.iter().map(|e| e.variable.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_top_confidence_clamps_scores() {
        let json = r#"[{"variable": "a", "confidence": 7.5}, {"variable": "b", "confidence": -1}]"#;
        let top: Vec<ConfidenceEntry> =
            serde_json::from_str(&top_confidence(json, 5).unwrap()).unwrap();
        assert_eq!(top[0].confidence.value(), 1.0);
        assert_eq!(top[1].confidence.value(), 0.0);
    }
}
