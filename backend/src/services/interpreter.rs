//! Output interpreter
//!
//! Binds a raw output vector to named variables, derives the weather
//! summary and scores each variable with a heuristic confidence.

use shared::{
    top_confidence, ConfidenceEntry, ConfidenceMethod, DerivedWeather, HeuristicConfidence,
    OutputSchema, SchemaError, SummaryIndices, Variable, VariableDescriptor, WeatherSummary,
};

use crate::model::{ModelError, RawPrediction};

/// Entries kept in `top_confidence`
pub const TOP_CONFIDENCE_COUNT: usize = 5;

const MIN_CONFIDENCE: f64 = 0.5;
const MAX_CONFIDENCE: f64 = 0.95;

/// Everything derived from one raw prediction
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub weather: DerivedWeather,
    pub summary: WeatherSummary,
    pub variables: Vec<Variable>,
    pub confidence: Vec<ConfidenceEntry>,
    pub top_confidence: Vec<ConfidenceEntry>,
    pub method: ConfidenceMethod,
}

#[derive(Debug, Clone)]
pub struct OutputInterpreter {
    schema: OutputSchema,
    indices: SummaryIndices,
    descriptors: Vec<VariableDescriptor>,
}

impl OutputInterpreter {
    /// Verifies the schema once so that `interpret` cannot fail on a
    /// correctly sized vector
    pub fn new(schema: OutputSchema) -> Result<Self, SchemaError> {
        let indices = schema.verify()?;
        let descriptors = schema.descriptors();
        Ok(Self {
            schema,
            indices,
            descriptors,
        })
    }

    pub fn schema(&self) -> &OutputSchema {
        &self.schema
    }

    pub fn width(&self) -> usize {
        self.schema.len()
    }

    pub fn descriptors(&self) -> &[VariableDescriptor] {
        &self.descriptors
    }

    pub fn interpret(&self, raw: &RawPrediction) -> Result<Interpretation, ModelError> {
        let width = self.width();
        let mismatch = |model: usize| ModelError::OutputArityMismatch {
            model,
            schema: width,
        };
        if raw.values.len() != width {
            return Err(mismatch(raw.values.len()));
        }
        let spread = match &raw.spread {
            Some(spread) if spread.len() != width => return Err(mismatch(spread.len())),
            spread => spread.as_deref(),
        };

        let method = if spread.is_some() {
            ConfidenceMethod::EnsembleAgreement
        } else {
            ConfidenceMethod::CategoryPrior
        };

        let variables: Vec<Variable> = self
            .descriptors
            .iter()
            .zip(&raw.values)
            .enumerate()
            .map(|(i, (descriptor, &value))| Variable {
                name: descriptor.name.clone(),
                value,
                unit: descriptor.unit.clone(),
                category: descriptor.category,
                confidence: heuristic_confidence(
                    &descriptor.name,
                    value,
                    spread.map(|s| s[i]),
                ),
            })
            .collect();

        let confidence: Vec<ConfidenceEntry> = variables
            .iter()
            .map(|v| ConfidenceEntry {
                variable: v.name.clone(),
                confidence: v.confidence,
            })
            .collect();
        let top = top_confidence(&confidence, TOP_CONFIDENCE_COUNT);

        let weather = DerivedWeather::derive(&self.indices.inputs(&raw.values));

        Ok(Interpretation {
            summary: weather.summary(),
            weather,
            variables,
            confidence,
            top_confidence: top,
            method,
        })
    }
}

fn category_prior(name: &str) -> f64 {
    let name = name.to_lowercase();
    if name.contains("temperature") {
        0.85
    } else if name.contains("moisture") {
        0.80
    } else if name.contains("wind") {
        0.75
    } else if name.contains("precipitation") {
        0.70
    } else {
        0.80
    }
}

/// Heuristic score in [0.5, 0.95]. Not a calibrated interval.
///
/// Starts from a per-category prior, is damped for extreme magnitudes and,
/// when the backend reports ensemble spread, scaled by how closely the
/// ensemble members agree relative to the value itself.
pub fn heuristic_confidence(name: &str, value: f64, spread: Option<f64>) -> HeuristicConfidence {
    let mut score = category_prior(name);

    let magnitude = value.abs();
    if magnitude > 1000.0 {
        score *= 0.9;
    } else if magnitude < 0.001 {
        score *= 0.8;
    }

    if let Some(spread) = spread.filter(|s| s.is_finite()) {
        let agreement = 1.0 / (1.0 + spread.abs() / magnitude.max(0.001));
        score *= 0.5 + 0.5 * agreement;
    }

    if score.is_nan() {
        score = MIN_CONFIDENCE;
    }
    HeuristicConfidence::new(score.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_priors() {
        assert_eq!(heuristic_confidence("Air temperature", 280.0, None).value(), 0.85);
        assert_eq!(heuristic_confidence("Wind speed", 3.0, None).value(), 0.75);
        assert_eq!(heuristic_confidence("Albedo", 20.0, None).value(), 0.80);
        assert_eq!(
            heuristic_confidence("Soil moisture 0-10 cm", 25.0, None).value(),
            0.80
        );
    }

    #[test]
    fn test_magnitude_damping() {
        let large = heuristic_confidence("Surface pressure", 101_325.0, None).value();
        assert!((large - 0.72).abs() < 1e-12);

        let tiny = heuristic_confidence("Total precipitation rate", 0.0, None).value();
        assert!((tiny - 0.56).abs() < 1e-12);
    }

    #[test]
    fn test_spread_lowers_confidence() {
        let agreed = heuristic_confidence("Air temperature", 280.0, Some(0.0)).value();
        let spread = heuristic_confidence("Air temperature", 280.0, Some(28.0)).value();
        assert_eq!(agreed, 0.85);
        assert!(spread < agreed);
        assert!(spread >= 0.5);
    }

    #[test]
    fn test_non_finite_inputs_stay_in_range() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let score = heuristic_confidence("Air temperature", value, Some(1.0)).value();
            assert!((0.5..=0.95).contains(&score));
        }
    }
}
