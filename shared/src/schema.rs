//! Output schema of a trained model
//!
//! A model emits a bare vector of floats. The schema binds each position to a
//! named, unit-annotated variable and says which variables feed the weather
//! summary. It ships inside the model artifact together with a version tag
//! and a checksum over the binding, and is verified when the model is loaded.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::{VariableDescriptor, WeatherInputs};
use crate::types::VariableCategory;

/// Unit guess for a target without an explicit unit
pub fn infer_unit(name: &str) -> &'static str {
    let name = name.to_lowercase();
    if name.contains("temperature") {
        "K"
    } else if name.contains("moisture") {
        "%"
    } else if name.contains("speed") {
        "m/s"
    } else if name.contains("pressure") {
        "Pa"
    } else if name.contains("flux") || name.contains("radiation") {
        "W/m²"
    } else if name.contains("precipitation") || name.contains("rain") || name.contains("snow") {
        "mm/h"
    } else if name.contains("depth") {
        "m"
    } else if name.contains("rate") {
        "1/s"
    } else {
        ""
    }
}

/// One trained target variable
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl TargetSpec {
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: Some(unit.into()),
        }
    }

    /// Explicit unit, or one inferred from the name
    pub fn resolved_unit(&self) -> String {
        self.unit
            .clone()
            .unwrap_or_else(|| infer_unit(&self.name).to_string())
    }
}

/// Source of the wind speed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum WindBinding {
    Speed { speed: String },
    Components { u: String, v: String },
}

/// Target names feeding the weather summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryBindings {
    /// Air temperature in kelvin
    pub air_temperature: String,
    pub wind: WindBinding,
    /// Total (or rain) precipitation rate
    pub precipitation: String,
    /// Surface albedo in percent
    pub albedo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snowfall: Option<String>,
    /// Specific humidity in kg/kg
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_humidity: Option<String>,
    /// Surface pressure in pascal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_pressure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("output schema has no targets")]
    Empty,

    #[error("target '{0}' is listed more than once")]
    DuplicateTarget(String),

    #[error("schema checksum mismatch: artifact declares {declared}, binding hashes to {computed}")]
    ChecksumMismatch { declared: String, computed: String },

    #[error("summary field '{0}' is not produced by the model")]
    MissingSummaryField(String),
}

/// Versioned positional binding of model outputs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputSchema {
    pub version: String,
    pub checksum: String,
    pub targets: Vec<TargetSpec>,
    pub summary: SummaryBindings,
}

impl OutputSchema {
    /// Build a schema and stamp it with its own checksum
    pub fn new(version: impl Into<String>, targets: Vec<TargetSpec>, summary: SummaryBindings) -> Self {
        let version = version.into();
        let checksum = Self::compute_checksum(&version, &targets);
        Self {
            version,
            checksum,
            targets,
            summary,
        }
    }

    /// Lowercase hex SHA-256 of the version line followed by one
    /// `name<TAB>unit` line per target, in order
    pub fn compute_checksum(version: &str, targets: &[TargetSpec]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(version.as_bytes());
        hasher.update(b"\n");
        for target in targets {
            hasher.update(target.name.as_bytes());
            hasher.update(b"\t");
            hasher.update(target.resolved_unit().as_bytes());
            hasher.update(b"\n");
        }
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Position of a target in the output vector
    pub fn position(&self, name: &str) -> Option<usize> {
        self.targets.iter().position(|t| t.name == name)
    }

    /// Check names are unique, the checksum matches, and every summary
    /// binding resolves. Returns the resolved summary positions.
    pub fn verify(&self) -> Result<SummaryIndices, SchemaError> {
        if self.targets.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            if !seen.insert(target.name.as_str()) {
                return Err(SchemaError::DuplicateTarget(target.name.clone()));
            }
        }

        let computed = Self::compute_checksum(&self.version, &self.targets);
        if !computed.eq_ignore_ascii_case(self.checksum.trim()) {
            return Err(SchemaError::ChecksumMismatch {
                declared: self.checksum.clone(),
                computed,
            });
        }

        self.resolve_summary()
    }

    fn resolve_summary(&self) -> Result<SummaryIndices, SchemaError> {
        let require = |name: &str| {
            self.position(name)
                .ok_or_else(|| SchemaError::MissingSummaryField(name.to_string()))
        };
        let optional = |name: &Option<String>| name.as_deref().map(require).transpose();

        let bindings = &self.summary;
        let wind = match &bindings.wind {
            WindBinding::Speed { speed } => WindIndices::Speed(require(speed)?),
            WindBinding::Components { u, v } => WindIndices::Components {
                u: require(u)?,
                v: require(v)?,
            },
        };

        Ok(SummaryIndices {
            air_temperature: require(&bindings.air_temperature)?,
            wind,
            precipitation: require(&bindings.precipitation)?,
            albedo: require(&bindings.albedo)?,
            snowfall: optional(&bindings.snowfall)?,
            specific_humidity: optional(&bindings.specific_humidity)?,
            surface_pressure: optional(&bindings.surface_pressure)?,
        })
    }

    /// Name, unit and category of every output, in order
    pub fn descriptors(&self) -> Vec<VariableDescriptor> {
        self.targets
            .iter()
            .map(|target| VariableDescriptor {
                name: target.name.clone(),
                unit: target.resolved_unit(),
                category: VariableCategory::from_name(&target.name),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindIndices {
    Speed(usize),
    Components { u: usize, v: usize },
}

/// Output positions of the summary inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryIndices {
    pub air_temperature: usize,
    pub wind: WindIndices,
    pub precipitation: usize,
    pub albedo: usize,
    pub snowfall: Option<usize>,
    pub specific_humidity: Option<usize>,
    pub surface_pressure: Option<usize>,
}

impl SummaryIndices {
    /// Pick the summary inputs out of a full output vector. The vector must
    /// have the schema's length.
    pub fn inputs(&self, values: &[f64]) -> WeatherInputs {
        let wind_speed = match self.wind {
            WindIndices::Speed(i) => values[i],
            WindIndices::Components { u, v } => values[u].hypot(values[v]),
        };
        WeatherInputs {
            air_temperature_k: values[self.air_temperature],
            wind_speed,
            precipitation_rate: values[self.precipitation],
            albedo: values[self.albedo],
            snowfall_rate: self.snowfall.map(|i| values[i]),
            specific_humidity: self.specific_humidity.map(|i| values[i]),
            surface_pressure_pa: self.surface_pressure.map(|i| values[i]),
        }
    }
}
