//! JSON model artifact
//!
//! One file carries everything a deployment needs: the feature list, the
//! request policy, the output schema, optional scalers and the trees.

use std::path::Path;

use serde::Deserialize;
use shared::{DateWindow, Feature, FeatureEncoder, LocationPolicy, OutputSchema, RequestPolicy};

use super::boosted::{BoostedSpec, GradientBoosting};
use super::deployment::Deployment;
use super::forest::{ForestSpec, RandomForest};
use super::scaler::{ScaledModel, StandardScaler};
use super::{Model, ModelError};

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    RandomForest(ForestSpec),
    GradientBoosting(BoostedSpec),
}

impl ModelSpec {
    fn build(self) -> Result<Box<dyn Model>, ModelError> {
        Ok(match self {
            ModelSpec::RandomForest(spec) => Box::new(RandomForest::new(spec)?),
            ModelSpec::GradientBoosting(spec) => Box::new(GradientBoosting::new(spec)?),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub features: Vec<Feature>,
    #[serde(default)]
    pub location: LocationPolicy,
    pub date_window: DateWindow,
    pub schema: OutputSchema,
    #[serde(default)]
    pub input_scaler: Option<StandardScaler>,
    #[serde(default)]
    pub output_scaler: Option<StandardScaler>,
    pub model: ModelSpec,
}

impl ModelArtifact {
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let artifact: Self = serde_json::from_str(raw)?;
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelError::UnsupportedFormat(artifact.format_version));
        }
        Ok(artifact)
    }

    /// Build and validate the deployment. `expected_version`, when given,
    /// must equal the schema version.
    pub fn into_deployment(self, expected_version: Option<&str>) -> Result<Deployment, ModelError> {
        if let Some(expected) = expected_version {
            if expected != self.schema.version {
                return Err(ModelError::SchemaVersionMismatch {
                    expected: expected.to_string(),
                    actual: self.schema.version,
                });
            }
        }

        let encoder = FeatureEncoder::new(self.features)?;
        let backend = self.model.build()?;
        let model: Box<dyn Model> = if self.input_scaler.is_some() || self.output_scaler.is_some() {
            Box::new(ScaledModel::new(
                backend,
                self.input_scaler,
                self.output_scaler,
            )?)
        } else {
            backend
        };
        let policy = RequestPolicy {
            location: self.location,
            window: self.date_window,
        };

        Deployment::new(model, encoder, self.schema, policy)
    }
}

/// Read, parse and validate an artifact in one step
pub fn load_deployment(
    path: &Path,
    expected_version: Option<&str>,
) -> Result<Deployment, ModelError> {
    ModelArtifact::from_path(path)?.into_deployment(expected_version)
}
