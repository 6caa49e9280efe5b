//! Model adapter
//!
//! Wraps a trained multi-output regressor behind the [`Model`] trait. The
//! rest of the service only sees a feature vector going in and a raw,
//! positional output vector coming out; names and units are attached later
//! by the output interpreter.

mod artifact;
mod boosted;
mod deployment;
mod error;
mod forest;
mod scaler;
mod slot;
mod tree;

pub use artifact::{load_deployment, ModelArtifact, ModelSpec, ARTIFACT_FORMAT_VERSION};
pub use boosted::{BoostedSpec, BoostedTree, GradientBoosting};
pub use deployment::Deployment;
pub use error::ModelError;
pub use forest::{ForestSpec, ForestTree, RandomForest};
pub use scaler::{ScaledModel, StandardScaler};
pub use slot::{LoadOutcome, ModelSlot};
pub use tree::{Node, SplitRule, Tree};

/// Raw output of one inference call
#[derive(Debug, Clone, PartialEq)]
pub struct RawPrediction {
    /// One value per output, in schema order
    pub values: Vec<f64>,
    /// Per-output disagreement between ensemble members, when the backend
    /// can measure it
    pub spread: Option<Vec<f64>>,
}

/// A loaded regressor. Implementations are immutable after construction
/// and safe to call from many requests at once.
pub trait Model: Send + Sync + std::fmt::Debug {
    /// Short backend name for logs
    fn kind(&self) -> &'static str;

    fn expected_input_width(&self) -> usize;

    fn output_width(&self) -> usize;

    /// Run inference on one feature vector. Fails with
    /// [`ModelError::FeatureArityMismatch`] when the width is wrong.
    fn predict(&self, features: &[f64]) -> Result<RawPrediction, ModelError>;
}
