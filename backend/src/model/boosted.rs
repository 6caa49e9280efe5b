//! Gradient-boosted trees, one additive ensemble per output

use serde::Deserialize;

use super::tree::{SplitRule, Tree};
use super::{Model, ModelError, RawPrediction};

#[derive(Debug, Clone, Deserialize)]
pub struct BoostedTree {
    /// Output this tree contributes to
    pub target: usize,
    pub nodes: Tree<f64>,
}

/// `model` section of a `gradient_boosting` artifact
#[derive(Debug, Clone, Deserialize)]
pub struct BoostedSpec {
    pub n_features: usize,
    pub n_outputs: usize,
    pub base_score: Vec<f64>,
    pub trees: Vec<BoostedTree>,
}

#[derive(Debug)]
pub struct GradientBoosting {
    n_features: usize,
    base_score: Vec<f64>,
    trees: Vec<BoostedTree>,
}

impl GradientBoosting {
    pub fn new(spec: BoostedSpec) -> Result<Self, ModelError> {
        if spec.n_features == 0 || spec.n_outputs == 0 {
            return Err(ModelError::InvalidTree {
                tree: 0,
                reason: "n_features and n_outputs must be positive".to_string(),
            });
        }
        if spec.base_score.len() != spec.n_outputs {
            return Err(ModelError::InvalidTree {
                tree: 0,
                reason: format!(
                    "base_score has {} values, expected {}",
                    spec.base_score.len(),
                    spec.n_outputs
                ),
            });
        }

        for (index, tree) in spec.trees.iter().enumerate() {
            let invalid = |reason: String| ModelError::InvalidTree {
                tree: index,
                reason,
            };
            if tree.target >= spec.n_outputs {
                return Err(invalid(format!(
                    "target {} is out of range for {} outputs",
                    tree.target, spec.n_outputs
                )));
            }
            tree.nodes
                .validate(spec.n_features, |leaf| {
                    if leaf.is_finite() {
                        Ok(())
                    } else {
                        Err("non-finite value".to_string())
                    }
                })
                .map_err(invalid)?;
        }

        Ok(Self {
            n_features: spec.n_features,
            base_score: spec.base_score,
            trees: spec.trees,
        })
    }
}

impl Model for GradientBoosting {
    fn kind(&self) -> &'static str {
        "gradient_boosting"
    }

    fn expected_input_width(&self) -> usize {
        self.n_features
    }

    fn output_width(&self) -> usize {
        self.base_score.len()
    }

    fn predict(&self, features: &[f64]) -> Result<RawPrediction, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::FeatureArityMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let mut values = self.base_score.clone();
        for tree in &self.trees {
            values[tree.target] += tree.nodes.leaf(features, SplitRule::LessThan);
        }

        Ok(RawPrediction {
            values,
            spread: None,
        })
    }
}
