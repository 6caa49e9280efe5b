//! Random forest regressor with vector-valued leaves

use serde::Deserialize;

use super::tree::{SplitRule, Tree};
use super::{Model, ModelError, RawPrediction};

#[derive(Debug, Clone, Deserialize)]
pub struct ForestTree {
    pub nodes: Tree<Vec<f64>>,
}

/// `model` section of a `random_forest` artifact
#[derive(Debug, Clone, Deserialize)]
pub struct ForestSpec {
    pub n_features: usize,
    pub n_outputs: usize,
    pub trees: Vec<ForestTree>,
}

/// Averages the leaves reached in every tree. The per-output standard
/// deviation across trees is reported as spread.
#[derive(Debug)]
pub struct RandomForest {
    n_features: usize,
    n_outputs: usize,
    trees: Vec<Tree<Vec<f64>>>,
}

impl RandomForest {
    pub fn new(spec: ForestSpec) -> Result<Self, ModelError> {
        if spec.trees.is_empty() {
            return Err(ModelError::InvalidTree {
                tree: 0,
                reason: "forest has no trees".to_string(),
            });
        }
        if spec.n_features == 0 || spec.n_outputs == 0 {
            return Err(ModelError::InvalidTree {
                tree: 0,
                reason: "n_features and n_outputs must be positive".to_string(),
            });
        }

        let n_outputs = spec.n_outputs;
        let check_leaf = |leaf: &Vec<f64>| {
            if leaf.len() != n_outputs {
                return Err(format!("has {} values, expected {n_outputs}", leaf.len()));
            }
            if leaf.iter().any(|v| !v.is_finite()) {
                return Err("contains a non-finite value".to_string());
            }
            Ok(())
        };

        let mut trees = Vec::with_capacity(spec.trees.len());
        for (index, tree) in spec.trees.into_iter().enumerate() {
            tree.nodes
                .validate(spec.n_features, check_leaf)
                .map_err(|reason| ModelError::InvalidTree {
                    tree: index,
                    reason,
                })?;
            trees.push(tree.nodes);
        }

        Ok(Self {
            n_features: spec.n_features,
            n_outputs,
            trees,
        })
    }
}

impl Model for RandomForest {
    fn kind(&self) -> &'static str {
        "random_forest"
    }

    fn expected_input_width(&self) -> usize {
        self.n_features
    }

    fn output_width(&self) -> usize {
        self.n_outputs
    }

    fn predict(&self, features: &[f64]) -> Result<RawPrediction, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::FeatureArityMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let leaves: Vec<&Vec<f64>> = self
            .trees
            .iter()
            .map(|tree| tree.leaf(features, SplitRule::LessOrEqual))
            .collect();
        let count = leaves.len() as f64;

        let mut mean = vec![0.0; self.n_outputs];
        for leaf in &leaves {
            for (acc, v) in mean.iter_mut().zip(leaf.iter()) {
                *acc += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= count);

        let mut spread = vec![0.0; self.n_outputs];
        for leaf in &leaves {
            for ((acc, v), m) in spread.iter_mut().zip(leaf.iter()).zip(mean.iter()) {
                *acc += (v - m).powi(2);
            }
        }
        spread.iter_mut().for_each(|s| *s = (*s / count).sqrt());

        Ok(RawPrediction {
            values: mean,
            spread: Some(spread),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tree::Node;

    fn stump(threshold: f64, left: Vec<f64>, right: Vec<f64>) -> ForestTree {
        ForestTree {
            nodes: Tree::new(vec![
                Node::Split {
                    feature: 0,
                    threshold,
                    left: 1,
                    right: 2,
                },
                Node::Leaf { value: left },
                Node::Leaf { value: right },
            ]),
        }
    }

    fn forest() -> RandomForest {
        RandomForest::new(ForestSpec {
            n_features: 1,
            n_outputs: 2,
            trees: vec![
                stump(0.5, vec![1.0, 10.0], vec![3.0, 30.0]),
                stump(0.5, vec![3.0, 10.0], vec![5.0, 30.0]),
            ],
        })
        .unwrap()
    }

    #[test]
    fn test_mean_and_spread() {
        let prediction = forest().predict(&[0.0]).unwrap();
        assert_eq!(prediction.values, vec![2.0, 10.0]);
        assert_eq!(prediction.spread, Some(vec![1.0, 0.0]));
    }

    #[test]
    fn test_threshold_goes_left() {
        let prediction = forest().predict(&[0.5]).unwrap();
        assert_eq!(prediction.values, vec![2.0, 10.0]);
        let prediction = forest().predict(&[0.6]).unwrap();
        assert_eq!(prediction.values, vec![4.0, 30.0]);
    }

    #[test]
    fn test_rejects_wrong_width() {
        let err = forest().predict(&[0.0, 1.0]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::FeatureArityMismatch {
                expected: 1,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_rejects_short_leaf() {
        let err = RandomForest::new(ForestSpec {
            n_features: 1,
            n_outputs: 2,
            trees: vec![stump(0.5, vec![1.0], vec![3.0, 30.0])],
        })
        .unwrap_err();
        assert!(matches!(err, ModelError::InvalidTree { tree: 0, .. }));
    }

    #[test]
    fn test_rejects_empty_forest() {
        let err = RandomForest::new(ForestSpec {
            n_features: 1,
            n_outputs: 2,
            trees: vec![],
        })
        .unwrap_err();
        assert!(matches!(err, ModelError::InvalidTree { .. }));
    }
}
