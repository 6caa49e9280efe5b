//! Binary decision trees shared by the ensemble backends
//!
//! Nodes are stored in a flat array; node 0 is the root. Children always
//! have a larger index than their parent, which `validate` enforces, so
//! evaluation always terminates.

use serde::{Deserialize, Serialize};

/// Which side a value equal to the threshold falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitRule {
    /// `x <= threshold` goes left (scikit-learn)
    LessOrEqual,
    /// `x < threshold` goes left (XGBoost)
    LessThan,
}

impl SplitRule {
    fn goes_left(self, value: f64, threshold: f64) -> bool {
        match self {
            SplitRule::LessOrEqual => value <= threshold,
            SplitRule::LessThan => value < threshold,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node<L> {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: L,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Tree<L> {
    nodes: Vec<Node<L>>,
}

impl<L> Tree<L> {
    pub fn new(nodes: Vec<Node<L>>) -> Self {
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Structural checks. `check_leaf` validates leaf payloads.
    pub fn validate(
        &self,
        n_features: usize,
        check_leaf: impl Fn(&L) -> Result<(), String>,
    ) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        let len = self.nodes.len();
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {index} splits on feature {feature}, model has {n_features}"
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {index} has a non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= len {
                            return Err(format!(
                                "node {index} points to invalid child {child}"
                            ));
                        }
                    }
                }
                Node::Leaf { value } => {
                    check_leaf(value).map_err(|reason| format!("leaf {index}: {reason}"))?;
                }
            }
        }
        Ok(())
    }

    /// Leaf reached by `x`. The tree must have passed `validate` and `x`
    /// must be at least as wide as the model input.
    pub fn leaf(&self, x: &[f64], rule: SplitRule) -> &L {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if rule.goes_left(x[*feature], *threshold) {
                        *left
                    } else {
                        *right
                    };
                }
                Node::Leaf { value } => return value,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(threshold: f64) -> Tree<f64> {
        Tree::new(vec![
            Node::Split {
                feature: 0,
                threshold,
                left: 1,
                right: 2,
            },
            Node::Leaf { value: -1.0 },
            Node::Leaf { value: 1.0 },
        ])
    }

    #[test]
    fn test_split_rules_differ_at_threshold() {
        let tree = stump(0.5);
        assert_eq!(*tree.leaf(&[0.5], SplitRule::LessOrEqual), -1.0);
        assert_eq!(*tree.leaf(&[0.5], SplitRule::LessThan), 1.0);
        assert_eq!(*tree.leaf(&[0.1], SplitRule::LessThan), -1.0);
    }

    #[test]
    fn test_validate_accepts_stump() {
        assert!(stump(0.5).validate(1, |_| Ok(())).is_ok());
    }

    #[test]
    fn test_validate_rejects_backward_child() {
        let tree = Tree::new(vec![
            Node::Split {
                feature: 0,
                threshold: 0.0,
                left: 1,
                right: 0,
            },
            Node::Leaf { value: 0.0 },
        ]);
        let err = tree.validate(1, |_| Ok(())).unwrap_err();
        assert!(err.contains("invalid child 0"));
    }

    #[test]
    fn test_validate_rejects_unknown_feature() {
        assert!(stump(0.5).validate(0, |_| Ok(())).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_and_bad_leaf() {
        assert!(Tree::<f64>::new(vec![]).validate(1, |_| Ok(())).is_err());
        let err = stump(0.5)
            .validate(1, |v| if *v < 0.0 { Err("negative".into()) } else { Ok(()) })
            .unwrap_err();
        assert_eq!(err, "leaf 1: negative");
    }

    #[test]
    fn test_nodes_deserialize() {
        let tree: Tree<f64> = serde_json::from_str(
            r#"[
                {"type": "split", "feature": 0, "threshold": 2, "left": 1, "right": 2},
                {"type": "leaf", "value": 3.5},
                {"type": "leaf", "value": 4.5}
            ]"#,
        )
        .unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(*tree.leaf(&[5.0], SplitRule::LessOrEqual), 4.5);
    }
}
