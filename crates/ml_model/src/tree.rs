//! Regression trees of the boosted ensemble.

use serde::{Deserialize, Serialize};

/// A node of a binary regression tree.
///
/// Nodes live in a flat vector and refer to their children by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Rows with `x[feature] <= threshold` go left. Missing values follow
    /// `default_left`.
    Split {
        feature: usize,
        threshold: f64,
        default_left: bool,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub(crate) const fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf { .. }))
            .count()
    }

    /// Evaluates the tree, reading feature values through `value`.
    pub fn predict_with(&self, value: impl Fn(usize) -> f64) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf { value }) => return *value,
                Some(&Node::Split {
                    feature,
                    threshold,
                    default_left,
                    left,
                    right,
                }) => {
                    let x = value(feature);
                    let go_left = if x.is_finite() {
                        x <= threshold
                    } else {
                        default_left
                    };
                    index = if go_left { left } else { right };
                }
                None => return 0.0,
            }
        }
    }

    /// Evaluates the tree on a dense row.
    #[must_use]
    pub fn predict(&self, row: &[f64]) -> f64 {
        self.predict_with(|feature| row.get(feature).copied().unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> Tree {
        Tree::from_nodes(vec![
            Node::Split {
                feature: 1,
                threshold: 2.5,
                default_left: true,
                left: 1,
                right: 2,
            },
            Node::Leaf { value: -1.0 },
            Node::Leaf { value: 1.0 },
        ])
    }

    #[test]
    fn test_routing() {
        let tree = stump();
        assert!((tree.predict(&[0.0, 2.5]) + 1.0).abs() < f64::EPSILON);
        assert!((tree.predict(&[0.0, 3.0]) - 1.0).abs() < f64::EPSILON);
        assert!((tree.predict(&[0.0, f64::NAN]) + 1.0).abs() < f64::EPSILON);
        assert_eq!(tree.n_leaves(), 2);
    }

    #[test]
    fn test_serde_roundtrip() {
        let tree = stump();
        let json = serde_json::to_string(&tree).expect("serialize");
        assert!(json.contains("\"kind\":\"split\""));
        let back: Tree = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, tree);
    }
}
