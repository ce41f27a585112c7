//! Regression trees with numeric splits.

use super::error::BoosterError;
use super::schema::TreeDoc;

const NO_CHILD: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    /// Go left when `value < threshold`; missing (NaN) values follow `default_left`.
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
    },
    Leaf {
        value: f32,
    },
}

/// One tree, nodes stored in XGBoost order (root at index 0).
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Builds and validates a tree from its JSON form.
    ///
    /// Rejects categorical splits, out-of-range children or features, and shapes where a
    /// node is reachable twice, so [`Tree::leaf_value`] always terminates.
    pub(crate) fn from_doc(
        doc: &TreeDoc,
        tree_idx: usize,
        num_features: usize,
    ) -> Result<Self, BoosterError> {
        let malformed = |reason: String| BoosterError::MalformedTree {
            tree: tree_idx,
            reason,
        };

        let num_nodes = doc.tree_param.num_nodes.as_usize("tree_param.num_nodes")?;
        if num_nodes == 0 {
            return Err(malformed("tree has no nodes".to_string()));
        }

        if let Some(size) = &doc.tree_param.size_leaf_vector {
            let size = size.as_usize("tree_param.size_leaf_vector")?;
            if size > 1 {
                return Err(malformed(format!(
                    "vector leaves (size_leaf_vector = {size}) are not supported"
                )));
            }
        }

        let lengths = [
            ("left_children", doc.left_children.len()),
            ("right_children", doc.right_children.len()),
            ("split_indices", doc.split_indices.len()),
            ("split_conditions", doc.split_conditions.len()),
            ("default_left", doc.default_left.len()),
        ];
        for (name, len) in lengths {
            if len != num_nodes {
                return Err(malformed(format!("{name} has {len} entries, expected {num_nodes}")));
            }
        }
        if !doc.split_type.is_empty() && doc.split_type.len() != num_nodes {
            return Err(malformed(format!(
                "split_type has {} entries, expected {num_nodes}",
                doc.split_type.len()
            )));
        }

        let mut parent_count = vec![0u8; num_nodes];
        let mut nodes = Vec::with_capacity(num_nodes);

        for idx in 0..num_nodes {
            let left = doc.left_children[idx];
            let right = doc.right_children[idx];

            if left == NO_CHILD && right == NO_CHILD {
                nodes.push(Node::Leaf {
                    value: doc.split_conditions[idx],
                });
                continue;
            }

            if doc.split_type.get(idx).copied().unwrap_or(0) != 0 {
                return Err(BoosterError::UnsupportedSplit {
                    tree: tree_idx,
                    node: idx,
                });
            }

            let child = |value: i64, side: &str| -> Result<usize, BoosterError> {
                if value <= 0 || value as usize >= num_nodes {
                    return Err(malformed(format!(
                        "node {idx} has invalid {side} child {value}"
                    )));
                }
                Ok(value as usize)
            };
            let left = child(left, "left")?;
            let right = child(right, "right")?;
            if left == right {
                return Err(malformed(format!("node {idx} has identical children")));
            }

            for c in [left, right] {
                parent_count[c] += 1;
                if parent_count[c] > 1 {
                    return Err(malformed(format!("node {c} has more than one parent")));
                }
            }

            let feature = doc.split_indices[idx];
            if feature < 0 || feature as usize >= num_features {
                return Err(malformed(format!(
                    "node {idx} splits on feature {feature}, model has {num_features}"
                )));
            }

            nodes.push(Node::Split {
                feature: feature as usize,
                threshold: doc.split_conditions[idx],
                left,
                right,
                default_left: doc.default_left[idx].as_bool(),
            });
        }

        Ok(Self { nodes })
    }

    /// Walks from the root to a leaf and returns its value.
    ///
    /// `features` must have at least as many entries as the model's feature count.
    pub fn leaf_value(&self, features: &[f32]) -> f32 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let value = features[feature];
                    idx = if value.is_nan() {
                        if default_left { left } else { right }
                    } else if value < threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }
}
