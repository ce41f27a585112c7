//! Hand-built XGBoost JSON documents for unit tests.

use serde_json::{Value, json};

use super::Booster;

/// Tree with explicit node arrays, in XGBoost's column layout.
pub(crate) fn tree(
    left_children: &[i64],
    right_children: &[i64],
    split_indices: &[i64],
    split_conditions: &[f32],
    default_left: &[bool],
) -> Value {
    json!({
        "base_weights": vec![0.0f32; left_children.len()],
        "categories": [],
        "categories_nodes": [],
        "categories_segments": [],
        "categories_sizes": [],
        "default_left": default_left.iter().map(|&d| u8::from(d)).collect::<Vec<_>>(),
        "id": 0,
        "left_children": left_children,
        "loss_changes": vec![0.0f32; left_children.len()],
        "parents": vec![2147483647i64; left_children.len()],
        "right_children": right_children,
        "split_conditions": split_conditions,
        "split_indices": split_indices,
        "split_type": vec![0u8; left_children.len()],
        "sum_hessian": vec![1.0f32; left_children.len()],
        "tree_param": {
            "num_deleted": "0",
            "num_feature": "0",
            "num_nodes": left_children.len().to_string(),
            "size_leaf_vector": "1"
        }
    })
}

/// One split on `feature` at `threshold`; missing values go left.
pub(crate) fn stump(feature: i64, threshold: f32, left_leaf: f32, right_leaf: f32) -> Value {
    tree(
        &[1, -1, -1],
        &[2, -1, -1],
        &[feature, 0, 0],
        &[threshold, left_leaf, right_leaf],
        &[true, false, false],
    )
}

/// Tree that is a single leaf.
pub(crate) fn constant(value: f32) -> Value {
    tree(&[-1], &[-1], &[0], &[value], &[false])
}

/// `gbtree` model document. `tree_info` puts every tree in group 0.
pub(crate) fn model(
    objective: &str,
    num_feature: usize,
    base_score: &str,
    trees: Vec<Value>,
) -> Value {
    let groups = vec![0i64; trees.len()];
    model_with_groups(objective, num_feature, base_score, 0, trees, groups)
}

pub(crate) fn model_with_groups(
    objective: &str,
    num_feature: usize,
    base_score: &str,
    num_class: usize,
    trees: Vec<Value>,
    tree_info: Vec<i64>,
) -> Value {
    let num_trees = trees.len();
    json!({
        "learner": {
            "attributes": {},
            "feature_names": [],
            "feature_types": [],
            "gradient_booster": {
                "model": {
                    "gbtree_model_param": {
                        "num_parallel_tree": "1",
                        "num_trees": num_trees.to_string()
                    },
                    "iteration_indptr": [],
                    "tree_info": tree_info,
                    "trees": trees
                },
                "name": "gbtree"
            },
            "learner_model_param": {
                "base_score": base_score,
                "boost_from_average": "1",
                "num_class": num_class.to_string(),
                "num_feature": num_feature.to_string(),
                "num_target": "1"
            },
            "objective": {
                "name": objective
            }
        },
        "version": [2, 0, 3]
    })
}

/// Logistic model over `num_feature` inputs with one stump per feature.
///
/// Feature `i` contributes `+0.1 * (i + 1)` when it is `>= 0.0` and `-0.1 * (i + 1)`
/// otherwise, so any real-valued row yields a finite probability.
pub(crate) fn logistic_booster(num_feature: usize) -> Booster {
    let trees = (0..num_feature)
        .map(|i| {
            let weight = 0.1 * (i as f32 + 1.0);
            stump(i as i64, 0.0, -weight, weight)
        })
        .collect();
    let doc = model("binary:logistic", num_feature, "5E-1", trees);
    Booster::from_json_str(&doc.to_string()).expect("fixture booster must load")
}
