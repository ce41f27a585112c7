//! Gradient-boosted tree inference for XGBoost JSON models.
//!
//! A model is a forest of regression trees, each assigned to an output group
//! (`tree_info`). A row's margin for a group is the objective's base margin plus the sum
//! of that group's leaf values (scaled by `weight_drop` for DART boosters); the
//! objective's transform then maps margins to predictions.
//!
//! Only numeric splits are supported. Categorical splits, vector leaves and `gblinear`
//! models are rejected at load time rather than at prediction time.

pub mod error;
pub mod objective;
pub(crate) mod schema;
pub mod tree;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::BoosterError;
pub use objective::{Objective, OutputTransform};
pub use tree::{Node, Tree};

use std::path::Path;

use tracing::{debug, info};

use schema::{GbTreeModelDoc, GradientBoosterDoc, ModelDocument};

/// Loaded boosted-tree model. Immutable after load.
#[derive(Debug, Clone)]
pub struct Booster {
    trees: Vec<Tree>,
    tree_groups: Vec<usize>,
    tree_weights: Vec<f32>,
    num_features: usize,
    num_groups: usize,
    base_score: f32,
    base_margin: f32,
    objective: Objective,
}

impl Booster {
    /// Loads a model saved with `Booster.save_model("*.json")`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BoosterError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| BoosterError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let booster = Self::from_json_slice(&bytes)?;

        info!(
            path = %path.display(),
            objective = booster.objective.name(),
            num_trees = booster.num_trees(),
            num_features = booster.num_features,
            num_groups = booster.num_groups,
            "Booster loaded"
        );

        Ok(booster)
    }

    pub fn from_json_str(json: &str) -> Result<Self, BoosterError> {
        Self::from_json_slice(json.as_bytes())
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, BoosterError> {
        let document: ModelDocument = serde_json::from_slice(bytes)?;
        Self::from_document(document)
    }

    fn from_document(document: ModelDocument) -> Result<Self, BoosterError> {
        debug!(version = ?document.version, "Parsing XGBoost model document");

        let learner = document.learner;
        let params = &learner.learner_model_param;

        let num_features = params.num_feature.as_usize("num_feature")?;
        if num_features == 0 {
            return Err(BoosterError::InvalidModel {
                reason: "num_feature must be positive".to_string(),
            });
        }

        let num_class = match &params.num_class {
            Some(n) => n.as_usize("num_class")?,
            None => 0,
        };
        let num_target = match &params.num_target {
            Some(n) => n.as_usize("num_target")?,
            None => 1,
        };
        let num_groups = num_class.max(num_target).max(1);

        let base_score = match &params.base_score {
            Some(n) => n.as_f64("base_score")? as f32,
            None => 0.5,
        };

        let objective = Objective::parse(&learner.objective.name)?;
        let base_margin = objective.base_margin(base_score)?;

        let (model, weights) = Self::tree_model(&learner.gradient_booster)?;

        if model.tree_info.len() != model.trees.len() {
            return Err(BoosterError::InvalidModel {
                reason: format!(
                    "tree_info has {} entries for {} trees",
                    model.tree_info.len(),
                    model.trees.len()
                ),
            });
        }

        let tree_groups = model
            .tree_info
            .iter()
            .map(|&group| {
                if group < 0 || group as usize >= num_groups {
                    return Err(BoosterError::InvalidModel {
                        reason: format!("tree group {group} out of range (model has {num_groups})"),
                    });
                }
                Ok(group as usize)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let trees = model
            .trees
            .iter()
            .enumerate()
            .map(|(idx, doc)| Tree::from_doc(doc, idx, num_features))
            .collect::<Result<Vec<_>, _>>()?;

        let tree_weights = match weights {
            Some(weights) => {
                if weights.len() != trees.len() {
                    return Err(BoosterError::InvalidModel {
                        reason: format!(
                            "weight_drop has {} entries for {} trees",
                            weights.len(),
                            trees.len()
                        ),
                    });
                }
                weights.to_vec()
            }
            None => vec![1.0; trees.len()],
        };

        Ok(Self {
            trees,
            tree_groups,
            tree_weights,
            num_features,
            num_groups,
            base_score,
            base_margin,
            objective,
        })
    }

    /// Finds the tree ensemble and optional per-tree DART weights.
    fn tree_model(
        doc: &GradientBoosterDoc,
    ) -> Result<(&GbTreeModelDoc, Option<&[f32]>), BoosterError> {
        match doc.name.as_str() {
            "gbtree" => {
                let model = doc.model.as_ref().ok_or_else(|| BoosterError::InvalidModel {
                    reason: "gbtree booster has no model".to_string(),
                })?;
                Ok((model, None))
            }
            "dart" => {
                let inner = doc.gbtree.as_deref().ok_or_else(|| BoosterError::InvalidModel {
                    reason: "dart booster has no gbtree".to_string(),
                })?;
                let (model, _) = Self::tree_model(inner)?;
                Ok((model, Some(doc.weight_drop.as_slice())))
            }
            other => Err(BoosterError::UnsupportedBooster {
                name: other.to_string(),
            }),
        }
    }

    /// Raw per-group margins for one row, before the objective's transform.
    pub fn predict_margin_row(&self, features: &[f32]) -> Result<Vec<f32>, BoosterError> {
        if features.len() != self.num_features {
            return Err(BoosterError::FeatureMismatch {
                expected: self.num_features,
                actual: features.len(),
            });
        }

        let mut margins = vec![self.base_margin; self.num_groups];
        for ((tree, &group), &weight) in self
            .trees
            .iter()
            .zip(&self.tree_groups)
            .zip(&self.tree_weights)
        {
            margins[group] += tree.leaf_value(features) * weight;
        }

        Ok(margins)
    }

    /// Prediction for one row: one value per output group (one value for `multi:softmax`).
    pub fn predict_row(&self, features: &[f32]) -> Result<Vec<f32>, BoosterError> {
        let margins = self.predict_margin_row(features)?;
        Ok(self.objective.apply(margins))
    }

    /// Predictions for a `rows × num_features` matrix.
    pub fn predict(&self, rows: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, BoosterError> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn num_groups(&self) -> usize {
        self.num_groups
    }

    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }
}
