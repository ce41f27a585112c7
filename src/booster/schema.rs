//! Serde mirror of the XGBoost JSON model document.
//!
//! Only the fields inference needs are declared; everything else is ignored. XGBoost
//! writes most scalar parameters as strings (`"5E-1"`, and `"[5E-1]"` for vector-valued
//! base scores), so numeric parameters go through [`NumberLike`].

use serde::Deserialize;

use super::error::BoosterError;

#[derive(Debug, Deserialize)]
pub(crate) struct ModelDocument {
    pub learner: LearnerDoc,
    #[serde(default)]
    pub version: Vec<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LearnerDoc {
    pub learner_model_param: LearnerModelParam,
    pub objective: ObjectiveDoc,
    pub gradient_booster: GradientBoosterDoc,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LearnerModelParam {
    #[serde(default)]
    pub base_score: Option<NumberLike>,
    #[serde(default)]
    pub num_class: Option<NumberLike>,
    pub num_feature: NumberLike,
    #[serde(default)]
    pub num_target: Option<NumberLike>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ObjectiveDoc {
    pub name: String,
}

/// `gbtree` carries `model`; `dart` nests a `gbtree` and adds `weight_drop`.
#[derive(Debug, Deserialize)]
pub(crate) struct GradientBoosterDoc {
    pub name: String,
    #[serde(default)]
    pub model: Option<GbTreeModelDoc>,
    #[serde(default)]
    pub gbtree: Option<Box<GradientBoosterDoc>>,
    #[serde(default)]
    pub weight_drop: Vec<f32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GbTreeModelDoc {
    #[serde(default)]
    pub trees: Vec<TreeDoc>,
    #[serde(default)]
    pub tree_info: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TreeDoc {
    pub tree_param: TreeParam,
    pub left_children: Vec<i64>,
    pub right_children: Vec<i64>,
    pub split_indices: Vec<i64>,
    pub split_conditions: Vec<f32>,
    pub default_left: Vec<BoolLike>,
    #[serde(default)]
    pub split_type: Vec<u8>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TreeParam {
    pub num_nodes: NumberLike,
    #[serde(default)]
    pub size_leaf_vector: Option<NumberLike>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum NumberLike {
    Number(f64),
    Text(String),
}

impl NumberLike {
    pub fn as_f64(&self, field: &'static str) -> Result<f64, BoosterError> {
        match self {
            NumberLike::Number(n) => Ok(*n),
            NumberLike::Text(text) => {
                let trimmed = text.trim().trim_start_matches('[').trim_end_matches(']');
                let first = trimmed.split(',').next().unwrap_or("").trim();
                first.parse().map_err(|_| BoosterError::InvalidNumber {
                    field,
                    value: text.clone(),
                })
            }
        }
    }

    pub fn as_usize(&self, field: &'static str) -> Result<usize, BoosterError> {
        let value = self.as_f64(field)?;
        if value < 0.0 || value.fract() != 0.0 || !value.is_finite() {
            return Err(BoosterError::InvalidNumber {
                field,
                value: value.to_string(),
            });
        }
        Ok(value as usize)
    }
}

/// XGBoost has written `default_left` both as booleans and as 0/1 integers.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub(crate) enum BoolLike {
    Bool(bool),
    Int(i64),
}

impl BoolLike {
    pub fn as_bool(self) -> bool {
        match self {
            BoolLike::Bool(b) => b,
            BoolLike::Int(i) => i != 0,
        }
    }
}
