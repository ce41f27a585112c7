use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoosterError {
    #[error("failed to read booster model at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse booster JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid number for {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("unsupported gradient booster: {name}")]
    UnsupportedBooster { name: String },

    #[error("unsupported objective: {name}")]
    UnsupportedObjective { name: String },

    #[error("tree {tree} node {node}: categorical splits are not supported")]
    UnsupportedSplit { tree: usize, node: usize },

    #[error("tree {tree} is malformed: {reason}")]
    MalformedTree { tree: usize, reason: String },

    #[error("invalid booster model: {reason}")]
    InvalidModel { reason: String },

    #[error("feature count mismatch: model expects {expected}, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },
}
