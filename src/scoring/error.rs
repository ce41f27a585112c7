use thiserror::Error;

use crate::booster::BoosterError;
use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("booster error: {0}")]
    Booster(#[from] BoosterError),

    #[error("booster expects {booster_features} features but encoder produces {hidden_size}")]
    DimensionMismatch {
        booster_features: usize,
        hidden_size: usize,
    },

    #[error("booster returned no prediction")]
    EmptyPrediction,

    #[error("score is not finite: {value}")]
    NonFiniteScore { value: f32 },
}
