use tracing::{debug, info};

use crate::booster::Booster;
use crate::embedding::ProfileEncoder;

use super::error::ScoringError;

pub struct ProfileScorer {
    encoder: ProfileEncoder,
    booster: Booster,
}

impl std::fmt::Debug for ProfileScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileScorer")
            .field("encoder", &self.encoder)
            .field("num_trees", &self.booster.num_trees())
            .field("objective", &self.booster.objective().name())
            .finish()
    }
}

impl ProfileScorer {
    pub fn new(encoder: ProfileEncoder, booster: Booster) -> Result<Self, ScoringError> {
        if booster.num_features() != encoder.hidden_size() {
            return Err(ScoringError::DimensionMismatch {
                booster_features: booster.num_features(),
                hidden_size: encoder.hidden_size(),
            });
        }

        info!(
            hidden_size = encoder.hidden_size(),
            num_trees = booster.num_trees(),
            objective = booster.objective().name(),
            stub = encoder.is_stub(),
            "Profile scorer ready"
        );

        Ok(Self { encoder, booster })
    }

    /// Scores one profile text.
    ///
    /// Runs tokenization, the encoder forward pass and pooling, then the booster. The
    /// first output of the booster is the score. Blocking; call from a blocking thread
    /// in async contexts.
    pub fn score(&self, profile_text: &str) -> Result<f64, ScoringError> {
        let features = self.encoder.embed(profile_text)?;
        let prediction = self.booster.predict_row(&features)?;

        let value = prediction
            .first()
            .copied()
            .ok_or(ScoringError::EmptyPrediction)?;
        if !value.is_finite() {
            return Err(ScoringError::NonFiniteScore { value });
        }

        debug!(text_len = profile_text.len(), score = value, "Profile scored");
        Ok(f64::from(value))
    }

    pub fn encoder(&self) -> &ProfileEncoder {
        &self.encoder
    }

    pub fn booster(&self) -> &Booster {
        &self.booster
    }
}
