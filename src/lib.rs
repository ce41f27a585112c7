//! Leadscore library crate (used by the server and integration tests).
//!
//! Scores free-text professional profiles: the text is tokenized, run through a BERT
//! encoder, pooled into a fixed-width vector, and fed to a gradient-boosted tree model.
//!
//! # Public API Surface
//!
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`ProfileEncoder`], [`EncoderConfig`] - Text to pooled embedding
//! - [`Booster`] - XGBoost JSON model evaluation
//! - [`ProfileScorer`] - Encoder and booster combined; one call per profile
//! - [`gateway`] - Axum router exposing `POST /predict`

pub mod booster;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod scoring;

pub use booster::{Booster, BoosterError, Objective, OutputTransform};
pub use config::{Config, ConfigError};
pub use constants::{
    CLS_POSITION, DEFAULT_MAX_SEQ_LEN, LEADSCORE_STATUS_HEADER, POOLED_LAYER_COUNT,
};
pub use embedding::{
    BertEncoder, BertEncoderConfig, EmbeddingError, EncoderConfig, PaddingMode, ProfileEncoder,
    TokenizedInput,
};
pub use gateway::{AppState, GatewayError, PredictRequest, PredictResponse};
pub use scoring::{ProfileScorer, ScoringError};
