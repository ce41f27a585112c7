//! Embedding + model utilities.
//!
//! - [`encoder`] turns text into the pooled embedding the booster consumes.
//! - [`pooling`] holds the layer-averaging recipe.

/// BERT encoder exposing every hidden state.
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Profile encoder (tokenizer + BERT + pooling).
pub mod encoder;
mod error;
#[cfg(test)]
pub(crate) mod fixtures;
/// Last-layers mean pooling at the `[CLS]` position.
pub mod pooling;
/// Tokenizer loading helpers.
pub mod utils;

pub use bert::{BertEncoder, BertEncoderConfig, HiddenAct};
pub use encoder::{EncoderConfig, PaddingMode, ProfileEncoder, TokenizedInput};
pub use error::EmbeddingError;
pub use pooling::{mean_of_last_layers, pool_hidden_states, rows_at_position};
