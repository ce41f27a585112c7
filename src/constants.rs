//! Cross-cutting, shared constants.
//!
//! # Pooling Invariants
//!
//! The booster was trained on embeddings pooled with one exact recipe: the elementwise
//! mean of the last [`POOLED_LAYER_COUNT`] hidden-state layers, read at sequence position
//! [`CLS_POSITION`]. Changing either value changes every score.

/// Maximum tokens per input, special tokens included.
pub const DEFAULT_MAX_SEQ_LEN: usize = 32;

/// Number of trailing hidden-state layers averaged by the pooler.
pub const POOLED_LAYER_COUNT: usize = 4;

/// Sequence position read from the averaged hidden states (the `[CLS]` token).
pub const CLS_POSITION: usize = 0;

/// Hidden width of `bert-base` checkpoints; used by the stub encoder.
pub const DEFAULT_HIDDEN_SIZE: usize = 768;

/// Transformer layer count of `bert-base` checkpoints; used by the stub encoder.
pub const DEFAULT_NUM_LAYERS: usize = 12;

pub const DEFAULT_ENCODER_PATH: &str = "bert_model";
pub const DEFAULT_TOKENIZER_PATH: &str = "bert_tokenizer";
pub const DEFAULT_BOOSTER_PATH: &str = "xgboost_model.json";

pub const DEFAULT_PORT: u16 = 5000;

pub const LEADSCORE_STATUS_HEADER: &str = "X-Leadscore-Status";
pub const LEADSCORE_STATUS_HEALTHY: &str = "healthy";
pub const LEADSCORE_STATUS_READY: &str = "ready";
pub const LEADSCORE_STATUS_SCORED: &str = "scored";
pub const LEADSCORE_STATUS_ERROR: &str = "error";
