use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_HIDDEN_SIZE, DEFAULT_MAX_SEQ_LEN, DEFAULT_NUM_LAYERS, POOLED_LAYER_COUNT,
};
use crate::embedding::error::EmbeddingError;
use crate::embedding::utils::resolve_tokenizer_path;

/// How short inputs are padded before the forward pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaddingMode {
    /// Pad to the longest sequence in the batch (a single input is not padded).
    #[default]
    Longest,
    /// Pad every input to `max_seq_len`.
    Fixed,
}

#[derive(Debug, Clone)]
/// Configuration for [`ProfileEncoder`](super::ProfileEncoder).
pub struct EncoderConfig {
    /// Directory holding `config.json` and the weights.
    pub model_dir: PathBuf,
    /// Tokenizer directory, `tokenizer.json` or `vocab.txt` path.
    pub tokenizer_path: PathBuf,
    /// Max tokens per input, special tokens included.
    pub max_seq_len: usize,
    pub padding: PaddingMode,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
    /// Hidden width reported and produced in stub mode.
    pub stub_hidden_size: usize,
    /// Transformer layer count simulated in stub mode.
    pub stub_num_layers: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::new(),
            tokenizer_path: PathBuf::new(),
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            padding: PaddingMode::default(),
            testing_stub: false,
            stub_hidden_size: DEFAULT_HIDDEN_SIZE,
            stub_num_layers: DEFAULT_NUM_LAYERS,
        }
    }
}

impl EncoderConfig {
    pub fn new<P: Into<PathBuf>, T: Into<PathBuf>>(model_dir: P, tokenizer_path: T) -> Self {
        Self {
            model_dir: model_dir.into(),
            tokenizer_path: tokenizer_path.into(),
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files; produces deterministic hidden states).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        self.max_seq_len = max_seq_len;
        self
    }

    pub fn with_padding(mut self, padding: PaddingMode) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_stub_dims(mut self, hidden_size: usize, num_layers: usize) -> Self {
        self.stub_hidden_size = hidden_size;
        self.stub_num_layers = num_layers;
        self
    }

    /// Validates required fields for the selected mode.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.max_seq_len < 2 {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!("max_seq_len must be at least 2, got {}", self.max_seq_len),
            });
        }

        if self.testing_stub {
            if self.stub_hidden_size == 0 {
                return Err(EmbeddingError::InvalidConfig {
                    reason: "stub_hidden_size must be positive".to_string(),
                });
            }
            if self.stub_num_layers + 1 < POOLED_LAYER_COUNT {
                return Err(EmbeddingError::InvalidConfig {
                    reason: format!(
                        "stub_num_layers must be at least {}, got {}",
                        POOLED_LAYER_COUNT - 1,
                        self.stub_num_layers
                    ),
                });
            }
            return Ok(());
        }

        if self.model_dir.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_dir is required (stubbing is disabled)".to_string(),
            });
        }

        if self.tokenizer_path.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "tokenizer_path is required (stubbing is disabled)".to_string(),
            });
        }

        Ok(())
    }

    /// Returns `true` if the model directory holds a config and weights.
    pub fn model_available(&self) -> bool {
        let dir: &Path = &self.model_dir;
        !dir.as_os_str().is_empty()
            && dir.join("config.json").is_file()
            && (dir.join("model.safetensors").is_file() || dir.join("pytorch_model.bin").is_file())
    }

    /// Returns `true` if `tokenizer.json` or `vocab.txt` can be found.
    pub fn tokenizer_available(&self) -> bool {
        !self.tokenizer_path.as_os_str().is_empty()
            && resolve_tokenizer_path(&self.tokenizer_path).is_some()
    }
}
