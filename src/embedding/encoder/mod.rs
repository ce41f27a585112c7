//! Profile encoder: tokenizer + BERT + pooling.
//!
//! Use [`EncoderConfig::stub`] for tests/examples without model files.

/// Encoder configuration.
pub mod config;


pub use config::{EncoderConfig, PaddingMode};

use std::sync::Arc;

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::embedding::bert::BertEncoder;
use crate::embedding::device::{device_label, select_device};
use crate::embedding::error::EmbeddingError;
use crate::embedding::pooling::pool_hidden_states;
use crate::embedding::utils::{configure_tokenizer, load_tokenizer};

/// Token ids, segment ids and attention mask for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedInput {
    pub ids: Vec<u32>,
    pub type_ids: Vec<u32>,
    pub attention_mask: Vec<u32>,
}

impl TokenizedInput {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of positions the attention mask marks as real tokens.
    pub fn real_token_count(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m != 0).count()
    }
}

enum EncoderBackend {
    Model {
        model: Arc<BertEncoder>,
        tokenizer: Arc<Tokenizer>,
        device: Device,
    },
    Stub {
        device: Device,
    },
}

/// Text encoder producing pooled embeddings (supports stub mode).
///
/// Read-only after construction; share it behind an [`Arc`].
pub struct ProfileEncoder {
    backend: EncoderBackend,
    config: EncoderConfig,
    hidden_size: usize,
    num_layers: usize,
}

impl std::fmt::Debug for ProfileEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileEncoder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EncoderBackend::Stub { device } => format!("Stub({:?})", device),
                },
            )
            .field("hidden_size", &self.hidden_size)
            .field("num_layers", &self.num_layers)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl ProfileEncoder {
    /// Loads the encoder from a config (stub mode is supported).
    pub fn load(config: EncoderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let device = select_device()?;
        debug!(device = device_label(&device), "Selected compute device for encoder");

        if config.testing_stub {
            warn!("Encoder running in STUB mode (testing only)");
            return Ok(Self::stub_with(config, device));
        }

        if !config.model_available() {
            return Err(EmbeddingError::ModelNotFound {
                path: config.model_dir.clone(),
            });
        }
        if !config.tokenizer_available() {
            return Err(EmbeddingError::ModelNotFound {
                path: config.tokenizer_path.clone(),
            });
        }

        let tokenizer = load_tokenizer(&config.tokenizer_path).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        let model = BertEncoder::load(&config.model_dir, &device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load BERT encoder: {}", e),
            }
        })?;

        info!(
            model_dir = %config.model_dir.display(),
            tokenizer = %config.tokenizer_path.display(),
            hidden_size = model.hidden_size(),
            num_layers = model.num_layers(),
            max_seq_len = config.max_seq_len,
            "Encoder loaded"
        );

        Self::from_parts(model, tokenizer, device, config)
    }

    /// Assembles an encoder from an already-built model and tokenizer.
    ///
    /// The tokenizer's truncation and padding are reset from `config`.
    pub fn from_parts(
        model: BertEncoder,
        mut tokenizer: Tokenizer,
        device: Device,
        config: EncoderConfig,
    ) -> Result<Self, EmbeddingError> {
        if config.max_seq_len > model.config().max_position_embeddings {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "max_seq_len ({}) exceeds max_position_embeddings ({})",
                    config.max_seq_len,
                    model.config().max_position_embeddings
                ),
            });
        }

        configure_tokenizer(&mut tokenizer, config.max_seq_len, config.padding).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;

        let hidden_size = model.hidden_size();
        let num_layers = model.num_layers();

        Ok(Self {
            backend: EncoderBackend::Model {
                model: Arc::new(model),
                tokenizer: Arc::new(tokenizer),
                device,
            },
            config,
            hidden_size,
            num_layers,
        })
    }

    /// Stub encoder with the given config on CPU.
    pub fn stub(config: EncoderConfig) -> Self {
        Self::stub_with(config, Device::Cpu)
    }

    fn stub_with(config: EncoderConfig, device: Device) -> Self {
        let hidden_size = config.stub_hidden_size;
        let num_layers = config.stub_num_layers;
        Self {
            backend: EncoderBackend::Stub { device },
            config,
            hidden_size,
            num_layers,
        }
    }

    /// Tokenizes `text` with truncation and padding applied.
    pub fn tokenize(&self, text: &str) -> Result<TokenizedInput, EmbeddingError> {
        match &self.backend {
            EncoderBackend::Model { tokenizer, .. } => {
                let encoding =
                    tokenizer
                        .encode(text, true)
                        .map_err(|e| EmbeddingError::TokenizationFailed {
                            reason: e.to_string(),
                        })?;

                Ok(TokenizedInput {
                    ids: encoding.get_ids().to_vec(),
                    type_ids: encoding.get_type_ids().to_vec(),
                    attention_mask: encoding.get_attention_mask().to_vec(),
                })
            }
            EncoderBackend::Stub { .. } => Err(EmbeddingError::InvalidConfig {
                reason: "stub encoder has no tokenizer".to_string(),
            }),
        }
    }

    /// Runs the encoder and returns the full hidden-state stack for `text`.
    ///
    /// Each entry is `[1, seq_len, hidden_size]`; there are `num_layers + 1` entries.
    pub fn hidden_states(&self, text: &str) -> Result<Vec<Tensor>, EmbeddingError> {
        match &self.backend {
            EncoderBackend::Model { model, device, .. } => {
                let input = self.tokenize(text)?;
                self.forward_tokens(model, &input, device)
            }
            EncoderBackend::Stub { device } => self.stub_hidden_states(text, device),
        }
    }

    /// Runs the encoder on already-tokenized input.
    pub fn hidden_states_for(&self, input: &TokenizedInput) -> Result<Vec<Tensor>, EmbeddingError> {
        match &self.backend {
            EncoderBackend::Model { model, device, .. } => {
                self.forward_tokens(model, input, device)
            }
            EncoderBackend::Stub { .. } => Err(EmbeddingError::InvalidConfig {
                reason: "stub encoder cannot run on token ids".to_string(),
            }),
        }
    }

    /// Generates the pooled embedding for a single string.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let hidden_states = self.hidden_states(text)?;
        Self::first_pooled(&hidden_states)
    }

    /// Generates the pooled embedding for already-tokenized input.
    pub fn embed_tokens(&self, input: &TokenizedInput) -> Result<Vec<f32>, EmbeddingError> {
        let hidden_states = self.hidden_states_for(input)?;
        Self::first_pooled(&hidden_states)
    }

    fn first_pooled(hidden_states: &[Tensor]) -> Result<Vec<f32>, EmbeddingError> {
        pool_hidden_states(hidden_states)?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::PoolingFailed {
                reason: "pooling produced no rows".to_string(),
            })
    }

    fn forward_tokens(
        &self,
        model: &BertEncoder,
        input: &TokenizedInput,
        device: &Device,
    ) -> Result<Vec<Tensor>, EmbeddingError> {
        if input.is_empty() {
            return Err(EmbeddingError::TokenizationFailed {
                reason: "tokenizer produced no tokens".to_string(),
            });
        }

        debug!(
            token_count = input.len(),
            real_tokens = input.real_token_count(),
            "Running encoder forward pass"
        );

        let input_ids = Tensor::new(input.ids.as_slice(), device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(input.type_ids.as_slice(), device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(input.attention_mask.as_slice(), device)?.unsqueeze(0)?;

        model
            .forward(&input_ids, &type_ids, Some(&attention_mask))
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("Encoder forward pass failed: {}", e),
            })
    }

    fn stub_hidden_states(
        &self,
        text: &str,
        device: &Device,
    ) -> Result<Vec<Tensor>, EmbeddingError> {
        use std::hash::{DefaultHasher, Hash, Hasher};

        debug!(text_len = text.len(), "Generating stub hidden states");

        (0..=self.num_layers)
            .map(|layer| {
                let mut hasher = DefaultHasher::new();
                text.hash(&mut hasher);
                layer.hash(&mut hasher);
                let mut state = hasher.finish();

                let values: Vec<f32> = (0..self.hidden_size)
                    .map(|_| {
                        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                        ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0
                    })
                    .collect();

                Ok(Tensor::from_vec(values, (1, 1, self.hidden_size), device)?)
            })
            .collect()
    }

    /// Width of the pooled embedding.
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Number of transformer layers (the hidden-state stack has one more entry).
    pub fn num_layers(&self) -> usize {
        self.num_layers
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Stub { .. })
    }

    /// Returns `true` if a model is loaded.
    pub fn has_model(&self) -> bool {
        matches!(self.backend, EncoderBackend::Model { .. })
    }

    pub fn device(&self) -> &Device {
        match &self.backend {
            EncoderBackend::Model { device, .. } | EncoderBackend::Stub { device } => device,
        }
    }

    /// Returns the encoder configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}
