//! BERT encoder that exposes every hidden state.
//!
//! The stock candle BERT returns only the final layer. Pooling needs the whole stack
//! (embedding output plus one entry per transformer layer, as `output_hidden_states`
//! does in the reference checkpoints), so the forward pass is written out here.

use std::path::Path;

use candle_core::{DType, Device, Module, Result, Tensor};
use candle_nn::{Embedding, LayerNorm, Linear, VarBuilder};
use serde::Deserialize;

fn default_max_position_embeddings() -> usize {
    512
}

fn default_type_vocab_size() -> usize {
    2
}

fn default_layer_norm_eps() -> f64 {
    1e-12
}

/// Feed-forward activation named by `hidden_act` in `config.json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenAct {
    /// Exact (erf) GELU, the `bert-base` default.
    #[default]
    Gelu,
    #[serde(alias = "gelu_new", alias = "gelu_pytorch_tanh")]
    GeluApproximate,
    Relu,
}

impl HiddenAct {
    fn apply(&self, xs: &Tensor) -> Result<Tensor> {
        match self {
            HiddenAct::Gelu => xs.gelu_erf(),
            HiddenAct::GeluApproximate => xs.gelu(),
            HiddenAct::Relu => xs.relu(),
        }
    }
}

/// Subset of a Hugging Face BERT `config.json` needed for the forward pass.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BertEncoderConfig {
    pub vocab_size: usize,
    pub hidden_size: usize,
    pub num_hidden_layers: usize,
    pub num_attention_heads: usize,
    pub intermediate_size: usize,
    #[serde(default)]
    pub hidden_act: HiddenAct,
    #[serde(default = "default_max_position_embeddings")]
    pub max_position_embeddings: usize,
    #[serde(default = "default_type_vocab_size")]
    pub type_vocab_size: usize,
    #[serde(default = "default_layer_norm_eps")]
    pub layer_norm_eps: f64,
}

impl BertEncoderConfig {
    fn validate(&self) -> Result<()> {
        if self.num_attention_heads == 0 || self.hidden_size % self.num_attention_heads != 0 {
            return Err(candle_core::Error::Msg(format!(
                "hidden_size ({}) is not divisible by num_attention_heads ({})",
                self.hidden_size, self.num_attention_heads
            )));
        }
        Ok(())
    }
}

struct BertEmbeddings {
    word_embeddings: Embedding,
    position_embeddings: Embedding,
    token_type_embeddings: Embedding,
    layer_norm: LayerNorm,
    max_positions: usize,
}

impl BertEmbeddings {
    fn load(vb: VarBuilder, config: &BertEncoderConfig) -> Result<Self> {
        let hidden = config.hidden_size;
        Ok(Self {
            word_embeddings: candle_nn::embedding(
                config.vocab_size,
                hidden,
                vb.pp("word_embeddings"),
            )?,
            position_embeddings: candle_nn::embedding(
                config.max_position_embeddings,
                hidden,
                vb.pp("position_embeddings"),
            )?,
            token_type_embeddings: candle_nn::embedding(
                config.type_vocab_size,
                hidden,
                vb.pp("token_type_embeddings"),
            )?,
            layer_norm: candle_nn::layer_norm(hidden, config.layer_norm_eps, vb.pp("LayerNorm"))?,
            max_positions: config.max_position_embeddings,
        })
    }

    fn forward(&self, input_ids: &Tensor, token_type_ids: &Tensor) -> Result<Tensor> {
        let (_batch, seq_len) = input_ids.dims2()?;
        if seq_len > self.max_positions {
            return Err(candle_core::Error::Msg(format!(
                "sequence length {} exceeds max_position_embeddings {}",
                seq_len, self.max_positions
            )));
        }

        let positions = Tensor::arange(0u32, seq_len as u32, input_ids.device())?.unsqueeze(0)?;

        let words = self.word_embeddings.forward(input_ids)?;
        let types = self.token_type_embeddings.forward(token_type_ids)?;
        let positions = self.position_embeddings.forward(&positions)?;

        let embeddings = (words + types)?.broadcast_add(&positions)?;
        self.layer_norm.forward(&embeddings)
    }
}

struct BertSelfAttention {
    query: Linear,
    key: Linear,
    value: Linear,
    num_heads: usize,
    head_dim: usize,
}

impl BertSelfAttention {
    fn load(vb: VarBuilder, config: &BertEncoderConfig) -> Result<Self> {
        let hidden = config.hidden_size;
        Ok(Self {
            query: candle_nn::linear(hidden, hidden, vb.pp("query"))?,
            key: candle_nn::linear(hidden, hidden, vb.pp("key"))?,
            value: candle_nn::linear(hidden, hidden, vb.pp("value"))?,
            num_heads: config.num_attention_heads,
            head_dim: hidden / config.num_attention_heads,
        })
    }

    fn split_heads(&self, xs: &Tensor, batch: usize, seq_len: usize) -> Result<Tensor> {
        // [batch, seq, hidden] -> [batch, heads, seq, head_dim]
        xs.reshape((batch, seq_len, self.num_heads, self.head_dim))?
            .transpose(1, 2)?
            .contiguous()
    }

    fn forward(&self, xs: &Tensor, mask: &Tensor) -> Result<Tensor> {
        let (batch, seq_len, _hidden) = xs.dims3()?;

        let q = self.split_heads(&self.query.forward(xs)?, batch, seq_len)?;
        let k = self.split_heads(&self.key.forward(xs)?, batch, seq_len)?;
        let v = self.split_heads(&self.value.forward(xs)?, batch, seq_len)?;

        let scale = 1.0 / (self.head_dim as f64).sqrt();
        let scores = (q.matmul(&k.t()?)? * scale)?;
        let scores = scores.broadcast_add(mask)?;
        let probs = candle_nn::ops::softmax_last_dim(&scores)?;

        probs
            .matmul(&v)?
            .transpose(1, 2)?
            .contiguous()?
            .reshape((batch, seq_len, self.num_heads * self.head_dim))
    }
}

struct BertLayer {
    attention: BertSelfAttention,
    attention_output: Linear,
    attention_norm: LayerNorm,
    intermediate: Linear,
    output: Linear,
    output_norm: LayerNorm,
    act: HiddenAct,
}

impl BertLayer {
    fn load(vb: VarBuilder, config: &BertEncoderConfig) -> Result<Self> {
        let hidden = config.hidden_size;
        let eps = config.layer_norm_eps;
        Ok(Self {
            attention: BertSelfAttention::load(vb.pp("attention.self"), config)?,
            attention_output: candle_nn::linear(hidden, hidden, vb.pp("attention.output.dense"))?,
            attention_norm: candle_nn::layer_norm(
                hidden,
                eps,
                vb.pp("attention.output.LayerNorm"),
            )?,
            intermediate: candle_nn::linear(
                hidden,
                config.intermediate_size,
                vb.pp("intermediate.dense"),
            )?,
            output: candle_nn::linear(config.intermediate_size, hidden, vb.pp("output.dense"))?,
            output_norm: candle_nn::layer_norm(hidden, eps, vb.pp("output.LayerNorm"))?,
            act: config.hidden_act,
        })
    }

    fn forward(&self, xs: &Tensor, mask: &Tensor) -> Result<Tensor> {
        let attended = self.attention.forward(xs, mask)?;
        let attended = self
            .attention_norm
            .forward(&(self.attention_output.forward(&attended)? + xs)?)?;

        let intermediate = self.act.apply(&self.intermediate.forward(&attended)?)?;
        self.output_norm
            .forward(&(self.output.forward(&intermediate)? + &attended)?)
    }
}

/// BERT encoder returning the embedding output plus every layer's hidden states.
pub struct BertEncoder {
    embeddings: BertEmbeddings,
    layers: Vec<BertLayer>,
    config: BertEncoderConfig,
}

impl BertEncoder {
    /// Builds the encoder from a var builder (checkpoint root, `bert.` or `roberta.` prefix).
    pub fn new(vb: VarBuilder, config: &BertEncoderConfig) -> Result<Self> {
        config.validate()?;

        let vb = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
            vb.pp("bert")
        } else if vb.contains_tensor("roberta.embeddings.word_embeddings.weight") {
            vb.pp("roberta")
        } else {
            vb
        };

        let embeddings = BertEmbeddings::load(vb.pp("embeddings"), config)?;
        let layers = (0..config.num_hidden_layers)
            .map(|idx| BertLayer::load(vb.pp(format!("encoder.layer.{idx}")), config))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            embeddings,
            layers,
            config: config.clone(),
        })
    }

    /// Loads `config.json` plus `model.safetensors` (or `pytorch_model.bin`) from a directory.
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let config_content = std::fs::read_to_string(model_dir.join("config.json"))?;
        let config: BertEncoderConfig = serde_json::from_str(&config_content)
            .map_err(|e| candle_core::Error::Msg(format!("Failed to parse config: {}", e)))?;

        let safetensors = model_dir.join("model.safetensors");
        let vb = if safetensors.exists() {
            unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], DType::F32, device)? }
        } else {
            VarBuilder::from_pth(model_dir.join("pytorch_model.bin"), DType::F32, device)?
        };

        Self::new(vb, &config)
    }

    /// Runs the encoder and returns `num_hidden_layers + 1` tensors of shape
    /// `[batch, seq_len, hidden_size]`, embedding output first.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Vec<Tensor>> {
        let (batch, seq_len) = input_ids.dims2()?;
        let mask = match attention_mask {
            Some(mask) => additive_mask(mask)?,
            None => Tensor::zeros((batch, 1, 1, seq_len), DType::F32, input_ids.device())?,
        };

        let mut hidden = self.embeddings.forward(input_ids, token_type_ids)?;
        let mut hidden_states = Vec::with_capacity(self.layers.len() + 1);
        hidden_states.push(hidden.clone());

        for layer in &self.layers {
            hidden = layer.forward(&hidden, &mask)?;
            hidden_states.push(hidden.clone());
        }

        Ok(hidden_states)
    }

    pub fn config(&self) -> &BertEncoderConfig {
        &self.config
    }

    pub fn hidden_size(&self) -> usize {
        self.config.hidden_size
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }
}

/// Turns a `[batch, seq]` 1/0 mask into a `[batch, 1, 1, seq]` additive bias
/// (0 for real tokens, `f32::MIN` for padding).
fn additive_mask(mask: &Tensor) -> Result<Tensor> {
    let (batch, seq_len) = mask.dims2()?;
    mask.to_dtype(DType::F32)?
        .affine(-1.0, 1.0)?
        .affine(f32::MIN as f64, 0.0)?
        .reshape((batch, 1, 1, seq_len))
}
