//! Tiny tokenizer and BERT fixtures for unit tests.

use std::str::FromStr;

use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use tokenizers::Tokenizer;

use crate::embedding::bert::{BertEncoder, BertEncoderConfig};
use crate::embedding::encoder::{EncoderConfig, PaddingMode, ProfileEncoder};

/// Hidden size of [`tiny_encoder`].
pub(crate) const TINY_HIDDEN_SIZE: usize = 8;

pub(crate) const WORDS: &[&str] = &[
    "senior",
    "backend",
    "engineer",
    "with",
    "10",
    "years",
    "of",
    "experience",
    "in",
    "distributed",
    "systems",
    ".",
];

/// Word-level tokenizer with BERT special tokens (`[PAD]`=0, `[UNK]`=1, `[CLS]`=2, `[SEP]`=3).
pub(crate) fn word_tokenizer() -> Tokenizer {
    let mut vocab = serde_json::Map::new();
    for (id, token) in ["[PAD]", "[UNK]", "[CLS]", "[SEP]"].iter().enumerate() {
        vocab.insert(token.to_string(), serde_json::json!(id));
    }
    for (offset, word) in WORDS.iter().enumerate() {
        vocab.insert(word.to_string(), serde_json::json!(offset + 4));
    }

    let json = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": {"type": "Lowercase"},
        "pre_tokenizer": {"type": "Whitespace"},
        "post_processor": {
            "type": "BertProcessing",
            "sep": ["[SEP]", 3],
            "cls": ["[CLS]", 2]
        },
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": "[UNK]"
        }
    });

    Tokenizer::from_str(&json.to_string()).expect("fixture tokenizer should parse")
}

pub(crate) fn tiny_bert_config() -> BertEncoderConfig {
    serde_json::from_value(serde_json::json!({
        "vocab_size": WORDS.len() + 4,
        "hidden_size": TINY_HIDDEN_SIZE,
        "num_hidden_layers": 5,
        "num_attention_heads": 2,
        "intermediate_size": 16,
        "max_position_embeddings": 64
    }))
    .expect("tiny config should parse")
}

/// Builds an encoder with random weights held in `varmap`; encoders built from the same
/// map share weights.
pub(crate) fn tiny_encoder(varmap: &VarMap, padding: PaddingMode) -> ProfileEncoder {
    let vb = VarBuilder::from_varmap(varmap, DType::F32, &Device::Cpu);
    let model = BertEncoder::new(vb, &tiny_bert_config()).expect("tiny encoder should build");
    let config = EncoderConfig::default().with_padding(padding);
    ProfileEncoder::from_parts(model, word_tokenizer(), Device::Cpu, config)
        .expect("encoder should assemble")
}
