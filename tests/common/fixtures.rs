//! On-disk model fixtures: a tiny BERT checkpoint, its tokenizer, and XGBoost JSON models.

use std::path::{Path, PathBuf};

use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use serde_json::{Value, json};

use leadscore::embedding::{BertEncoder, BertEncoderConfig};

pub const TINY_HIDDEN_SIZE: usize = 8;
pub const TINY_NUM_LAYERS: usize = 5;

const SPECIAL_TOKENS: &[&str] = &["[PAD]", "[UNK]", "[CLS]", "[SEP]"];

pub const WORDS: &[&str] = &[
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
    "sales",
    "director",
    ".",
];

/// Paths of a model bundle written by [`write_tiny_bundle`].
pub struct ModelBundle {
    pub encoder_dir: PathBuf,
    pub tokenizer_dir: PathBuf,
    pub booster_path: PathBuf,
}

fn tiny_config_json() -> Value {
    json!({
        "architectures": ["BertModel"],
        "model_type": "bert",
        "vocab_size": SPECIAL_TOKENS.len() + WORDS.len(),
        "hidden_size": TINY_HIDDEN_SIZE,
        "num_hidden_layers": TINY_NUM_LAYERS,
        "num_attention_heads": 2,
        "intermediate_size": 16,
        "hidden_act": "gelu",
        "max_position_embeddings": 64,
        "type_vocab_size": 2,
        "layer_norm_eps": 1e-12
    })
}

fn tokenizer_json() -> Value {
    let mut vocab = serde_json::Map::new();
    for (id, token) in SPECIAL_TOKENS.iter().chain(WORDS.iter()).enumerate() {
        vocab.insert(token.to_string(), json!(id));
    }

    json!({
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
    })
}

/// Writes `config.json` and randomly initialized `model.safetensors` into `dir`.
pub fn write_tiny_encoder(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    let config_json = tiny_config_json();
    std::fs::write(dir.join("config.json"), config_json.to_string()).unwrap();

    let config: BertEncoderConfig = serde_json::from_value(config_json).unwrap();
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    BertEncoder::new(vb, &config).expect("tiny encoder should build");
    varmap.save(dir.join("model.safetensors")).unwrap();
}

/// Writes `tokenizer.json` into `dir`.
pub fn write_tokenizer(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("tokenizer.json"), tokenizer_json().to_string()).unwrap();
}

/// Writes the same vocabulary as [`write_tokenizer`], saved the way a slow BERT
/// tokenizer saves it: `vocab.txt` plus `tokenizer_config.json`, no `tokenizer.json`.
pub fn write_vocab_tokenizer(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    let vocab: Vec<&str> = SPECIAL_TOKENS.iter().chain(WORDS.iter()).copied().collect();
    std::fs::write(dir.join("vocab.txt"), vocab.join("\n")).unwrap();
    let config = json!({
        "do_lower_case": true,
        "tokenize_chinese_chars": true,
        "strip_accents": null,
        "model_max_length": 512,
        "tokenizer_class": "BertTokenizer"
    });
    std::fs::write(dir.join("tokenizer_config.json"), config.to_string()).unwrap();
}

fn stump(feature: usize, threshold: f32, left: f32, right: f32) -> Value {
    json!({
        "tree_param": {"num_nodes": "3", "size_leaf_vector": "1", "num_feature": "0", "num_deleted": "0"},
        "left_children": [1, -1, -1],
        "right_children": [2, -1, -1],
        "split_indices": [feature, 0, 0],
        "split_conditions": [threshold, left, right],
        "default_left": [1, 0, 0],
        "split_type": [0, 0, 0],
        "base_weights": [0.0, 0.0, 0.0],
        "loss_changes": [0.0, 0.0, 0.0],
        "sum_hessian": [1.0, 1.0, 1.0],
        "parents": [2147483647, 0, 0],
        "categories": [],
        "categories_nodes": [],
        "categories_segments": [],
        "categories_sizes": [],
        "id": 0
    })
}

/// `binary:logistic` model with one stump per feature, as written by `save_model`.
pub fn logistic_booster_json(num_features: usize) -> Value {
    let trees: Vec<Value> = (0..num_features)
        .map(|i| {
            let weight = 0.1 * (i as f32 + 1.0);
            stump(i, 0.0, -weight, weight)
        })
        .collect();
    let tree_info = vec![0; trees.len()];

    json!({
        "learner": {
            "attributes": {},
            "feature_names": [],
            "feature_types": [],
            "gradient_booster": {
                "name": "gbtree",
                "model": {
                    "gbtree_model_param": {
                        "num_parallel_tree": "1",
                        "num_trees": trees.len().to_string()
                    },
                    "iteration_indptr": [],
                    "tree_info": tree_info,
                    "trees": trees
                }
            },
            "learner_model_param": {
                "base_score": "5E-1",
                "boost_from_average": "1",
                "num_class": "0",
                "num_feature": num_features.to_string(),
                "num_target": "1"
            },
            "objective": {
                "name": "binary:logistic",
                "reg_loss_param": {"scale_pos_weight": "1"}
            }
        },
        "version": [2, 1, 0]
    })
}

pub fn write_booster(path: &Path, num_features: usize) {
    std::fs::write(path, logistic_booster_json(num_features).to_string()).unwrap();
}

/// Writes encoder, tokenizer and a matching booster under `root`.
pub fn write_tiny_bundle(root: &Path) -> ModelBundle {
    let bundle = ModelBundle {
        encoder_dir: root.join("bert_model"),
        tokenizer_dir: root.join("bert_tokenizer"),
        booster_path: root.join("xgboost_model.json"),
    };
    write_tiny_encoder(&bundle.encoder_dir);
    write_tokenizer(&bundle.tokenizer_dir);
    write_booster(&bundle.booster_path, TINY_HIDDEN_SIZE);
    bundle
}
