use std::io;
use std::path::{Path, PathBuf};

use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::debug;

use super::encoder::PaddingMode;

const TOKENIZER_FILE: &str = "tokenizer.json";
const VOCAB_FILE: &str = "vocab.txt";
const TOKENIZER_CONFIG_FILE: &str = "tokenizer_config.json";

/// Resolves a tokenizer directory to the file to load from.
///
/// A directory yields its `tokenizer.json`, or `vocab.txt` when only a WordPiece
/// vocabulary was saved. A file path is returned as is.
pub fn resolve_tokenizer_path(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    if !path.is_dir() {
        return None;
    }

    [TOKENIZER_FILE, VOCAB_FILE]
        .iter()
        .map(|name| path.join(name))
        .find(|candidate| candidate.is_file())
}

/// Loads a tokenizer from a directory, a `tokenizer.json` file or a `vocab.txt` file.
pub fn load_tokenizer(path: &Path) -> io::Result<Tokenizer> {
    let tokenizer_path = resolve_tokenizer_path(path).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!(
                "no {} or {} found at {}",
                TOKENIZER_FILE,
                VOCAB_FILE,
                path.display()
            ),
        )
    })?;

    if tokenizer_path
        .file_name()
        .is_some_and(|name| name == std::ffi::OsStr::new(VOCAB_FILE))
    {
        debug!(vocab = %tokenizer_path.display(), "Building WordPiece tokenizer from vocab.txt");
        return wordpiece_tokenizer(&tokenizer_path);
    }

    Tokenizer::from_file(&tokenizer_path).map_err(io::Error::other)
}

/// Normalizer flags a saved BERT tokenizer records in `tokenizer_config.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BertNormalization {
    lowercase: bool,
    handle_chinese_chars: bool,
    strip_accents: Option<bool>,
}

impl Default for BertNormalization {
    fn default() -> Self {
        Self {
            lowercase: true,
            handle_chinese_chars: true,
            strip_accents: None,
        }
    }
}

fn read_normalization(dir: Option<&Path>) -> io::Result<BertNormalization> {
    let defaults = BertNormalization::default();
    let Some(config_path) = dir
        .map(|d| d.join(TOKENIZER_CONFIG_FILE))
        .filter(|p| p.is_file())
    else {
        return Ok(defaults);
    };

    let raw = std::fs::read_to_string(&config_path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let flag = |key: &str| value.get(key).and_then(serde_json::Value::as_bool);
    Ok(BertNormalization {
        lowercase: flag("do_lower_case").unwrap_or(defaults.lowercase),
        handle_chinese_chars: flag("tokenize_chinese_chars")
            .unwrap_or(defaults.handle_chinese_chars),
        strip_accents: flag("strip_accents"),
    })
}

fn special_token(tokenizer: &Tokenizer, token: &str) -> io::Result<(String, u32)> {
    tokenizer
        .token_to_id(token)
        .map(|id| (token.to_string(), id))
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} is missing from the vocabulary", token),
            )
        })
}

/// Builds a BERT WordPiece tokenizer from `vocab.txt` and its sibling `tokenizer_config.json`.
fn wordpiece_tokenizer(vocab_path: &Path) -> io::Result<Tokenizer> {
    let normalization = read_normalization(vocab_path.parent())?;
    let vocab = vocab_path.to_str().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("vocab path is not valid UTF-8: {}", vocab_path.display()),
        )
    })?;

    let wordpiece = WordPiece::from_file(vocab)
        .unk_token("[UNK]".to_string())
        .build()
        .map_err(|e| io::Error::other(format!("Failed to build WordPiece model: {}", e)))?;

    let mut tokenizer = Tokenizer::new(wordpiece);
    tokenizer.with_normalizer(Some(BertNormalizer::new(
        true,
        normalization.handle_chinese_chars,
        normalization.strip_accents,
        normalization.lowercase,
    )));
    tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));

    let sep = special_token(&tokenizer, "[SEP]")?;
    let cls = special_token(&tokenizer, "[CLS]")?;
    tokenizer.with_post_processor(Some(BertProcessing::new(sep, cls)));

    Ok(tokenizer)
}

/// Enables truncation at `max_len` tokens and padding per `padding`.
///
/// `max_len` counts the special tokens added by the post-processor. Pad id and pad token
/// are taken from the tokenizer's own padding settings when present, otherwise from
/// `[PAD]` in the vocabulary (id 0 if absent).
pub fn configure_tokenizer(
    tokenizer: &mut Tokenizer,
    max_len: usize,
    padding: PaddingMode,
) -> io::Result<()> {
    let truncation = TruncationParams {
        max_length: max_len,
        ..Default::default()
    };

    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| io::Error::other(format!("Failed to configure truncation: {}", e)))?;

    let (pad_id, pad_token) = match tokenizer.get_padding() {
        Some(existing) => (existing.pad_id, existing.pad_token.clone()),
        None => {
            let pad_token = "[PAD]".to_string();
            let pad_id = tokenizer.token_to_id(&pad_token).unwrap_or(0);
            (pad_id, pad_token)
        }
    };

    let strategy = match padding {
        PaddingMode::Longest => PaddingStrategy::BatchLongest,
        PaddingMode::Fixed => PaddingStrategy::Fixed(max_len),
    };

    tokenizer.with_padding(Some(PaddingParams {
        strategy,
        pad_id,
        pad_token,
        ..Default::default()
    }));

    Ok(())
}
