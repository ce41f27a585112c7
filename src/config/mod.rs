//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `LEADSCORE_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_BOOSTER_PATH, DEFAULT_ENCODER_PATH, DEFAULT_MAX_SEQ_LEN, DEFAULT_PORT,
    DEFAULT_TOKENIZER_PATH,
};
use crate::embedding::{EncoderConfig, PaddingMode};

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `LEADSCORE_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `5000`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Encoder directory (`config.json` + weights). Default: `./bert_model`.
    pub encoder_path: PathBuf,

    /// Tokenizer directory (`tokenizer.json`, or `vocab.txt` + `tokenizer_config.json`).
    /// Default: `./bert_tokenizer`.
    pub tokenizer_path: PathBuf,

    /// XGBoost JSON model file. Default: `./xgboost_model.json`.
    pub booster_path: PathBuf,

    /// Truncation length in tokens, special tokens included. Default: `32`.
    pub max_seq_len: usize,

    /// Pad every input to `max_seq_len` instead of to its own length. Default: `false`.
    pub pad_to_max: bool,

    /// Run the deterministic stub encoder (no encoder/tokenizer files). Default: `false`.
    pub stub_encoder: bool,

    /// Attach a permissive CORS layer to the router. Default: `false`.
    pub cors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            encoder_path: PathBuf::from(DEFAULT_ENCODER_PATH),
            tokenizer_path: PathBuf::from(DEFAULT_TOKENIZER_PATH),
            booster_path: PathBuf::from(DEFAULT_BOOSTER_PATH),
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            pad_to_max: false,
            stub_encoder: false,
            cors: false,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "LEADSCORE_PORT";
    const ENV_BIND_ADDR: &'static str = "LEADSCORE_BIND_ADDR";
    const ENV_ENCODER_PATH: &'static str = "LEADSCORE_ENCODER_PATH";
    const ENV_TOKENIZER_PATH: &'static str = "LEADSCORE_TOKENIZER_PATH";
    const ENV_BOOSTER_PATH: &'static str = "LEADSCORE_BOOSTER_PATH";
    const ENV_MAX_SEQ_LEN: &'static str = "LEADSCORE_MAX_SEQ_LEN";
    const ENV_PAD_TO_MAX: &'static str = "LEADSCORE_PAD_TO_MAX";
    const ENV_STUB_ENCODER: &'static str = "LEADSCORE_STUB_ENCODER";
    const ENV_CORS: &'static str = "LEADSCORE_CORS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let encoder_path = Self::parse_path_from_env(Self::ENV_ENCODER_PATH, defaults.encoder_path);
        let tokenizer_path =
            Self::parse_path_from_env(Self::ENV_TOKENIZER_PATH, defaults.tokenizer_path);
        let booster_path = Self::parse_path_from_env(Self::ENV_BOOSTER_PATH, defaults.booster_path);
        let max_seq_len = Self::parse_max_seq_len_from_env(defaults.max_seq_len)?;
        let pad_to_max = Self::parse_bool_from_env(Self::ENV_PAD_TO_MAX, defaults.pad_to_max)?;
        let stub_encoder =
            Self::parse_bool_from_env(Self::ENV_STUB_ENCODER, defaults.stub_encoder)?;
        let cors = Self::parse_bool_from_env(Self::ENV_CORS, defaults.cors)?;

        Ok(Self {
            port,
            bind_addr,
            encoder_path,
            tokenizer_path,
            booster_path,
            max_seq_len,
            pad_to_max,
            stub_encoder,
            cors,
        })
    }

    /// Validates paths and basic invariants.
    ///
    /// Encoder and tokenizer paths are not checked in stub mode.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_seq_len < 2 {
            return Err(ConfigError::InvalidMaxSeqLen {
                value: self.max_seq_len.to_string(),
            });
        }

        if !self.booster_path.exists() {
            return Err(ConfigError::PathNotFound {
                path: self.booster_path.clone(),
            });
        }
        if !self.booster_path.is_file() {
            return Err(ConfigError::NotAFile {
                path: self.booster_path.clone(),
            });
        }

        if self.stub_encoder {
            return Ok(());
        }

        if !self.encoder_path.exists() {
            return Err(ConfigError::PathNotFound {
                path: self.encoder_path.clone(),
            });
        }
        if !self.encoder_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.encoder_path.clone(),
            });
        }

        if !self.tokenizer_path.exists() {
            return Err(ConfigError::PathNotFound {
                path: self.tokenizer_path.clone(),
            });
        }

        Ok(())
    }

    /// Address the server binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// Builds the encoder configuration described by this server configuration.
    pub fn encoder_config(&self) -> EncoderConfig {
        if self.stub_encoder {
            return EncoderConfig::stub().with_max_seq_len(self.max_seq_len);
        }

        let padding = if self.pad_to_max {
            PaddingMode::Fixed
        } else {
            PaddingMode::Longest
        };

        EncoderConfig::new(&self.encoder_path, &self.tokenizer_path)
            .with_max_seq_len(self.max_seq_len)
            .with_padding(padding)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_max_seq_len_from_env(default: usize) -> Result<usize, ConfigError> {
        match env::var(Self::ENV_MAX_SEQ_LEN) {
            Ok(value) => {
                let len: usize =
                    value
                        .trim()
                        .parse()
                        .map_err(|e| ConfigError::MaxSeqLenParseError {
                            value: value.clone(),
                            source: e,
                        })?;

                if len < 2 {
                    return Err(ConfigError::InvalidMaxSeqLen { value });
                }

                Ok(len)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        let Ok(value) = env::var(var_name) else {
            return Ok(default);
        };

        match value.trim().to_ascii_lowercase().as_str() {
            "" => Ok(default),
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidBool {
                name: var_name,
                value,
            }),
        }
    }
}
