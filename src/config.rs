//! Runtime configuration for med-assist.
//!
//! Configuration can be loaded from a JSON file or constructed programmatically.
//! The checkpoint identifiers, generation limits, and server knobs all live here.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "med-assist", about = "Medical question-answering inference server")]
pub struct Cli {
    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// HTTP listen address (overrides the config file).
    #[arg(long)]
    pub listen: Option<String>,

    /// Run on CPU instead of requiring a CUDA device.
    #[arg(long)]
    pub cpu: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,

    /// Model configuration.
    pub model: ModelConfig,

    /// Generation settings.
    pub generation: GenerationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            model: ModelConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (e.g. "0.0.0.0:8080").
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Model-related settings.
///
/// The defaults name the Medical-Llama3-8B checkpoint: 4-bit quantized
/// weights from the GGUF build of the repo, tokenizer from the base repo
/// (the two must originate from the same named model).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// HuggingFace repo holding the quantized weights.
    pub weights_repo: String,

    /// GGUF file name inside the weights repo.
    pub weights_file: String,

    /// HuggingFace repo holding the tokenizer.
    pub tokenizer_repo: String,

    /// Tokenizer file name inside the tokenizer repo.
    pub tokenizer_file: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights_repo: "ruslanmv/Medical-Llama3-8B-GGUF".to_string(),
            weights_file: "Medical-Llama3-8B.Q4_K_M.gguf".to_string(),
            tokenizer_repo: "ruslanmv/Medical-Llama3-8B".to_string(),
            tokenizer_file: "tokenizer.json".to_string(),
        }
    }
}

/// Generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Hard cap on newly produced tokens per request.
    pub max_new_tokens: usize,

    /// Sampling temperature (None = greedy decoding).
    pub temperature: Option<f64>,

    /// Top-p (nucleus) sampling threshold.
    pub top_p: Option<f64>,

    /// RNG seed for sampling.
    pub seed: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: 1000,
            temperature: None,
            top_p: None,
            seed: 299792458,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&data)?;
            Ok(config)
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }
}
