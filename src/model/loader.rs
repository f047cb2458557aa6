//! One-shot model and tokenizer loading.
//!
//! Runs once at process start: selects the compute device, reads the 4-bit
//! GGUF checkpoint into memory, and loads the paired tokenizer. The returned
//! handles are treated as read-only for the life of the process. Every
//! failure here is startup-fatal; there is no per-request recovery path.

use std::path::Path;
use std::time::Instant;

use candle_core::quantized::gguf_file;
use candle_core::Device;
use candle_transformers::models::quantized_llama::ModelWeights;
use thiserror::Error;
use tokenizers::{PaddingParams, Tokenizer};
use tracing::info;

use crate::config::ModelConfig;
use crate::model::fetch::{fetch_assets, FetchError};

/// End-of-sequence token spellings, checked in order. The Llama 3 family
/// uses the first two; the third covers older sentencepiece vocabularies.
pub const EOS_TOKENS: &[&str] = &["<|eot_id|>", "<|end_of_text|>", "</s>"];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to open compute device: {0}")]
    Device(#[source] candle_core::Error),

    #[error("Failed to read GGUF checkpoint {path}: {source}")]
    Gguf {
        path: String,
        #[source]
        source: candle_core::Error,
    },

    #[error("Failed to build model weights: {0}")]
    Weights(#[source] candle_core::Error),

    #[error("Failed to load tokenizer {path}: {message}")]
    Tokenizer { path: String, message: String },

    #[error("Tokenizer defines no known end-of-sequence token")]
    NoEosToken,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Select the compute device.
///
/// Defaults to the first CUDA device; there is no silent CPU fallback, an
/// accelerator-less host fails startup unless `force_cpu` is set.
pub fn select_device(force_cpu: bool) -> Result<Device, LoadError> {
    if force_cpu {
        info!("Running on CPU (--cpu)");
        return Ok(Device::Cpu);
    }
    let device = Device::new_cuda(0).map_err(LoadError::Device)?;
    info!("Running on CUDA device 0");
    Ok(device)
}

/// Load the model and tokenizer named by the configuration, exactly once.
///
/// Fetches the checkpoint assets (network or local hub cache), loads the
/// quantized weights onto `device`, and prepares the tokenizer with its
/// padding token set to the end-of-sequence token.
pub fn init(config: &ModelConfig, device: &Device) -> Result<(ModelWeights, Tokenizer), LoadError> {
    let assets = fetch_assets(config)?;
    let model = load_weights(&assets.weights, device)?;
    let tokenizer = load_tokenizer(&assets.tokenizer)?;
    Ok((model, tokenizer))
}

/// Read a GGUF file into quantized Llama weights on the given device.
pub fn load_weights(path: &Path, device: &Device) -> Result<ModelWeights, LoadError> {
    let start = Instant::now();

    let mut file = std::fs::File::open(path)?;
    let content = gguf_file::Content::read(&mut file).map_err(|source| LoadError::Gguf {
        path: path.display().to_string(),
        source,
    })?;

    let tensor_count = content.tensor_infos.len();
    let model = ModelWeights::from_gguf(content, &mut file, device).map_err(LoadError::Weights)?;

    info!(
        path = %path.display(),
        tensors = tensor_count,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Model weights loaded"
    );

    Ok(model)
}

/// Load the tokenizer and set its padding token equal to end-of-sequence.
///
/// The base checkpoint defines no explicit padding token; padded encoding
/// would fail without this assignment.
pub fn load_tokenizer(path: &Path) -> Result<Tokenizer, LoadError> {
    let mut tokenizer = Tokenizer::from_file(path).map_err(|e| LoadError::Tokenizer {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let (eos_token, eos_id) = EOS_TOKENS
        .iter()
        .find_map(|t| tokenizer.token_to_id(t).map(|id| (*t, id)))
        .ok_or(LoadError::NoEosToken)?;

    let padding = PaddingParams {
        pad_id: eos_id,
        pad_token: eos_token.to_string(),
        ..PaddingParams::default()
    };
    tokenizer.with_padding(Some(padding));

    info!(
        path = %path.display(),
        vocab = tokenizer.get_vocab_size(true),
        eos_token,
        eos_id,
        "Tokenizer loaded, pad token set to EOS"
    );

    Ok(tokenizer)
}
