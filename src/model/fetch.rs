//! Checkpoint download from the HuggingFace Hub.
//!
//! Resolves the configured weights and tokenizer files to local paths,
//! downloading them on first use. The hub client keeps a local cache, so a
//! pre-downloaded checkpoint never touches the network again.

use std::path::PathBuf;

use hf_hub::api::sync::{Api, ApiError};
use thiserror::Error;
use tracing::info;

use crate::config::ModelConfig;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to initialize hub client: {0}")]
    Client(#[source] ApiError),

    #[error("Failed to fetch {file} from {repo}: {source}")]
    Download {
        repo: String,
        file: String,
        #[source]
        source: ApiError,
    },
}

/// Local paths of the materialized checkpoint assets.
#[derive(Debug, Clone)]
pub struct ModelAssets {
    /// Path to the quantized GGUF weights.
    pub weights: PathBuf,

    /// Path to the tokenizer definition (tokenizer.json).
    pub tokenizer: PathBuf,
}

/// Fetch the weights and tokenizer named by the model configuration.
///
/// Both files must originate from the same named model; the configuration
/// pairs the GGUF build of the repo with the base repo's tokenizer.
pub fn fetch_assets(config: &ModelConfig) -> Result<ModelAssets, FetchError> {
    let api = Api::new().map_err(FetchError::Client)?;

    let weights = get_file(&api, &config.weights_repo, &config.weights_file)?;
    let tokenizer = get_file(&api, &config.tokenizer_repo, &config.tokenizer_file)?;

    info!(
        weights = %weights.display(),
        tokenizer = %tokenizer.display(),
        "Checkpoint assets materialized"
    );

    Ok(ModelAssets { weights, tokenizer })
}

fn get_file(api: &Api, repo: &str, file: &str) -> Result<PathBuf, FetchError> {
    info!(repo, file, "Resolving hub file");
    api.model(repo.to_string())
        .get(file)
        .map_err(|source| FetchError::Download {
            repo: repo.to_string(),
            file: file.to_string(),
            source,
        })
}
