//! The generation seam.
//!
//! [`ChatBackend`] is the narrow contract the responder drives: a rendered
//! prompt goes in, the full decoded sequence (prompt + continuation) comes
//! back. The production implementation wraps candle's quantized Llama
//! runtime; tests substitute scripted backends.

use candle_core::{Device, Tensor};
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::quantized_llama::ModelWeights;
use thiserror::Error;
use tokenizers::Tokenizer;
use tracing::debug;

use crate::config::GenerationConfig;
use crate::model::loader::EOS_TOKENS;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Tokenization failed: {0}")]
    Tokenize(String),

    #[error("Generation failed: {0}")]
    Generate(#[from] candle_core::Error),

    #[error("Decoding failed: {0}")]
    Decode(String),
}

/// Result of one full generation pass.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Decoded text of the full token sequence, prompt included, special
    /// tokens kept.
    pub text: String,

    /// Number of prompt tokens.
    pub prompt_tokens: usize,

    /// Number of newly generated tokens.
    pub completion_tokens: usize,
}

/// A text-completion primitive over a rendered prompt.
///
/// Implementations are not assumed reentrant; callers serialize access.
pub trait ChatBackend: Send {
    /// Run one full generation pass and decode the whole sequence.
    fn complete(
        &mut self,
        prompt: &str,
        params: &GenerationConfig,
    ) -> Result<Completion, BackendError>;
}

/// Candle-backed quantized Llama generation.
pub struct QuantizedLlama {
    model: ModelWeights,
    tokenizer: Tokenizer,
    device: Device,
    stop_tokens: Vec<u32>,
}

impl QuantizedLlama {
    /// Wrap loaded handles. The model's internal KV cache starts empty and
    /// is reset at the start of every call, so handles stay reusable across
    /// requests without cross-request state.
    pub fn new(model: ModelWeights, tokenizer: Tokenizer, device: Device) -> Self {
        let stop_tokens = EOS_TOKENS
            .iter()
            .filter_map(|t| tokenizer.token_to_id(t))
            .collect();
        Self {
            model,
            tokenizer,
            device,
            stop_tokens,
        }
    }
}

impl ChatBackend for QuantizedLlama {
    fn complete(
        &mut self,
        prompt: &str,
        params: &GenerationConfig,
    ) -> Result<Completion, BackendError> {
        // The rendered prompt carries its own special tokens.
        let encoding = self
            .tokenizer
            .encode(prompt, false)
            .map_err(|e| BackendError::Tokenize(e.to_string()))?;
        let prompt_tokens = encoding.get_ids().to_vec();
        let mut all_tokens = prompt_tokens.clone();

        if params.max_new_tokens == 0 {
            let text = self
                .tokenizer
                .decode(&all_tokens, false)
                .map_err(|e| BackendError::Decode(e.to_string()))?;
            return Ok(Completion {
                text,
                prompt_tokens: prompt_tokens.len(),
                completion_tokens: 0,
            });
        }

        let mut logits_processor =
            LogitsProcessor::new(params.seed, params.temperature, params.top_p);

        // Prefill at position 0 resets the model's KV cache; the cache is
        // then live for the incremental steps of this call only.
        let input = Tensor::new(prompt_tokens.as_slice(), &self.device)?.unsqueeze(0)?;
        let logits = self.model.forward(&input, 0)?.squeeze(0)?;
        let mut next_token = logits_processor.sample(&logits)?;
        all_tokens.push(next_token);

        let mut completion_tokens = 1;
        for index in 0..params.max_new_tokens.saturating_sub(1) {
            if self.stop_tokens.contains(&next_token) {
                break;
            }
            let input = Tensor::new(&[next_token], &self.device)?.unsqueeze(0)?;
            let logits = self
                .model
                .forward(&input, prompt_tokens.len() + index)?
                .squeeze(0)?;
            next_token = logits_processor.sample(&logits)?;
            all_tokens.push(next_token);
            completion_tokens += 1;
        }

        debug!(
            prompt_tokens = prompt_tokens.len(),
            completion_tokens, "Generation pass finished"
        );

        // Decode the full sequence with special tokens kept; the reply is
        // extracted downstream from the rendered structure.
        let text = self
            .tokenizer
            .decode(&all_tokens, false)
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        Ok(Completion {
            text,
            prompt_tokens: prompt_tokens.len(),
            completion_tokens,
        })
    }
}
