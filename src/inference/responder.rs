//! Per-request orchestration: compose, render, generate, extract.
//!
//! The responder holds the process-wide backend handle and produces exactly
//! one answer string per call. Nothing is cached across calls; every request
//! re-runs full generation.

use tracing::{debug, info};

use crate::config::GenerationConfig;
use crate::inference::backend::{BackendError, ChatBackend};
use crate::inference::chat::{conversation_for, extract_answer, render_prompt};

/// Answers questions against the loaded model.
pub struct Responder {
    backend: Box<dyn ChatBackend>,
    generation: GenerationConfig,
}

impl Responder {
    pub fn new(backend: Box<dyn ChatBackend>, generation: GenerationConfig) -> Self {
        Self {
            backend,
            generation,
        }
    }

    /// Answer a single question.
    ///
    /// Composes the fixed two-turn conversation, renders it through the chat
    /// format, runs one capped generation pass, and extracts the assistant
    /// reply from the decoded output. Errors surface to the caller with no
    /// partial answer; the responder stays usable for subsequent calls.
    pub fn answer(&mut self, question: &str) -> Result<String, BackendError> {
        let turns = conversation_for(question);
        let prompt = render_prompt(&turns);
        debug!(prompt_chars = prompt.len(), "Prompt rendered");

        let completion = self.backend.complete(&prompt, &self.generation)?;
        info!(
            prompt_tokens = completion.prompt_tokens,
            completion_tokens = completion.completion_tokens,
            "Generation complete"
        );

        Ok(extract_answer(&completion.text))
    }
}
