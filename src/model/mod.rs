//! Checkpoint acquisition and loading.
//!
//! - [`fetch`]: materializes the quantized weights and tokenizer from the
//!   HuggingFace Hub (or its local cache)
//! - [`loader`]: one-shot load of the GGUF model and paired tokenizer,
//!   performed once at process start

pub mod fetch;
pub mod loader;
