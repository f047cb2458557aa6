//! med-assist: a medical question-answering inference server.
//!
//! Loads a 4-bit quantized Llama 3 medical checkpoint once at startup,
//! then answers free-text health questions over a small HTTP API. Each
//! request composes a fixed system instruction plus the user question,
//! renders it through the model's chat format, runs generation, and
//! returns the assistant's reply.

pub mod config;
pub mod inference;
pub mod model;
pub mod server;
