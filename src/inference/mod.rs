//! Question answering over the loaded model.
//!
//! - [`chat`]: conversation turns, chat-format prompt rendering, and reply
//!   extraction from decoded output
//! - [`backend`]: the generation seam — the candle-backed implementation and
//!   the trait it sits behind
//! - [`responder`]: per-request orchestration (compose, render, generate,
//!   extract)

pub mod backend;
pub mod chat;
pub mod responder;
