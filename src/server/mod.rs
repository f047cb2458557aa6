//! HTTP hosting for the predict operation.
//!
//! - [`api`]: request/response types, route handlers, and shared state

pub mod api;
