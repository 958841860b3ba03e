//! # tts-server
//!
//! HTTP server for the text-to-audio service.
//!
//! Provides:
//! - `POST /synthesize` (JSON, or SSE with `Accept: text/event-stream`)
//! - `POST /synthesize/stream` (always SSE)
//! - Generated audio under the configured public prefix
//! - Health, info and Prometheus metrics endpoints

pub mod server;
pub mod service;

pub use server::{AppState, ServerConfig, TtsServer, router};
pub use service::ApiError;
