//! # tts-core
//!
//! Core types, traits, and error definitions for the text-to-audio service.
//!
//! This crate provides the foundational abstractions used across all other crates
//! in the workspace, including:
//!
//! - Request and text types (`InputRequest`, `ProcessedText`, `Voice`, `Lang`)
//! - Audio types (`AudioChunk`, `AudioBuffer`)
//! - The `SpeechModel` trait implemented by model backends
//! - Unified error handling via `TtsError`
//! - Layered configuration (`Settings`)

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{Settings, load_settings};
pub use error::{TtsError, TtsResult};
pub use traits::{GenerationOptions, SpeechModel};
pub use types::{AudioBuffer, AudioChunk, InputRequest, Lang, ProcessedText, Voice};
