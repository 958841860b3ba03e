//! # runtime
//!
//! Request orchestration for the text-to-audio service.
//!
//! This crate provides:
//! - Document loading from URLs or raw text (`TextLoader`)
//! - Sentence-by-sentence synthesis over a shared model (`Synthesizer`)
//! - The per-request pipeline with streamed progress (`TtsPipeline`)
//! - Structured logging and metrics

pub mod loader;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod synthesizer;

pub use loader::{TextLoader, USER_AGENT};
pub use metrics::TtsMetrics;
pub use pipeline::{ProgressEvent, ProgressStream, SynthesizeResponse, TtsPipeline};
pub use synthesizer::{SynthesisSession, Synthesizer};
