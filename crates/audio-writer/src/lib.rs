//! # audio-writer
//!
//! Persists synthesized waveforms.
//!
//! - 16-bit PCM WAV encoding and decoding ([`wav`])
//! - Output directory management with collision-free file names ([`output`])

pub mod output;
pub mod wav;

pub use output::{AudioFormat, AudioWriter, FILE_PREFIX, WrittenAudio};
pub use wav::{decode_wav, encode_wav, read_wav, silence, to_pcm16, write_wav};
