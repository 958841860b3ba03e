//! Info command implementation.

use tts_core::Settings;

/// Run the info command.
pub fn run(settings: &Settings) {
    println!("text2audio");
    println!("==========");
    println!();
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    println!();
    println!("Model:");
    println!("  Pretrained:  {}", settings.huggingface.tts_model);
    println!("  Backend:     {:?}", settings.model.backend);
    if let Some(endpoint) = &settings.model.endpoint {
        println!("  Endpoint:    {endpoint}");
    }
    println!("  Sample rate: {} Hz", settings.model.sample_rate);
    println!("  Voice:       {}", settings.huggingface.voice);
    println!("  Max length:  {}", settings.huggingface.max_length);
    println!();
    println!("Output:");
    println!("  Directory:   {}", settings.output.dir.display());
    println!("  Served at:   {}", settings.output.public_prefix);
    println!();
    println!("Crates:");
    println!("  tts-core: Core types, traits and configuration");
    println!("  text-normalizer: Article extraction and speech normalization (PT/EN)");
    println!("  speech-model: Mock and remote speech model backends");
    println!("  audio-writer: WAV encoding and output files");
    println!("  runtime: Loading, synthesis and progress streaming");
    println!("  tts-server: HTTP server");
    println!("  tts-cli: This CLI tool");
}
