//! WAV file I/O utilities.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use tts_core::{AudioBuffer, TtsError, TtsResult};

fn wav_error(e: hound::Error) -> TtsError {
    match e {
        hound::Error::IoError(io) => TtsError::Io(io),
        other => TtsError::audio_encode(other.to_string()),
    }
}

/// Convert a float sample in [-1, 1] to signed 16-bit PCM.
pub fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// `secs` seconds of silence at `sample_rate`.
pub fn silence(sample_rate: u32, secs: f32) -> Vec<f32> {
    vec![0.0; (sample_rate as f32 * secs.max(0.0)) as usize]
}

fn spec_for(buffer: &AudioBuffer) -> TtsResult<WavSpec> {
    if buffer.channels == 0 {
        return Err(TtsError::audio_encode("audio buffer has zero channels"));
    }
    if buffer.sample_rate == 0 {
        return Err(TtsError::audio_encode("audio buffer has zero sample rate"));
    }
    Ok(WavSpec {
        channels: buffer.channels,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    })
}

fn write_samples<W: Write + Seek>(writer: W, buffer: &AudioBuffer) -> TtsResult<()> {
    let mut writer = WavWriter::new(writer, spec_for(buffer)?).map_err(wav_error)?;
    for &sample in &buffer.samples {
        writer.write_sample(to_pcm16(sample)).map_err(wav_error)?;
    }
    writer.finalize().map_err(wav_error)
}

/// Write a buffer to a 16-bit PCM WAV file.
pub fn write_wav(path: impl AsRef<Path>, buffer: &AudioBuffer) -> TtsResult<()> {
    let file = std::io::BufWriter::new(std::fs::File::create(path.as_ref())?);
    write_samples(file, buffer)
}

/// Encode a buffer as an in-memory 16-bit PCM WAV file.
pub fn encode_wav(buffer: &AudioBuffer) -> TtsResult<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_samples(&mut cursor, buffer)?;
    Ok(cursor.into_inner())
}

fn read_samples<R: Read>(reader: WavReader<R>) -> TtsResult<AudioBuffer> {
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()
                .map_err(wav_error)?
        }
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(wav_error)?,
    };

    Ok(AudioBuffer {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Decode an in-memory WAV file.
pub fn decode_wav(bytes: &[u8]) -> TtsResult<AudioBuffer> {
    read_samples(WavReader::new(Cursor::new(bytes)).map_err(wav_error)?)
}

/// Read audio samples from a WAV file.
pub fn read_wav(path: impl AsRef<Path>) -> TtsResult<AudioBuffer> {
    read_samples(WavReader::open(path.as_ref()).map_err(wav_error)?)
}
