//! File output: 16-bit PCM WAV and JSON documents

use anyhow::{Context, Result};
use bellfir_core::AudioBuffer;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Full-scale value for float to 16-bit conversion
const PCM16_SCALE: f32 = 32767.0;

/// Convert a float sample to 16-bit PCM
///
/// Scales by 32767, clamps to the `i16` range and truncates toward zero.
pub fn to_pcm16(sample: f32) -> i16 {
    (sample * PCM16_SCALE).clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16
}

/// Write an interleaved buffer as a 16-bit PCM WAV file
pub fn write_wav_i16(path: &Path, buffer: &AudioBuffer) -> Result<()> {
    let spec = hound::WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate().as_hz(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for &sample in buffer.samples() {
        writer.write_sample(to_pcm16(sample))?;
    }
    writer
        .finalize()
        .with_context(|| format!("failed to finish {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        frames = buffer.frames(),
        channels = buffer.channels(),
        "wrote wav"
    );
    Ok(())
}

/// Write any serializable value as pretty-printed JSON
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("failed to write {}", path.display()))?;
    writer.flush()?;

    tracing::info!(path = %path.display(), "wrote json");
    Ok(())
}
