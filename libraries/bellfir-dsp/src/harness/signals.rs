//! Test signal generation
//!
//! Provides the standard signals used to exercise a filter design:
//! - Gaussian white noise (seeded, peak-normalized)
//! - Sine tones
//! - Impulses
//!
//! Random signals take an explicit seed so that every run of a test sees
//! the same samples.

use bellfir_core::{AudioBuffer, BellError, Result, SampleRate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use std::f64::consts::PI;

/// Peak amplitude of the reference noise signal
pub const REFERENCE_NOISE_PEAK: f32 = 0.5;

/// Amplitude of the reference sine tone
pub const REFERENCE_SINE_AMPLITUDE: f32 = 0.5;

/// Number of whole samples in `duration` seconds at `sample_rate`
pub fn sample_count(sample_rate: SampleRate, duration: f64) -> usize {
    (f64::from(sample_rate.as_hz()) * duration.max(0.0)) as usize
}

/// Generate Gaussian white noise scaled so its absolute peak equals `peak`
///
/// # Arguments
/// * `num_samples` - Number of samples to generate
/// * `peak` - Absolute peak of the result
/// * `seed` - Seed for the random generator
pub fn white_noise(num_samples: usize, peak: f32, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let raw: Vec<f64> = (0..num_samples)
        .map(|_| StandardNormal.sample(&mut rng))
        .collect();

    let max = raw.iter().fold(0.0f64, |m, s| m.max(s.abs()));
    if max == 0.0 {
        return vec![0.0; num_samples];
    }
    let scale = f64::from(peak) / max;
    raw.into_iter().map(|s| (s * scale) as f32).collect()
}

/// Generate a mono white noise buffer
///
/// # Arguments
/// * `sample_rate` - Sample rate of the buffer
/// * `duration` - Duration in seconds
/// * `peak` - Absolute peak of the result
/// * `seed` - Seed for the random generator
pub fn white_noise_buffer(
    sample_rate: SampleRate,
    duration: f64,
    peak: f32,
    seed: u64,
) -> AudioBuffer {
    let samples = white_noise(sample_count(sample_rate, duration), peak, seed);
    AudioBuffer::mono(samples, sample_rate)
}

/// Generate a sine tone
///
/// # Arguments
/// * `frequency` - Frequency in Hz
/// * `sample_rate` - Sample rate in Hz
/// * `duration` - Duration in seconds
/// * `amplitude` - Peak amplitude
/// * `channels` - Number of identical interleaved channels
///
/// # Errors
/// Returns `BellError::InvalidParameter` if `channels` is zero or the
/// frequency is negative or not finite
pub fn sine_tone(
    frequency: f64,
    sample_rate: SampleRate,
    duration: f64,
    amplitude: f32,
    channels: u16,
) -> Result<AudioBuffer> {
    if channels == 0 {
        return Err(BellError::invalid_parameter("channels must be at least 1"));
    }
    if !frequency.is_finite() || frequency < 0.0 {
        return Err(BellError::invalid_parameter(format!(
            "tone frequency must be non-negative, got {frequency}"
        )));
    }

    let num_samples = sample_count(sample_rate, duration);
    let rate = f64::from(sample_rate.as_hz());
    let mut samples = Vec::with_capacity(num_samples * usize::from(channels));
    for i in 0..num_samples {
        let t = i as f64 / rate;
        let sample = (2.0 * PI * frequency * t).sin() as f32 * amplitude;
        samples.extend(std::iter::repeat(sample).take(usize::from(channels)));
    }

    AudioBuffer::new(samples, sample_rate, channels)
}

/// Generate a single-sample spike
///
/// Returns `len` zeros with `amplitude` at `position` (if in range).
pub fn impulse(len: usize, position: usize, amplitude: f32) -> Vec<f32> {
    let mut samples = vec![0.0; len];
    if let Some(sample) = samples.get_mut(position) {
        *sample = amplitude;
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_noise_is_peak_normalized() {
        let noise = white_noise(10_000, 0.5, 7);
        assert_eq!(noise.len(), 10_000);
        let peak = noise.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!((peak - 0.5).abs() < 1e-6);
    }

    #[test]
    fn white_noise_is_reproducible() {
        assert_eq!(white_noise(512, 0.5, 42), white_noise(512, 0.5, 42));
        assert_ne!(white_noise(512, 0.5, 42), white_noise(512, 0.5, 43));
    }

    #[test]
    fn white_noise_is_roughly_zero_mean() {
        let noise = white_noise(44_100, 0.5, 1);
        let mean = noise.iter().map(|&s| f64::from(s)).sum::<f64>() / noise.len() as f64;
        assert!(mean.abs() < 0.01, "mean {mean}");
    }

    #[test]
    fn empty_noise() {
        assert!(white_noise(0, 0.5, 0).is_empty());
    }

    #[test]
    fn noise_buffer_length_follows_duration() {
        let buffer = white_noise_buffer(SampleRate::CD_QUALITY, 3.0, 0.5, 0);
        assert_eq!(buffer.frames(), 132_300);
        assert_eq!(buffer.channels(), 1);
    }

    #[test]
    fn sine_tone_generation() {
        let tone = sine_tone(440.0, SampleRate::CD_QUALITY, 1.0, 0.5, 2).unwrap();
        assert_eq!(tone.frames(), 44_100);
        assert_eq!(tone.channels(), 2);
        assert!(tone.peak() > 0.49 && tone.peak() <= 0.5);
        assert_eq!(tone.channel(0), tone.channel(1));
    }

    #[test]
    fn sine_tone_rejects_bad_input() {
        assert!(sine_tone(440.0, SampleRate::CD_QUALITY, 1.0, 0.5, 0).is_err());
        assert!(sine_tone(f64::NAN, SampleRate::CD_QUALITY, 1.0, 0.5, 1).is_err());
    }

    #[test]
    fn impulse_generation() {
        let spike = impulse(16, 8, 1.0);
        assert_eq!(spike.iter().filter(|&&s| s != 0.0).count(), 1);
        assert_eq!(spike[8], 1.0);
        assert!(impulse(4, 10, 1.0).iter().all(|&s| s == 0.0));
    }
}
