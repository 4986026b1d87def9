//! Audio-related types

use crate::error::{BellError, Result};
use serde::{Deserialize, Serialize};

/// Sample rate in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleRate(pub u32);

impl SampleRate {
    /// 44.1 kHz
    pub const CD_QUALITY: Self = Self(44_100);
    /// 48 kHz
    pub const DVD_QUALITY: Self = Self(48_000);
    /// 96 kHz
    pub const HIGH_RES_96: Self = Self(96_000);

    /// Create a new sample rate
    #[must_use]
    pub fn new(hz: u32) -> Self {
        Self(hz)
    }

    /// Get the sample rate as Hz
    pub fn as_hz(&self) -> u32 {
        self.0
    }

    /// Nyquist frequency in Hz
    pub fn nyquist(&self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

/// Audio buffer of interleaved samples
///
/// Samples are f32, nominally in [-1.0, 1.0].
/// Interleaved format: [L, R, L, R, ...] for stereo.
/// The sample count is always a whole number of frames.
///
/// The sample rate is carried as a label and not validated here, so a zero
/// rate is accepted. Filter design and Welch analysis reject it with
/// `BellError::InvalidParameter`, and filtering rejects any rate that
/// differs from the filter's.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: SampleRate,
    channels: u16,
}

impl AudioBuffer {
    /// Create a buffer from interleaved samples
    ///
    /// # Errors
    /// Returns `BellError::InvalidBuffer` if `channels` is zero or the sample
    /// count is not a multiple of `channels`
    pub fn new(samples: Vec<f32>, sample_rate: SampleRate, channels: u16) -> Result<Self> {
        if channels == 0 {
            return Err(BellError::invalid_buffer("channel count must be at least 1"));
        }
        if samples.len() % usize::from(channels) != 0 {
            return Err(BellError::invalid_buffer(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                channels
            )));
        }

        Ok(Self {
            samples,
            sample_rate,
            channels,
        })
    }

    /// Create a mono buffer
    pub fn mono(samples: Vec<f32>, sample_rate: SampleRate) -> Self {
        Self {
            samples,
            sample_rate,
            channels: 1,
        }
    }

    /// Interleave separate channel vectors into one buffer
    ///
    /// # Errors
    /// Returns `BellError::InvalidBuffer` if no channels are given, there are
    /// more than `u16::MAX`, or their lengths differ
    pub fn from_channels(channels: &[Vec<f32>], sample_rate: SampleRate) -> Result<Self> {
        let Some(first) = channels.first() else {
            return Err(BellError::invalid_buffer("no channels given"));
        };
        let count = u16::try_from(channels.len())
            .map_err(|_| BellError::invalid_buffer("too many channels"))?;
        let frames = first.len();
        if channels.iter().any(|c| c.len() != frames) {
            return Err(BellError::invalid_buffer("channels differ in length"));
        }

        let mut samples = Vec::with_capacity(frames * channels.len());
        for frame in 0..frames {
            samples.extend(channels.iter().map(|c| c[frame]));
        }

        Ok(Self {
            samples,
            sample_rate,
            channels: count,
        })
    }

    /// Interleaved samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Consume the buffer, returning its interleaved samples
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Sample rate
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Number of interleaved channels
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Get the number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate.as_hz())
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get the length in samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Copy one channel out of the interleaved data
    ///
    /// Returns `None` if `index` is not a channel of this buffer.
    pub fn channel(&self, index: usize) -> Option<Vec<f32>> {
        let channels = usize::from(self.channels);
        if index >= channels {
            return None;
        }
        Some(
            self.samples
                .chunks_exact(channels)
                .map(|frame| frame[index])
                .collect(),
        )
    }

    /// Split into one vector per channel
    pub fn to_channels(&self) -> Vec<Vec<f32>> {
        (0..usize::from(self.channels))
            .filter_map(|index| self.channel(index))
            .collect()
    }

    /// Absolute peak across all channels
    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rate_common_values() {
        assert_eq!(SampleRate::CD_QUALITY.as_hz(), 44_100);
        assert_eq!(SampleRate::DVD_QUALITY.as_hz(), 48_000);
        assert_eq!(SampleRate::CD_QUALITY.nyquist(), 22_050.0);
    }

    #[test]
    fn audio_buffer_frames_calculation() {
        // 8 samples with 2 channels = 4 frames
        let buffer = AudioBuffer::new(vec![0.0; 8], SampleRate::CD_QUALITY, 2).unwrap();
        assert_eq!(buffer.frames(), 4);
        assert_eq!(buffer.len(), 8);
    }

    #[test]
    fn rejects_partial_frames() {
        let result = AudioBuffer::new(vec![0.0; 7], SampleRate::CD_QUALITY, 2);
        assert!(matches!(result, Err(BellError::InvalidBuffer(_))));
    }

    #[test]
    fn rejects_zero_channels() {
        assert!(AudioBuffer::new(vec![], SampleRate::CD_QUALITY, 0).is_err());
    }

    #[test]
    fn zero_sample_rate_is_carried_unchecked() {
        let buffer = AudioBuffer::new(vec![0.0; 4], SampleRate::new(0), 1).unwrap();
        assert_eq!(buffer.sample_rate().as_hz(), 0);
        assert_eq!(buffer.frames(), 4);
    }

    #[test]
    fn channel_round_trip() {
        let left = vec![0.1, 0.2, 0.3];
        let right = vec![-0.1, -0.2, -0.3];
        let buffer =
            AudioBuffer::from_channels(&[left.clone(), right.clone()], SampleRate::CD_QUALITY)
                .unwrap();

        assert_eq!(buffer.samples(), &[0.1, -0.1, 0.2, -0.2, 0.3, -0.3]);
        assert_eq!(buffer.channel(0).unwrap(), left);
        assert_eq!(buffer.channel(1).unwrap(), right);
        assert!(buffer.channel(2).is_none());
        assert_eq!(buffer.to_channels(), vec![left, right]);
    }

    #[test]
    fn from_channels_rejects_ragged_input() {
        let result = AudioBuffer::from_channels(&[vec![0.0; 3], vec![0.0; 2]], SampleRate::CD_QUALITY);
        assert!(result.is_err());
        assert!(AudioBuffer::from_channels(&[], SampleRate::CD_QUALITY).is_err());
    }

    #[test]
    fn duration_and_peak() {
        let buffer = AudioBuffer::mono(vec![0.25, -0.75, 0.5, 0.0], SampleRate::new(4));
        assert!((buffer.duration_secs() - 1.0).abs() < 1e-12);
        assert_eq!(buffer.peak(), 0.75);
    }

    #[test]
    fn empty_buffer() {
        let buffer = AudioBuffer::mono(Vec::new(), SampleRate::CD_QUALITY);
        assert!(buffer.is_empty());
        assert_eq!(buffer.frames(), 0);
        assert_eq!(buffer.peak(), 0.0);
    }
}
