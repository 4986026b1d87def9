//! Spectral analysis for before/after comparison
//!
//! Provides:
//! - One-sided magnitude spectrum (`|rfft|`)
//! - Welch power spectral density estimate
//! - Level helpers (peak, RMS, dB conversion)
//! - `AnalysisBundle`, the named arrays handed to plotting and persistence

use bellfir_core::{AudioBuffer, BellError, Result, SampleRate};
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Default Welch segment length
pub const DEFAULT_WELCH_SEGMENT: usize = 1024;

/// Values on a one-sided frequency axis
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Spectrum {
    /// Bin frequencies in Hz, ascending from DC
    pub frequencies: Vec<f64>,
    /// One value per bin
    pub values: Vec<f64>,
}

impl Spectrum {
    /// Number of bins
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no bins
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the bin closest to `frequency`
    pub fn nearest_bin(&self, frequency: f64) -> Option<usize> {
        nearest_index(&self.frequencies, frequency)
    }

    /// Value of the bin closest to `frequency`
    ///
    /// Returns `None` when the axis is empty or longer than `values`.
    pub fn value_at(&self, frequency: f64) -> Option<f64> {
        self.values.get(self.nearest_bin(frequency)?).copied()
    }
}

fn nearest_index(axis: &[f64], frequency: f64) -> Option<usize> {
    axis.iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - frequency).abs().total_cmp(&(*b - frequency).abs()))
        .map(|(i, _)| i)
}

fn onesided_frequencies(nfft: usize, sample_rate: SampleRate) -> Vec<f64> {
    let spacing = f64::from(sample_rate.as_hz()) / nfft as f64;
    (0..nfft / 2 + 1).map(|k| k as f64 * spacing).collect()
}

fn forward_real(planner: &mut FftPlanner<f64>, samples: &[f64]) -> Vec<Complex<f64>> {
    let mut buffer: Vec<Complex<f64>> = samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
    planner.plan_fft_forward(buffer.len()).process(&mut buffer);
    buffer
}

/// One-sided magnitude spectrum of a real signal
///
/// Bins `0..=n/2` of the signal's full-length transform, unnormalized
/// (`|X[k]|`), with the axis `k * fs / n`.
pub fn magnitude_spectrum(signal: &[f32], sample_rate: SampleRate) -> Spectrum {
    if signal.is_empty() {
        return Spectrum::default();
    }

    let samples: Vec<f64> = signal.iter().map(|&s| f64::from(s)).collect();
    let mut planner = FftPlanner::new();
    let transform = forward_real(&mut planner, &samples);

    Spectrum {
        frequencies: onesided_frequencies(signal.len(), sample_rate),
        values: transform
            .iter()
            .take(signal.len() / 2 + 1)
            .map(|c| c.norm())
            .collect(),
    }
}

/// Magnitude spectrum of a buffer's first channel
pub fn buffer_magnitude_spectrum(buffer: &AudioBuffer) -> Spectrum {
    let first = buffer.channel(0).unwrap_or_default();
    magnitude_spectrum(&first, buffer.sample_rate())
}

/// Periodic Hann window (the variant used for spectral analysis)
fn periodic_hann(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / len as f64).cos())
        .collect()
}

/// Welch power spectral density estimate
///
/// Averages periodograms of Hann-windowed segments with 50% overlap. Each
/// segment has its mean removed before windowing. Output is a one-sided
/// density in units²/Hz. Segments longer than the signal are shortened to
/// the signal length.
///
/// # Errors
/// Returns `BellError::InvalidParameter` if `segment_len` or `sample_rate` is zero
pub fn welch_psd(signal: &[f32], sample_rate: SampleRate, segment_len: usize) -> Result<Spectrum> {
    if segment_len == 0 {
        return Err(BellError::invalid_parameter("segment length must be at least 1"));
    }
    if sample_rate.as_hz() == 0 {
        return Err(BellError::invalid_parameter("sample_rate must be positive"));
    }
    if signal.is_empty() {
        return Ok(Spectrum::default());
    }

    let nperseg = segment_len.min(signal.len());
    let step = nperseg - nperseg / 2;
    let segments = (signal.len() - nperseg) / step + 1;

    let window = periodic_hann(nperseg);
    let window_power: f64 = window.iter().map(|w| w * w).sum();
    let scale = 1.0 / (f64::from(sample_rate.as_hz()) * window_power);
    let bins = nperseg / 2 + 1;

    let mut planner = FftPlanner::new();
    let mut accum = vec![0.0f64; bins];
    let mut segment = vec![0.0f64; nperseg];

    for index in 0..segments {
        let start = index * step;
        let source = &signal[start..start + nperseg];
        let mean = source.iter().map(|&s| f64::from(s)).sum::<f64>() / nperseg as f64;
        for ((dst, &s), w) in segment.iter_mut().zip(source).zip(&window) {
            *dst = (f64::from(s) - mean) * w;
        }

        let transform = forward_real(&mut planner, &segment);
        for (a, c) in accum.iter_mut().zip(&transform) {
            *a += c.norm_sqr() * scale;
        }
    }

    // Fold negative frequencies onto positive ones; DC and Nyquist have no mirror
    let last_doubled = if nperseg % 2 == 0 { bins - 1 } else { bins };
    for value in accum.iter_mut().take(last_doubled).skip(1) {
        *value *= 2.0;
    }

    let inv = 1.0 / segments as f64;
    Ok(Spectrum {
        frequencies: onesided_frequencies(nperseg, sample_rate),
        values: accum.into_iter().map(|v| v * inv).collect(),
    })
}

/// Named arrays comparing a signal before and after filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBundle {
    /// Sample rate both signals share
    pub sample_rate: u32,
    /// Axis of the magnitude spectra
    pub frequencies: Vec<f64>,
    /// Magnitude spectrum of the original signal
    pub original_spectrum: Vec<f64>,
    /// Magnitude spectrum of the filtered signal
    pub filtered_spectrum: Vec<f64>,
    /// Axis of the PSD estimates
    pub psd_frequencies: Vec<f64>,
    /// Welch PSD of the original signal
    pub original_psd: Vec<f64>,
    /// Welch PSD of the filtered signal
    pub filtered_psd: Vec<f64>,
}

impl AnalysisBundle {
    /// Analyze the first channel of two buffers
    ///
    /// # Errors
    /// - `BellError::InvalidParameter` if the sample rates differ or `segment_len` is zero
    /// - `BellError::InvalidBuffer` if the buffers differ in length
    pub fn compare(
        original: &AudioBuffer,
        filtered: &AudioBuffer,
        segment_len: usize,
    ) -> Result<Self> {
        if original.sample_rate() != filtered.sample_rate() {
            return Err(BellError::invalid_parameter(
                "original and filtered signals differ in sample rate",
            ));
        }
        if original.frames() != filtered.frames() {
            return Err(BellError::invalid_buffer(format!(
                "original has {} frames, filtered has {}",
                original.frames(),
                filtered.frames()
            )));
        }

        let sample_rate = original.sample_rate();
        let before = original.channel(0).unwrap_or_default();
        let after = filtered.channel(0).unwrap_or_default();

        let original_spectrum = magnitude_spectrum(&before, sample_rate);
        let filtered_spectrum = magnitude_spectrum(&after, sample_rate);
        let original_psd = welch_psd(&before, sample_rate, segment_len)?;
        let filtered_psd = welch_psd(&after, sample_rate, segment_len)?;

        Ok(Self {
            sample_rate: sample_rate.as_hz(),
            frequencies: original_spectrum.frequencies,
            original_spectrum: original_spectrum.values,
            filtered_spectrum: filtered_spectrum.values,
            psd_frequencies: original_psd.frequencies,
            original_psd: original_psd.values,
            filtered_psd: filtered_psd.values,
        })
    }

    /// Change in PSD at `frequency`, in dB
    ///
    /// Returns `None` if either PSD lacks the bin or is not positive there.
    pub fn psd_gain_db(&self, frequency: f64) -> Option<f64> {
        let bin = nearest_index(&self.psd_frequencies, frequency)?;
        let before = *self.original_psd.get(bin)?;
        let after = *self.filtered_psd.get(bin)?;
        if before <= 0.0 || after <= 0.0 {
            return None;
        }
        Some(10.0 * (after / before).log10())
    }
}

/// Calculate RMS (Root Mean Square) level
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum_squares / samples.len() as f64).sqrt() as f32
}

/// Calculate peak level
///
/// Returns the absolute maximum sample value.
pub fn calculate_peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// Convert linear amplitude to dB
pub fn linear_to_db(linear: f64) -> f64 {
    if linear <= 0.0 {
        -200.0 // Silence
    } else {
        20.0 * linear.log10()
    }
}

/// Convert dB to linear amplitude
pub fn db_to_linear(db: f64) -> f64 {
    10.0f64.powf(db / 20.0)
}
