//! Discrete magnitude spectrum sampled from the analytic response
//!
//! Bins follow the standard discrete-transform layout: bin 0 is DC, bins
//! `1..ceil(n/2)` are positive frequencies `k * fs / n`, and the remaining bins
//! wrap to the negative frequencies `(k - n) * fs / n`. Magnitudes are taken at
//! `|f|`, so the spectrum is even-symmetric and carries no phase.

use crate::response;
use bellfir_core::{BellError, FilterParameters, Result, SampleRate, Stage};

/// Bin frequencies (Hz) of an `order`-point transform at `sample_rate`
pub fn frequency_axis(order: usize, sample_rate: SampleRate) -> Vec<f64> {
    if order == 0 {
        return Vec::new();
    }
    let n = order as f64;
    let spacing = f64::from(sample_rate.as_hz()) / n;
    let positive = order.div_ceil(2);
    (0..order)
        .map(|k| {
            if k < positive {
                k as f64 * spacing
            } else {
                (k as f64 - n) * spacing
            }
        })
        .collect()
}

/// Zero-phase target magnitude for every transform bin
#[derive(Debug, Clone, PartialEq)]
pub struct MagnitudeSpectrum {
    frequencies: Vec<f64>,
    magnitudes: Vec<f64>,
    sample_rate: SampleRate,
}

impl MagnitudeSpectrum {
    /// Sample the bell response over the bins of an `order`-point transform
    ///
    /// # Errors
    /// - `BellError::InvalidParameter` if `order` or `sample_rate` is zero
    /// - `BellError::NonFinite` if a sampled magnitude is NaN or infinite
    pub fn build(
        order: usize,
        sample_rate: SampleRate,
        params: &FilterParameters,
    ) -> Result<Self> {
        if order == 0 {
            return Err(BellError::invalid_parameter("order must be at least 1"));
        }
        if sample_rate.as_hz() == 0 {
            return Err(BellError::invalid_parameter("sample_rate must be positive"));
        }

        let frequencies = frequency_axis(order, sample_rate);
        let absolute: Vec<f64> = frequencies.iter().map(|f| f.abs()).collect();
        let magnitudes = response::evaluate(&absolute, params);
        BellError::check_finite(Stage::Spectrum, &magnitudes)?;

        Ok(Self {
            frequencies,
            magnitudes,
            sample_rate,
        })
    }

    /// Wrap precomputed magnitudes laid out on the standard bin axis
    ///
    /// # Errors
    /// - `BellError::InvalidParameter` if `magnitudes` is empty or `sample_rate` is zero
    /// - `BellError::NonFinite` if a magnitude is NaN or infinite
    pub fn from_magnitudes(magnitudes: Vec<f64>, sample_rate: SampleRate) -> Result<Self> {
        if magnitudes.is_empty() {
            return Err(BellError::invalid_parameter("spectrum must not be empty"));
        }
        if sample_rate.as_hz() == 0 {
            return Err(BellError::invalid_parameter("sample_rate must be positive"));
        }
        BellError::check_finite(Stage::Spectrum, &magnitudes)?;

        Ok(Self {
            frequencies: frequency_axis(magnitudes.len(), sample_rate),
            magnitudes,
            sample_rate,
        })
    }

    /// Bin frequencies in Hz (negative above Nyquist)
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Magnitude per bin
    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    /// Sample rate the bins refer to
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Number of bins (the transform length)
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    /// Check if the spectrum has no bins
    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }
}
