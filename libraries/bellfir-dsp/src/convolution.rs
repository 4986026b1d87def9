//! "Same"-mode FIR convolution of finite signals
//!
//! Output sample `n` is sample `n + (M - 1) / 2` of the full linear
//! convolution (`M` = number of taps), so the output has the input's length
//! and the filter's group delay is compensated. Samples outside the input
//! are treated as zero.
//!
//! Uses a hybrid approach:
//! - Direct time-domain convolution for short filters (<= 64 taps)
//! - FFT-based overlap-add convolution for longer filters
//!
//! # Example
//!
//! ```rust
//! use bellfir_core::{FilterDesign, SampleRate, WindowKind, FilterParameters};
//! use bellfir_dsp::{ConvolutionEngine, ImpulseResponse};
//!
//! let params = FilterParameters::new(1000.0, 2.0, 6.0)?;
//! let design = FilterDesign::new(params, 512, SampleRate::CD_QUALITY, WindowKind::Blackman)?;
//! let engine = ConvolutionEngine::new(ImpulseResponse::design(&design)?);
//!
//! let filtered = engine.apply(&[0.5; 1024])?;
//! assert_eq!(filtered.len(), 1024);
//! # Ok::<(), bellfir_core::BellError>(())
//! ```

use crate::impulse::ImpulseResponse;
use bellfir_core::{AudioBuffer, BellError, Result, Stage};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Filters with at most this many taps use direct convolution
pub const TIME_DOMAIN_THRESHOLD: usize = 64;

/// Minimum FFT size for efficient processing
const MIN_FFT_SIZE: usize = 256;

/// Input block length the FFT size is planned around
const BLOCK_SIZE: usize = 512;

/// Peak level above which output is rescaled
pub const CLIP_THRESHOLD: f32 = 1.0;

/// Peak level after rescaling
pub const CLIP_HEADROOM: f32 = 0.9;

/// Applies one impulse response to any number of signals
///
/// The coefficient spectrum is computed once in `new` and reused by every
/// call. All methods take `&self`; an engine can be shared across threads.
///
/// For an even number of taps the `(M - 1) / 2` offset is one sample short of
/// [`ImpulseResponse::group_delay`], so output lags the input by one sample.
pub struct ConvolutionEngine {
    ir: ImpulseResponse,
    fft_state: Option<FftState>,
}

/// Precomputed state for overlap-add convolution
struct FftState {
    /// FFT size (power of 2, >= taps + block - 1)
    fft_size: usize,
    /// Input samples consumed per FFT
    block_size: usize,
    /// FFT of the zero-padded coefficients
    ir_fft: Vec<Complex<f64>>,
    fft_forward: Arc<dyn Fft<f64>>,
    fft_inverse: Arc<dyn Fft<f64>>,
}

impl FftState {
    fn new(coefficients: &[f64]) -> Self {
        let taps = coefficients.len();
        let fft_size = (taps + BLOCK_SIZE).next_power_of_two().max(MIN_FFT_SIZE);

        let mut planner = FftPlanner::new();
        let fft_forward = planner.plan_fft_forward(fft_size);
        let fft_inverse = planner.plan_fft_inverse(fft_size);

        let mut ir_fft = vec![Complex::new(0.0, 0.0); fft_size];
        for (dst, &c) in ir_fft.iter_mut().zip(coefficients) {
            *dst = Complex::new(c, 0.0);
        }
        fft_forward.process(&mut ir_fft);

        Self {
            fft_size,
            block_size: fft_size - taps + 1,
            ir_fft,
            fft_forward,
            fft_inverse,
        }
    }
}

impl fmt::Debug for ConvolutionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvolutionEngine")
            .field("taps", &self.ir.len())
            .field("fft_size", &self.fft_state.as_ref().map(|s| s.fft_size))
            .finish()
    }
}

impl ConvolutionEngine {
    /// Prepare an engine for the given impulse response
    pub fn new(ir: ImpulseResponse) -> Self {
        let fft_state = if ir.len() > TIME_DOMAIN_THRESHOLD {
            Some(FftState::new(ir.coefficients()))
        } else {
            None
        };
        debug!(
            taps = ir.len(),
            fft = fft_state.is_some(),
            "prepared convolution engine"
        );
        Self { ir, fft_state }
    }

    /// Impulse response applied by this engine
    pub fn impulse_response(&self) -> &ImpulseResponse {
        &self.ir
    }

    /// Whether the FFT path is used
    pub fn uses_fft(&self) -> bool {
        self.fft_state.is_some()
    }

    /// Filter a mono signal, rescaling if the result would clip
    ///
    /// # Errors
    /// Returns `BellError::NonFinite` if the output contains NaN or infinity
    pub fn apply(&self, signal: &[f32]) -> Result<Vec<f32>> {
        let mut output = self.filter_channel(signal)?;
        prevent_clipping(&mut output);
        Ok(output)
    }

    /// Filter every channel of a buffer independently
    ///
    /// The anti-clip rescale is decided on the peak of the whole buffer, so
    /// channel balance is preserved.
    ///
    /// # Errors
    /// - `BellError::InvalidParameter` if the buffer's sample rate differs from the filter's
    /// - `BellError::NonFinite` if the output contains NaN or infinity
    pub fn apply_buffer(&self, buffer: &AudioBuffer) -> Result<AudioBuffer> {
        if buffer.sample_rate() != self.ir.sample_rate() {
            return Err(BellError::invalid_parameter(format!(
                "buffer is {} Hz but the filter was designed for {} Hz",
                buffer.sample_rate().as_hz(),
                self.ir.sample_rate().as_hz()
            )));
        }

        let mut channels = buffer
            .to_channels()
            .iter()
            .map(|channel| self.filter_channel(channel))
            .collect::<Result<Vec<_>>>()?;

        let peak = channels
            .iter()
            .flat_map(|c| c.iter())
            .fold(0.0f32, |m, s| m.max(s.abs()));
        if peak > CLIP_THRESHOLD {
            let gain = CLIP_HEADROOM / peak;
            debug!(peak, gain, "rescaling filtered buffer to avoid clipping");
            for sample in channels.iter_mut().flat_map(|c| c.iter_mut()) {
                *sample *= gain;
            }
        }

        AudioBuffer::from_channels(&channels, buffer.sample_rate())
    }

    /// "Same"-mode convolution without any rescaling
    ///
    /// Empty input gives empty output.
    pub fn convolve_same(&self, signal: &[f32]) -> Vec<f64> {
        if signal.is_empty() {
            return Vec::new();
        }
        match &self.fft_state {
            Some(state) => self.convolve_fft(state, signal),
            None => self.convolve_time_domain(signal),
        }
    }

    fn filter_channel(&self, signal: &[f32]) -> Result<Vec<f32>> {
        let output: Vec<f32> = self
            .convolve_same(signal)
            .into_iter()
            .map(|s| s as f32)
            .collect();
        BellError::check_finite(Stage::Convolution, &output)?;
        Ok(output)
    }

    /// Offset of the "same" slice inside the full convolution
    fn same_offset(&self) -> usize {
        (self.ir.len() - 1) / 2
    }

    /// Direct convolution, evaluated only at the kept output positions
    fn convolve_time_domain(&self, signal: &[f32]) -> Vec<f64> {
        let h = self.ir.coefficients();
        let taps = h.len();
        let len = signal.len();
        let offset = self.same_offset();

        (0..len)
            .map(|n| {
                // full[i] = Σ h[j] x[i - j] with 0 <= i - j < len
                let i = n + offset;
                let j_start = (i + 1).saturating_sub(len);
                let j_end = taps.min(i + 1);
                (j_start..j_end)
                    .map(|j| h[j] * f64::from(signal[i - j]))
                    .sum()
            })
            .collect()
    }

    /// Overlap-add FFT convolution
    ///
    /// Input blocks are zero-padded, convolved via FFT, and accumulated into
    /// the full-length result, from which the centred slice is taken.
    fn convolve_fft(&self, state: &FftState, signal: &[f32]) -> Vec<f64> {
        let taps = self.ir.len();
        let len = signal.len();
        let fft_size = state.fft_size;
        let scale = 1.0 / fft_size as f64;

        let mut full = vec![0.0f64; len + taps - 1];
        let mut scratch = vec![Complex::new(0.0, 0.0); fft_size];

        let mut input_pos = 0;
        while input_pos < len {
            let chunk_size = (len - input_pos).min(state.block_size);

            for (i, slot) in scratch.iter_mut().enumerate() {
                *slot = if i < chunk_size {
                    Complex::new(f64::from(signal[input_pos + i]), 0.0)
                } else {
                    Complex::new(0.0, 0.0)
                };
            }

            state.fft_forward.process(&mut scratch);
            for (x, h) in scratch.iter_mut().zip(&state.ir_fft) {
                *x = *x * *h;
            }
            state.fft_inverse.process(&mut scratch);

            let conv_len = chunk_size + taps - 1;
            for (dst, y) in full[input_pos..input_pos + conv_len]
                .iter_mut()
                .zip(&scratch)
            {
                *dst += y.re * scale;
            }

            input_pos += chunk_size;
        }

        let offset = self.same_offset();
        full.drain(..offset);
        full.truncate(len);
        full
    }
}

/// Rescale `samples` to a 0.9 peak if their peak exceeds 1.0
///
/// Returns whether a rescale happened.
pub fn prevent_clipping(samples: &mut [f32]) -> bool {
    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    if peak <= CLIP_THRESHOLD {
        return false;
    }
    let gain = CLIP_HEADROOM / peak;
    debug!(peak, gain, "rescaling filtered signal to avoid clipping");
    for sample in samples.iter_mut() {
        *sample *= gain;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use bellfir_core::{SampleRate, WindowKind};

    fn engine(coefficients: Vec<f64>) -> ConvolutionEngine {
        ConvolutionEngine::new(
            ImpulseResponse::from_coefficients(
                coefficients,
                SampleRate::CD_QUALITY,
                WindowKind::Rectangular,
            )
            .unwrap(),
        )
    }

    /// Full linear convolution, straight from the definition
    fn reference_full(x: &[f32], h: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; x.len() + h.len() - 1];
        for (i, &xi) in x.iter().enumerate() {
            for (j, &hj) in h.iter().enumerate() {
                out[i + j] += f64::from(xi) * hj;
            }
        }
        out
    }

    fn test_signal(len: usize) -> Vec<f32> {
        (0..len).map(|i| ((i * 7919) % 101) as f32 / 101.0 - 0.5).collect()
    }

    #[test]
    fn even_taps_lag_group_delay_by_one() {
        // Delta at tap 2 of 4: group delay is 2, the same-mode offset is 1
        let engine = engine(vec![0.0, 0.0, 1.0, 0.0]);
        assert_eq!(engine.impulse_response().group_delay(), 2);

        let mut signal = vec![0.0f32; 12];
        signal[5] = 0.5;
        let output = engine.apply(&signal).unwrap();
        assert_eq!(output.len(), 12);
        assert_eq!(output[6], 0.5);
        assert_eq!(output.iter().filter(|&&s| s != 0.0).count(), 1);
    }

    #[test]
    fn dirac_passes_signal_through() {
        let engine = engine(vec![1.0]);
        let input = vec![0.5, -0.3, 0.2, 0.0];
        let output = engine.apply(&input).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn centered_dirac_is_aligned() {
        // Odd-length filter with the tap in the middle: zero-delay identity
        let mut h = vec![0.0; 5];
        h[2] = 1.0;
        let output = engine(h).apply(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6]).unwrap();
        assert_eq!(output, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
    }

    #[test]
    fn time_domain_matches_reference() {
        let h: Vec<f64> = (0..9).map(|i| 0.1 * (i as f64 - 4.0)).collect();
        let x = test_signal(40);
        let engine = engine(h.clone());
        assert!(!engine.uses_fft());

        let full = reference_full(&x, &h);
        let offset = (h.len() - 1) / 2;
        let same = engine.convolve_same(&x);
        assert_eq!(same.len(), x.len());
        for (n, value) in same.iter().enumerate() {
            assert!((value - full[n + offset]).abs() < 1e-12, "sample {n}");
        }
    }

    #[test]
    fn fft_matches_reference() {
        let h: Vec<f64> = (0..300).map(|i| ((i as f64) * 0.37).sin() / 50.0).collect();
        let x = test_signal(3000);
        let engine = engine(h.clone());
        assert!(engine.uses_fft());

        let full = reference_full(&x, &h);
        let offset = (h.len() - 1) / 2;
        let same = engine.convolve_same(&x);
        assert_eq!(same.len(), x.len());
        for (n, value) in same.iter().enumerate() {
            assert!((value - full[n + offset]).abs() < 1e-9, "sample {n}");
        }
    }

    #[test]
    fn signal_shorter_than_filter() {
        let h: Vec<f64> = (0..128).map(|i| 1.0 / (1.0 + i as f64)).collect();
        let x = test_signal(10);
        let engine = engine(h.clone());

        let full = reference_full(&x, &h);
        let offset = (h.len() - 1) / 2;
        let same = engine.convolve_same(&x);
        assert_eq!(same.len(), 10);
        for (n, value) in same.iter().enumerate() {
            assert!((value - full[n + offset]).abs() < 1e-9);
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(engine(vec![0.5; 4]).apply(&[]).unwrap().is_empty());
        assert!(engine(vec![0.5; 400]).apply(&[]).unwrap().is_empty());
    }

    #[test]
    fn loud_output_is_rescaled_to_headroom() {
        let output = engine(vec![4.0]).apply(&[0.5, -0.25]).unwrap();
        assert!((output[0] - 0.9).abs() < 1e-6);
        assert!((output[1] + 0.45).abs() < 1e-6);
    }

    #[test]
    fn quiet_output_is_untouched() {
        let output = engine(vec![2.0]).apply(&[0.5, -0.25]).unwrap();
        assert_eq!(output, vec![1.0, -0.5]);
    }

    #[test]
    fn overflow_is_reported() {
        let result = engine(vec![1e300]).apply(&[1.0]);
        assert!(matches!(
            result,
            Err(BellError::NonFinite { stage: Stage::Convolution, index: 0 })
        ));
    }

    #[test]
    fn channels_are_filtered_independently() {
        let engine = engine(vec![0.0, 1.0, 0.5]);
        let left = vec![1.0, 0.0, 0.0, 0.0];
        let right = vec![0.0, 0.0, 0.5, 0.0];
        let buffer =
            AudioBuffer::from_channels(&[left.clone(), right.clone()], SampleRate::CD_QUALITY)
                .unwrap();

        let output = engine.apply_buffer(&buffer).unwrap();
        assert_eq!(output.channels(), 2);
        assert_eq!(output.frames(), 4);
        assert_eq!(output.channel(0).unwrap(), engine.apply(&left).unwrap());
        assert_eq!(output.channel(1).unwrap(), engine.apply(&right).unwrap());
    }

    #[test]
    fn buffer_rescale_uses_global_peak() {
        let engine = engine(vec![3.0]);
        let buffer = AudioBuffer::from_channels(
            &[vec![0.5, 0.1], vec![0.1, 0.1]],
            SampleRate::CD_QUALITY,
        )
        .unwrap();

        let output = engine.apply_buffer(&buffer).unwrap();
        // Peak 1.5 in the left channel sets the gain for both
        let right = output.channel(1).unwrap();
        assert!((output.peak() - 0.9).abs() < 1e-6);
        assert!((right[0] - 0.3 * 0.6).abs() < 1e-6);
    }

    #[test]
    fn rejects_sample_rate_mismatch() {
        let buffer = AudioBuffer::mono(vec![0.0; 16], SampleRate::DVD_QUALITY);
        let result = engine(vec![1.0]).apply_buffer(&buffer);
        assert!(matches!(result, Err(BellError::InvalidParameter(_))));
    }

    #[test]
    fn prevent_clipping_threshold_is_exclusive() {
        let mut at_limit = vec![1.0, -1.0];
        assert!(!prevent_clipping(&mut at_limit));
        assert_eq!(at_limit, vec![1.0, -1.0]);

        let mut over = vec![2.0, -1.0];
        assert!(prevent_clipping(&mut over));
        assert_eq!(over, vec![0.9, -0.45]);
    }

    #[test]
    fn engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConvolutionEngine>();
        assert_send_sync::<ImpulseResponse>();
    }
}
