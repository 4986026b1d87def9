//! Linear-phase impulse response synthesis
//!
//! Turns a zero-phase magnitude spectrum into FIR coefficients:
//!
//! 1. Inverse transform, keeping the real part. An even-symmetric spectrum
//!    has a real inverse, so the imaginary part is rounding noise; its size is
//!    recorded and checked rather than assumed.
//! 2. Circular rotation by `n / 2`, moving the main lobe from index 0 to the
//!    middle. The filter then has a constant group delay of `n / 2` samples.
//! 3. Truncation to `order` samples. The transform length always equals the
//!    order here, so this keeps the whole rotated sequence.
//! 4. Multiplication by a tapering window to suppress truncation ripple.
//!
//! No gain renormalization follows. The realized gain at the center frequency
//! differs from the target by the windowing loss.

use crate::spectrum::MagnitudeSpectrum;
use crate::window;
use bellfir_core::{BellError, FilterDesign, Result, SampleRate, Stage, WindowKind};
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use std::f64::consts::PI;
use std::sync::Arc;
use tracing::{debug, warn};

/// Imaginary residual (relative to the largest real sample) above which the
/// inverse transform is reported as suspicious
pub const IMAGINARY_TOLERANCE: f64 = 1e-9;

/// Window samples at or below this magnitude are skipped by `unwindowed`
const WINDOW_FLOOR: f64 = 1e-12;

/// Windowed FIR coefficients of a linear-phase bell filter
///
/// Immutable after construction. Clones share the coefficient storage, so one
/// response can feed any number of convolutions, on any thread.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponse {
    coefficients: Arc<[f64]>,
    sample_rate: SampleRate,
    window: WindowKind,
    imaginary_residual: f64,
}

impl ImpulseResponse {
    /// Run the full pipeline for a design record
    ///
    /// # Errors
    /// Propagates `BellError` from spectrum sampling and synthesis
    pub fn design(design: &FilterDesign) -> Result<Self> {
        let spectrum =
            MagnitudeSpectrum::build(design.order(), design.sample_rate(), &design.params())?;
        let response = Self::synthesize(&spectrum, design.order(), design.window())?;
        debug!(
            params = %design.params(),
            order = design.order(),
            window = %design.window(),
            "designed bell filter"
        );
        Ok(response)
    }

    /// Synthesize coefficients from a sampled magnitude spectrum
    ///
    /// # Errors
    /// - `BellError::InvalidParameter` if `order` is zero or differs from the spectrum length
    /// - `BellError::NonFinite` if a coefficient is NaN or infinite
    pub fn synthesize(
        spectrum: &MagnitudeSpectrum,
        order: usize,
        window_kind: WindowKind,
    ) -> Result<Self> {
        if order == 0 {
            return Err(BellError::invalid_parameter("order must be at least 1"));
        }
        if spectrum.len() != order {
            return Err(BellError::invalid_parameter(format!(
                "spectrum has {} bins but order is {}",
                spectrum.len(),
                order
            )));
        }

        let n = spectrum.len();
        let mut buffer: Vec<Complex<f64>> = spectrum
            .magnitudes()
            .iter()
            .map(|&m| Complex::new(m, 0.0))
            .collect();

        let mut planner = FftPlanner::<f64>::new();
        let ifft = planner.plan_fft_inverse(n);
        ifft.process(&mut buffer);

        // rustfft leaves the inverse unnormalized
        let scale = 1.0 / n as f64;
        let mut peak_real = 0.0f64;
        let mut residual = 0.0f64;
        let mut samples: Vec<f64> = buffer
            .iter()
            .map(|c| {
                let re = c.re * scale;
                peak_real = peak_real.max(re.abs());
                residual = residual.max((c.im * scale).abs());
                re
            })
            .collect();

        if residual > IMAGINARY_TOLERANCE * peak_real.max(f64::MIN_POSITIVE) {
            warn!(
                residual,
                peak_real, "inverse transform left a large imaginary part; spectrum may not be even"
            );
        }

        samples.rotate_right(n / 2);
        samples.truncate(order);

        let taper = window::generate(window_kind, order);
        for (sample, w) in samples.iter_mut().zip(&taper) {
            *sample *= w;
        }

        BellError::check_finite(Stage::ImpulseResponse, &samples)?;

        debug!(
            order,
            window = %window_kind,
            imaginary_residual = residual,
            "synthesized impulse response"
        );

        Ok(Self {
            coefficients: samples.into(),
            sample_rate: spectrum.sample_rate(),
            window: window_kind,
            imaginary_residual: residual,
        })
    }

    /// Wrap externally supplied coefficients
    ///
    /// `window` records which taper the coefficients already carry.
    ///
    /// # Errors
    /// - `BellError::InvalidParameter` if `coefficients` is empty or `sample_rate` is zero
    /// - `BellError::NonFinite` if a coefficient is NaN or infinite
    pub fn from_coefficients(
        coefficients: Vec<f64>,
        sample_rate: SampleRate,
        window: WindowKind,
    ) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(BellError::invalid_parameter("coefficients must not be empty"));
        }
        if sample_rate.as_hz() == 0 {
            return Err(BellError::invalid_parameter("sample_rate must be positive"));
        }
        BellError::check_finite(Stage::ImpulseResponse, &coefficients)?;

        Ok(Self {
            coefficients: coefficients.into(),
            sample_rate,
            window,
            imaginary_residual: 0.0,
        })
    }

    /// FIR coefficients
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Number of coefficients (the filter order)
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// Check if there are no coefficients
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Constant group delay in samples
    pub fn group_delay(&self) -> usize {
        self.coefficients.len() / 2
    }

    /// Sample rate the coefficients were designed for
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Window applied to the coefficients
    pub fn window(&self) -> WindowKind {
        self.window
    }

    /// Largest absolute imaginary part left by the inverse transform
    pub fn imaginary_residual(&self) -> f64 {
        self.imaginary_residual
    }

    /// Coefficients divided by the window, i.e. the rotated sequence before tapering
    ///
    /// Positions where the window is (numerically) zero are returned as 0.
    pub fn unwindowed(&self) -> Vec<f64> {
        let taper = window::generate(self.window, self.len());
        self.coefficients
            .iter()
            .zip(&taper)
            .map(|(&c, &w)| if w.abs() > WINDOW_FLOOR { c / w } else { 0.0 })
            .collect()
    }

    /// Realized magnitude at an arbitrary frequency (Hz)
    ///
    /// Evaluates the discrete-time Fourier transform of the coefficients.
    pub fn magnitude_at(&self, frequency: f64) -> f64 {
        let omega = 2.0 * PI * frequency / f64::from(self.sample_rate.as_hz());
        let sum = self
            .coefficients
            .iter()
            .enumerate()
            .fold(Complex::new(0.0, 0.0), |acc, (n, &h)| {
                acc + Complex::from_polar(h, -omega * n as f64)
            });
        sum.norm()
    }

    /// One-sided realized magnitude response
    ///
    /// # Returns
    /// `(frequency_hz, magnitude)` pairs for bins `0..=len/2` of a transform
    /// the length of the filter
    pub fn frequency_response(&self) -> Vec<(f64, f64)> {
        let n = self.len();
        let mut buffer: Vec<Complex<f64>> = self
            .coefficients
            .iter()
            .map(|&c| Complex::new(c, 0.0))
            .collect();

        let mut planner = FftPlanner::<f64>::new();
        planner.plan_fft_forward(n).process(&mut buffer);

        let spacing = f64::from(self.sample_rate.as_hz()) / n as f64;
        buffer
            .iter()
            .take(n / 2 + 1)
            .enumerate()
            .map(|(k, c)| (k as f64 * spacing, c.norm()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bellfir_core::FilterParameters;

    fn design(order: usize, window: WindowKind) -> FilterDesign {
        FilterDesign::new(
            FilterParameters::new(1000.0, 10.0, 12.0).unwrap(),
            order,
            SampleRate::CD_QUALITY,
            window,
        )
        .unwrap()
    }

    #[test]
    fn returns_exactly_order_coefficients() {
        for order in [64, 256, 1024, 2048] {
            let ir = ImpulseResponse::design(&design(order, WindowKind::Blackman)).unwrap();
            assert_eq!(ir.len(), order);
            assert_eq!(ir.group_delay(), order / 2);
        }
    }

    #[test]
    fn rejects_mismatched_spectrum() {
        let params = FilterParameters::new(1000.0, 1.0, 6.0).unwrap();
        let spectrum = MagnitudeSpectrum::build(256, SampleRate::CD_QUALITY, &params).unwrap();
        let result = ImpulseResponse::synthesize(&spectrum, 512, WindowKind::Blackman);
        assert!(matches!(result, Err(BellError::InvalidParameter(_))));

        let result = ImpulseResponse::synthesize(&spectrum, 0, WindowKind::Blackman);
        assert!(matches!(result, Err(BellError::InvalidParameter(_))));
    }

    #[test]
    fn main_lobe_is_centered() {
        let ir = ImpulseResponse::design(&design(1024, WindowKind::Blackman)).unwrap();
        let (peak_index, _) = ir
            .coefficients()
            .iter()
            .enumerate()
            .fold((0, 0.0), |acc, (i, &c)| if c.abs() > acc.1 { (i, c.abs()) } else { acc });
        assert_eq!(peak_index, 512);
    }

    #[test]
    fn rectangular_design_is_symmetric_about_center() {
        let ir = ImpulseResponse::design(&design(512, WindowKind::Rectangular)).unwrap();
        let h = ir.coefficients();
        for k in 1..256 {
            assert!(
                (h[256 + k] - h[256 - k]).abs() < 1e-12,
                "asymmetric at offset {k}"
            );
        }
    }

    #[test]
    fn imaginary_residual_is_negligible() {
        let ir = ImpulseResponse::design(&design(2048, WindowKind::Blackman)).unwrap();
        let peak = ir.coefficients().iter().fold(0.0f64, |m, c| m.max(c.abs()));
        assert!(ir.imaginary_residual() <= IMAGINARY_TOLERANCE * peak);
    }

    #[test]
    fn unwindowed_undoes_taper() {
        let blackman = ImpulseResponse::design(&design(256, WindowKind::Blackman)).unwrap();
        let rectangular = ImpulseResponse::design(&design(256, WindowKind::Rectangular)).unwrap();
        let restored = blackman.unwindowed();
        // Endpoints are where the Blackman window is zero
        for i in 1..255 {
            assert!(
                (restored[i] - rectangular.coefficients()[i]).abs() < 1e-9,
                "mismatch at {i}"
            );
        }
        assert_eq!(restored[0], 0.0);
    }

    #[test]
    fn rectangular_design_reproduces_spectrum_on_bins() {
        let d = design(256, WindowKind::Rectangular);
        let spectrum =
            MagnitudeSpectrum::build(d.order(), d.sample_rate(), &d.params()).unwrap();
        let ir = ImpulseResponse::design(&d).unwrap();
        for (k, (_, magnitude)) in ir.frequency_response().into_iter().enumerate() {
            assert!((magnitude - spectrum.magnitudes()[k]).abs() < 1e-9, "bin {k}");
        }
    }

    #[test]
    fn magnitude_at_agrees_with_frequency_response() {
        let ir = ImpulseResponse::design(&design(128, WindowKind::Hann)).unwrap();
        for (f, magnitude) in ir.frequency_response().into_iter().step_by(7) {
            assert!((ir.magnitude_at(f) - magnitude).abs() < 1e-9, "at {f} Hz");
        }
    }

    #[test]
    fn from_coefficients_validates() {
        assert!(
            ImpulseResponse::from_coefficients(vec![], SampleRate::CD_QUALITY, WindowKind::Rectangular)
                .is_err()
        );
        let result = ImpulseResponse::from_coefficients(
            vec![0.0, f64::INFINITY],
            SampleRate::CD_QUALITY,
            WindowKind::Rectangular,
        );
        assert!(matches!(
            result,
            Err(BellError::NonFinite { stage: Stage::ImpulseResponse, index: 1 })
        ));
    }

    #[test]
    fn rejects_zero_sample_rate() {
        let result = ImpulseResponse::from_coefficients(
            vec![1.0, 0.5],
            SampleRate::new(0),
            WindowKind::Rectangular,
        );
        assert!(matches!(result, Err(BellError::InvalidParameter(_))));
    }

    #[test]
    fn clones_share_coefficients() {
        let ir = ImpulseResponse::design(&design(64, WindowKind::Blackman)).unwrap();
        let copy = ir.clone();
        assert!(std::ptr::eq(ir.coefficients().as_ptr(), copy.coefficients().as_ptr()));
    }

    #[test]
    fn single_tap_filter() {
        let ir = ImpulseResponse::design(&design(1, WindowKind::Blackman)).unwrap();
        assert_eq!(ir.len(), 1);
        // DC of a one-point transform sits on the baseline
        assert!((ir.coefficients()[0] - 1.0).abs() < 1e-12);
    }
}
