//! Analytic magnitude response of the bell filter
//!
//! For `g = 10^(gain_db / 20)` the target magnitude at frequency `f` is
//!
//! ```text
//! |H(f)| = g * exp(-(ln(f / f0))^2 * ln 2 / (2 * sinh(1 / (2Q))^2)) + 1
//! ```
//!
//! The trailing `+ 1` is part of the model: far from `f0` the response settles
//! on 1, and at `f0` it reaches `g + 1`. With `gain_db = 0` the peak is
//! therefore 2 (about +6 dB), not flat.

use bellfir_core::FilterParameters;

/// Replacement for non-positive frequencies before taking the logarithm
pub const FREQUENCY_EPSILON: f64 = 1e-10;

/// Smallest magnitude allowed for `2 * sinh(1 / (2Q))^2`
pub const DENOMINATOR_FLOOR: f64 = 1e-10;

/// Additive offset applied after the exponential
pub const BASELINE_OFFSET: f64 = 1.0;

/// Bandwidth term `2 * sinh(1 / (2Q))^2`, floored for near-infinite Q
fn bandwidth_term(q: f64) -> f64 {
    let term = 2.0 * (1.0 / (2.0 * q)).sinh().powi(2);
    if term.abs() < DENOMINATOR_FLOOR {
        tracing::trace!(q, term, "bandwidth term floored");
        DENOMINATOR_FLOOR
    } else {
        term
    }
}

/// Shared state for evaluating many frequencies with one parameter set
#[derive(Debug, Clone, Copy)]
struct Shape {
    gain_linear: f64,
    center_freq: f64,
    spread: f64,
}

impl Shape {
    fn new(params: &FilterParameters) -> Self {
        Self {
            gain_linear: params.gain_linear(),
            center_freq: params.center_freq(),
            spread: std::f64::consts::LN_2 / bandwidth_term(params.q()),
        }
    }

    #[inline]
    fn magnitude(&self, frequency: f64) -> f64 {
        let f = if frequency > 0.0 {
            frequency
        } else {
            FREQUENCY_EPSILON
        };
        let octave_log = (f / self.center_freq).ln();
        self.gain_linear * (-(octave_log * octave_log) * self.spread).exp() + BASELINE_OFFSET
    }
}

/// Target magnitude at a single frequency
pub fn magnitude_at(frequency: f64, params: &FilterParameters) -> f64 {
    Shape::new(params).magnitude(frequency)
}

/// Target magnitudes for a sequence of frequencies (Hz)
///
/// Frequencies at or below zero are evaluated at `FREQUENCY_EPSILON`.
/// `FilterParameters` is validated on construction, so this cannot fail.
pub fn evaluate(frequencies: &[f64], params: &FilterParameters) -> Vec<f64> {
    let shape = Shape::new(params);
    frequencies.iter().map(|&f| shape.magnitude(f)).collect()
}
