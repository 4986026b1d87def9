//! Tapering windows for FIR truncation
//!
//! All windows are symmetric: sample `i` of an `n`-point window uses the phase
//! `2πi / (n - 1)`, so the first and last samples mirror each other. A
//! single-point window is `[1.0]`.

use bellfir_core::WindowKind;
use std::f64::consts::PI;

/// Generate an `len`-point window of the given kind
pub fn generate(kind: WindowKind, len: usize) -> Vec<f64> {
    let mut dst = vec![0.0; len];
    fill(&mut dst, kind);
    dst
}

/// Write a window of the given kind into `dst`
pub fn fill(dst: &mut [f64], kind: WindowKind) {
    match kind {
        WindowKind::Blackman => cosine_sum(dst, &[0.42, 0.5, 0.08]),
        WindowKind::Hann => cosine_sum(dst, &[0.5, 0.5]),
        WindowKind::Hamming => cosine_sum(dst, &[0.54, 0.46]),
        WindowKind::BlackmanHarris => cosine_sum(dst, &[0.35875, 0.48829, 0.14128, 0.01168]),
        WindowKind::Rectangular => dst.fill(1.0),
    }
}

/// Generalized cosine-sum window `Σ (-1)^k a_k cos(2πki / (n - 1))`
fn cosine_sum(dst: &mut [f64], coeffs: &[f64]) {
    let n = dst.len();
    match n {
        0 => return,
        1 => {
            dst[0] = 1.0;
            return;
        }
        _ => {}
    }

    let f = 2.0 * PI / (n - 1) as f64;
    for (i, sample) in dst.iter_mut().enumerate() {
        let phase = i as f64 * f;
        *sample = coeffs
            .iter()
            .enumerate()
            .map(|(k, &a)| {
                let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                sign * a * (k as f64 * phase).cos()
            })
            .sum();
    }
}
