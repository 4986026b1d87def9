//! Bellfir DSP
//!
//! Linear-phase FIR synthesis of bell (peaking) equalizer filters and the
//! tools to apply and verify them.
//!
//! The design pipeline runs in fixed order:
//!
//! ```text
//! FilterParameters ─► response ─► MagnitudeSpectrum ─► ImpulseResponse ─► ConvolutionEngine
//!   (f0, Q, dB)      (bell curve)   (fftfreq layout)    (IFFT, centre,      ("same" mode,
//!                                                         window)            anti-clip)
//! ```
//!
//! This crate provides:
//! - Bell magnitude model evaluated on a transform-layout frequency axis
//! - Impulse response synthesis by inverse FFT, circular centring and windowing
//! - "Same"-length convolution with direct and FFT overlap-add paths
//! - `BellFilter`, an [`AudioProcessor`](bellfir_core::AudioProcessor) wrapping the pipeline
//! - Reference signals and spectral analysis for before/after comparison ([`harness`])
//!
//! # Example
//!
//! ```rust
//! use bellfir_dsp::harness::{welch_psd, white_noise};
//! use bellfir_dsp::{ConvolutionEngine, FilterDesign, ImpulseResponse, SampleRate};
//!
//! let design = FilterDesign::default(); // 1 kHz, Q 10, +12 dB, 2048 taps
//! let ir = ImpulseResponse::design(&design)?;
//! assert_eq!(ir.len(), 2048);
//!
//! let noise = white_noise(44_100, 0.5, 7);
//! let filtered = ConvolutionEngine::new(ir).apply(&noise)?;
//! assert_eq!(filtered.len(), noise.len());
//!
//! let psd = welch_psd(&filtered, SampleRate::CD_QUALITY, 1024)?;
//! assert_eq!(psd.len(), 513);
//! # Ok::<(), bellfir_dsp::BellError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod convolution;
pub mod filter;
pub mod harness;
pub mod impulse;
pub mod response;
pub mod spectrum;
pub mod window;

pub use convolution::{prevent_clipping, ConvolutionEngine};
pub use filter::BellFilter;
pub use impulse::ImpulseResponse;
pub use spectrum::{frequency_axis, MagnitudeSpectrum};

pub use bellfir_core::{
    AudioBuffer, AudioProcessor, BellError, FilterDesign, FilterParameters, ParameterId, Result,
    SampleRate, Stage, WindowKind,
};
