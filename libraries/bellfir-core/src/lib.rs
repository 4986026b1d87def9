//! Bellfir Core
//!
//! Platform-agnostic value types, traits, and error handling for linear-phase
//! bell filter design.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Design Types**: `FilterParameters`, `FilterDesign`, `WindowKind`
//! - **Audio Types**: `AudioBuffer`, `SampleRate`
//! - **Core Traits**: `AudioProcessor`
//! - **Error Handling**: Unified `BellError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use bellfir_core::types::{FilterDesign, FilterParameters, SampleRate, WindowKind};
//!
//! let params = FilterParameters::new(1000.0, 10.0, 12.0)?;
//! let design = FilterDesign::new(params, 2048, SampleRate::CD_QUALITY, WindowKind::Blackman)?;
//!
//! assert_eq!(design.group_delay_samples(), 1024);
//! # Ok::<(), bellfir_core::BellError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{BellError, Result, Stage};
pub use traits::AudioProcessor;
pub use types::{
    AudioBuffer, FilterDesign, FilterParameters, ParameterId, SampleRate, WindowKind,
};
