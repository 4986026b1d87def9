//! Core error types for bell filter design

use std::fmt;
use thiserror::Error;

/// Result type alias using `BellError`
pub type Result<T> = std::result::Result<T, BellError>;

/// Pipeline stage that produced a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Sampled magnitude spectrum
    Spectrum,
    /// Windowed impulse response coefficients
    ImpulseResponse,
    /// Filtered output signal
    Convolution,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Spectrum => write!(f, "spectrum"),
            Stage::ImpulseResponse => write!(f, "impulse response"),
            Stage::Convolution => write!(f, "convolution"),
        }
    }
}

/// Core error type for bell filter design
#[derive(Error, Debug)]
pub enum BellError {
    /// A parameter is outside its valid domain
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// NaN or infinity appeared in a computed sequence
    #[error("Non-finite value in {stage} at index {index}")]
    NonFinite {
        /// Stage that produced the value
        stage: Stage,
        /// Index of the first offending element
        index: usize,
    },

    /// Malformed audio buffer
    #[error("Invalid audio buffer: {0}")]
    InvalidBuffer(String),
}

impl BellError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Create an invalid buffer error
    pub fn invalid_buffer(msg: impl Into<String>) -> Self {
        Self::InvalidBuffer(msg.into())
    }

    /// Scan `values` and fail on the first NaN or infinity
    ///
    /// # Errors
    /// Returns `BellError::NonFinite` naming `stage` and the offending index
    pub fn check_finite<T>(stage: Stage, values: &[T]) -> Result<()>
    where
        T: Copy + Into<f64>,
    {
        match values.iter().position(|&v| !v.into().is_finite()) {
            Some(index) => Err(Self::NonFinite { stage, index }),
            None => Ok(()),
        }
    }
}
