//! Filter design configuration record

use super::audio::SampleRate;
use super::params::FilterParameters;
use crate::error::{BellError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tapering window applied to the truncated impulse response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    /// Blackman window (three-term, -58 dB sidelobes)
    #[default]
    Blackman,
    /// Hann window (raised cosine)
    Hann,
    /// Hamming window
    Hamming,
    /// Four-term Blackman-Harris window
    BlackmanHarris,
    /// No taper
    Rectangular,
}

impl WindowKind {
    /// All window kinds
    pub const ALL: [WindowKind; 5] = [
        Self::Blackman,
        Self::Hann,
        Self::Hamming,
        Self::BlackmanHarris,
        Self::Rectangular,
    ];

    /// Stable external name
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowKind::Blackman => "blackman",
            WindowKind::Hann => "hann",
            WindowKind::Hamming => "hamming",
            WindowKind::BlackmanHarris => "blackman_harris",
            WindowKind::Rectangular => "rectangular",
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowKind {
    type Err = BellError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| BellError::invalid_parameter(format!("unknown window: {s}")))
    }
}

/// Everything needed to synthesize one set of FIR coefficients
///
/// This is the explicit configuration record handed to the design functions;
/// nothing in the pipeline reads process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFilterDesign")]
pub struct FilterDesign {
    params: FilterParameters,
    order: usize,
    sample_rate: SampleRate,
    window: WindowKind,
}

#[derive(Deserialize)]
struct RawFilterDesign {
    params: FilterParameters,
    order: usize,
    sample_rate: SampleRate,
    #[serde(default)]
    window: WindowKind,
}

impl TryFrom<RawFilterDesign> for FilterDesign {
    type Error = BellError;

    fn try_from(raw: RawFilterDesign) -> Result<Self> {
        Self::new(raw.params, raw.order, raw.sample_rate, raw.window)
    }
}

impl FilterDesign {
    /// Order used by the reference design
    pub const DEFAULT_ORDER: usize = 2048;

    /// Create a validated design record
    ///
    /// # Errors
    /// Returns `BellError::InvalidParameter` if `order` or `sample_rate` is zero
    pub fn new(
        params: FilterParameters,
        order: usize,
        sample_rate: SampleRate,
        window: WindowKind,
    ) -> Result<Self> {
        if order == 0 {
            return Err(BellError::invalid_parameter("order must be at least 1"));
        }
        if sample_rate.as_hz() == 0 {
            return Err(BellError::invalid_parameter("sample_rate must be positive"));
        }

        Ok(Self {
            params,
            order,
            sample_rate,
            window,
        })
    }

    /// Filter parameters
    pub fn params(&self) -> FilterParameters {
        self.params
    }

    /// Number of FIR coefficients (equal to the transform length)
    pub fn order(&self) -> usize {
        self.order
    }

    /// Sample rate the coefficients are designed for
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Tapering window
    pub fn window(&self) -> WindowKind {
        self.window
    }

    /// Constant group delay of the designed filter, in samples
    pub fn group_delay_samples(&self) -> usize {
        self.order / 2
    }

    /// Same design with different filter parameters
    pub fn with_params(&self, params: FilterParameters) -> Self {
        Self { params, ..*self }
    }
}

impl Default for FilterDesign {
    /// 1 kHz, Q 10, +12 dB bell at 2048 taps, 44.1 kHz, Blackman
    fn default() -> Self {
        Self {
            params: FilterParameters::REFERENCE,
            order: Self::DEFAULT_ORDER,
            sample_rate: SampleRate::CD_QUALITY,
            window: WindowKind::Blackman,
        }
    }
}
