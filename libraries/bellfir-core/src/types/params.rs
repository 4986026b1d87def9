//! Bell filter parameters

use crate::error::{BellError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parameters of a bell (peaking) filter
///
/// Immutable once constructed. `center_freq` and `q` are strictly positive,
/// every field is finite. Deserialization runs the same validation as `new`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFilterParameters")]
pub struct FilterParameters {
    center_freq: f64,
    q: f64,
    gain_db: f64,
}

#[derive(Deserialize)]
struct RawFilterParameters {
    center_freq: f64,
    q: f64,
    gain_db: f64,
}

impl TryFrom<RawFilterParameters> for FilterParameters {
    type Error = BellError;

    fn try_from(raw: RawFilterParameters) -> Result<Self> {
        Self::new(raw.center_freq, raw.q, raw.gain_db)
    }
}

impl FilterParameters {
    /// 1 kHz, Q 10, +12 dB
    pub const REFERENCE: Self = Self {
        center_freq: 1000.0,
        q: 10.0,
        gain_db: 12.0,
    };

    /// Create validated filter parameters
    ///
    /// # Arguments
    /// * `center_freq` - Center frequency in Hz (> 0)
    /// * `q` - Quality factor (> 0)
    /// * `gain_db` - Peak gain in dB
    ///
    /// # Errors
    /// Returns `BellError::InvalidParameter` if a value is out of range or not finite
    pub fn new(center_freq: f64, q: f64, gain_db: f64) -> Result<Self> {
        if !center_freq.is_finite() || center_freq <= 0.0 {
            return Err(BellError::invalid_parameter(format!(
                "center_freq must be a positive frequency, got {center_freq}"
            )));
        }
        if !q.is_finite() || q <= 0.0 {
            return Err(BellError::invalid_parameter(format!(
                "q must be positive, got {q}"
            )));
        }
        if !gain_db.is_finite() {
            return Err(BellError::invalid_parameter(format!(
                "gain_db must be finite, got {gain_db}"
            )));
        }

        Ok(Self {
            center_freq,
            q,
            gain_db,
        })
    }

    /// Center frequency in Hz
    pub fn center_freq(&self) -> f64 {
        self.center_freq
    }

    /// Quality factor
    pub fn q(&self) -> f64 {
        self.q
    }

    /// Peak gain in dB
    pub fn gain_db(&self) -> f64 {
        self.gain_db
    }

    /// Peak gain as a linear amplitude factor, `10^(gain_db / 20)`
    pub fn gain_linear(&self) -> f64 {
        10f64.powf(self.gain_db / 20.0)
    }

    /// Read a single parameter by id
    pub fn get(&self, id: ParameterId) -> f64 {
        match id {
            ParameterId::CenterFrequency => self.center_freq,
            ParameterId::Q => self.q,
            ParameterId::GainDb => self.gain_db,
        }
    }

    /// Return a copy with one parameter replaced
    ///
    /// # Errors
    /// Returns `BellError::InvalidParameter` if the new value is invalid;
    /// `self` is left untouched either way.
    pub fn with(&self, id: ParameterId, value: f64) -> Result<Self> {
        match id {
            ParameterId::CenterFrequency => Self::new(value, self.q, self.gain_db),
            ParameterId::Q => Self::new(self.center_freq, value, self.gain_db),
            ParameterId::GainDb => Self::new(self.center_freq, self.q, value),
        }
    }
}

impl fmt::Display for FilterParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bell {:.1} Hz, Q {:.2}, {:+.1} dB",
            self.center_freq, self.q, self.gain_db
        )
    }
}

/// Fixed set of adjustable filter parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterId {
    /// Center frequency in Hz
    #[serde(rename = "center_freq")]
    CenterFrequency,
    /// Quality factor
    Q,
    /// Peak gain in dB
    GainDb,
}

impl ParameterId {
    /// All parameter ids in declaration order
    pub const ALL: [ParameterId; 3] = [Self::CenterFrequency, Self::Q, Self::GainDb];

    /// Stable external name of the parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterId::CenterFrequency => "center_freq",
            ParameterId::Q => "q",
            ParameterId::GainDb => "gain_db",
        }
    }
}

impl fmt::Display for ParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterId {
    type Err = BellError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| BellError::invalid_parameter(format!("unknown parameter: {s}")))
    }
}
