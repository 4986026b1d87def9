//! Core traits for bell filter design

use crate::error::Result;
use crate::types::{AudioBuffer, ParameterId};

/// Audio processor with a fixed, typed parameter set
///
/// This is the capability shape of a plugin-style collaborator: parameters are
/// addressed by `ParameterId` rather than by open-ended string keys, and
/// processing produces a new buffer instead of mutating its input.
pub trait AudioProcessor: Send {
    /// Set a single parameter
    ///
    /// # Errors
    /// Returns an error if the value is invalid; the processor keeps its
    /// previous configuration in that case
    fn set_parameter(&mut self, id: ParameterId, value: f64) -> Result<()>;

    /// Read a single parameter
    fn parameter(&self, id: ParameterId) -> f64;

    /// Process a buffer, returning a new buffer of the same shape
    ///
    /// # Errors
    /// Returns an error if the buffer cannot be processed or the output is
    /// not finite
    fn process(&self, buffer: &AudioBuffer) -> Result<AudioBuffer>;

    /// Processor name (for logging)
    fn name(&self) -> &str;
}
