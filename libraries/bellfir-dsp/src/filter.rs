//! Bell filter as a parameterised audio processor

use crate::convolution::ConvolutionEngine;
use crate::impulse::ImpulseResponse;
use bellfir_core::{AudioBuffer, AudioProcessor, FilterDesign, ParameterId, Result};
use tracing::debug;

/// Linear-phase bell equalizer
///
/// Holds the current design and a ready convolution engine. Changing a
/// parameter re-runs the design; on failure the previous design stays active.
///
/// # Example
///
/// ```rust
/// use bellfir_core::{AudioBuffer, AudioProcessor, FilterDesign, ParameterId, SampleRate};
/// use bellfir_dsp::BellFilter;
///
/// let mut eq = BellFilter::new(FilterDesign::default())?;
/// eq.set_parameter(ParameterId::GainDb, -6.0)?;
///
/// let input = AudioBuffer::mono(vec![0.25; 4410], SampleRate::CD_QUALITY);
/// let output = eq.process(&input)?;
/// assert_eq!(output.len(), input.len());
/// # Ok::<(), bellfir_core::BellError>(())
/// ```
#[derive(Debug)]
pub struct BellFilter {
    design: FilterDesign,
    engine: ConvolutionEngine,
}

impl BellFilter {
    /// Design the filter and prepare its engine
    ///
    /// # Errors
    /// Propagates design errors
    pub fn new(design: FilterDesign) -> Result<Self> {
        let engine = ConvolutionEngine::new(ImpulseResponse::design(&design)?);
        Ok(Self { design, engine })
    }

    /// Current design record
    pub fn design(&self) -> &FilterDesign {
        &self.design
    }

    /// Coefficients currently in use
    pub fn impulse_response(&self) -> &ImpulseResponse {
        self.engine.impulse_response()
    }

    /// Replace the whole design
    ///
    /// # Errors
    /// Propagates design errors; the previous design is kept on failure
    pub fn redesign(&mut self, design: FilterDesign) -> Result<()> {
        let engine = ConvolutionEngine::new(ImpulseResponse::design(&design)?);
        self.design = design;
        self.engine = engine;
        Ok(())
    }
}

impl AudioProcessor for BellFilter {
    fn set_parameter(&mut self, id: ParameterId, value: f64) -> Result<()> {
        let params = self.design.params().with(id, value)?;
        debug!(parameter = %id, value, "updating bell filter");
        self.redesign(self.design.with_params(params))
    }

    fn parameter(&self, id: ParameterId) -> f64 {
        self.design.params().get(id)
    }

    fn process(&self, buffer: &AudioBuffer) -> Result<AudioBuffer> {
        self.engine.apply_buffer(buffer)
    }

    fn name(&self) -> &str {
        "Bell EQ"
    }
}
