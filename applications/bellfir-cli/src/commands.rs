//! Subcommand implementations
//!
//! Each command takes a loaded [`DriverConfig`] and returns a serializable
//! report; printing is left to the binary.

use crate::config::DriverConfig;
use crate::export::{write_json, write_wav_i16};
use anyhow::{Context, Result};
use bellfir_dsp::harness::{linear_to_db, white_noise_buffer, AnalysisBundle};
use bellfir_dsp::{AudioProcessor, BellFilter, ImpulseResponse, SampleRate};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Result of the `design` command
#[derive(Debug, Clone, Serialize)]
pub struct DesignReport {
    /// Center frequency in Hz
    pub center_freq: f64,
    /// Quality factor
    pub q: f64,
    /// Requested peak gain in dB
    pub gain_db: f64,
    /// Number of coefficients
    pub order: usize,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Tapering window name
    pub window: String,
    /// Delay of the linear-phase filter, in samples
    pub group_delay_samples: usize,
    /// Model magnitude at the center frequency, including the +1 offset
    pub target_magnitude: f64,
    /// Magnitude the windowed coefficients actually reach at the center frequency
    pub realized_magnitude: f64,
    /// `realized_magnitude` in dB
    pub realized_gain_db: f64,
    /// Largest imaginary part left by the inverse transform
    pub imaginary_residual: f64,
    /// Windowed coefficients, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coefficients: Option<Vec<f64>>,
}

/// Run the design and summarize it
pub fn design(config: &DriverConfig, include_coefficients: bool) -> Result<DesignReport> {
    let design = config.design.to_design()?;
    let ir = ImpulseResponse::design(&design).context("filter design failed")?;
    let params = design.params();

    let target_magnitude = bellfir_dsp::response::magnitude_at(params.center_freq(), &params);
    let realized_magnitude = ir.magnitude_at(params.center_freq());

    Ok(DesignReport {
        center_freq: params.center_freq(),
        q: params.q(),
        gain_db: params.gain_db(),
        order: ir.len(),
        sample_rate: design.sample_rate().as_hz(),
        window: design.window().to_string(),
        group_delay_samples: ir.group_delay(),
        target_magnitude,
        realized_magnitude,
        realized_gain_db: linear_to_db(realized_magnitude),
        imaginary_residual: ir.imaginary_residual(),
        coefficients: include_coefficients.then(|| ir.coefficients().to_vec()),
    })
}

/// Files written by the `render` command
#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    /// Unfiltered noise
    pub original_wav: PathBuf,
    /// Filtered noise
    pub filtered_wav: PathBuf,
    /// Analysis bundle
    pub analysis_json: PathBuf,
    /// Frames per file
    pub frames: usize,
    /// Peak of the filtered signal before PCM conversion
    pub filtered_peak: f32,
    /// Welch PSD change at the center frequency, in dB
    pub psd_boost_db: Option<f64>,
}

/// Filter the reference noise and export audio plus analysis
pub fn render(config: &DriverConfig) -> Result<RenderReport> {
    let design = config.design.to_design()?;
    let filter = BellFilter::new(design).context("filter design failed")?;
    info!(filter = filter.name(), params = %design.params(), "rendering");

    let original = white_noise_buffer(
        SampleRate::new(config.design.sample_rate),
        config.signal.duration_secs,
        config.signal.peak,
        config.signal.seed,
    );
    let filtered = filter.process(&original).context("filtering failed")?;

    let output = &config.output;
    std::fs::create_dir_all(&output.directory)
        .with_context(|| format!("failed to create {}", output.directory.display()))?;

    let original_wav = output.original_path();
    let filtered_wav = output.filtered_path();
    let analysis_json = output.analysis_path();
    write_wav_i16(&original_wav, &original)?;
    write_wav_i16(&filtered_wav, &filtered)?;

    let bundle = AnalysisBundle::compare(&original, &filtered, output.welch_segment)
        .context("analysis failed")?;
    write_json(&analysis_json, &bundle)?;

    Ok(RenderReport {
        original_wav,
        filtered_wav,
        analysis_json,
        frames: filtered.frames(),
        filtered_peak: filtered.peak(),
        psd_boost_db: bundle.psd_gain_db(design.params().center_freq()),
    })
}
