/// Driver configuration
use anyhow::{ensure, Context, Result};
use bellfir_core::{FilterDesign, FilterParameters, SampleRate, WindowKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DriverConfig {
    #[serde(default = "default_design")]
    pub design: DesignSettings,

    #[serde(default = "default_signal")]
    pub signal: SignalSettings,

    #[serde(default = "default_output")]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DesignSettings {
    #[serde(default = "default_center_freq")]
    pub center_freq: f64,

    #[serde(default = "default_q")]
    pub q: f64,

    #[serde(default = "default_gain_db")]
    pub gain_db: f64,

    #[serde(default = "default_order")]
    pub order: usize,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default)]
    pub window: WindowKind,
}

/// Reference noise used by `render`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SignalSettings {
    #[serde(default = "default_duration_secs")]
    pub duration_secs: f64,

    #[serde(default = "default_peak")]
    pub peak: f32,

    #[serde(default)]
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutputSettings {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    #[serde(default = "default_original_wav")]
    pub original_wav: String,

    #[serde(default = "default_filtered_wav")]
    pub filtered_wav: String,

    #[serde(default = "default_analysis_json")]
    pub analysis_json: String,

    #[serde(default = "default_welch_segment")]
    pub welch_segment: usize,
}

impl DesignSettings {
    /// Build the validated design record
    pub fn to_design(&self) -> Result<FilterDesign> {
        let params = FilterParameters::new(self.center_freq, self.q, self.gain_db)?;
        let design = FilterDesign::new(
            params,
            self.order,
            SampleRate::new(self.sample_rate),
            self.window,
        )?;
        Ok(design)
    }
}

impl OutputSettings {
    pub fn original_path(&self) -> PathBuf {
        self.directory.join(&self.original_wav)
    }

    pub fn filtered_path(&self) -> PathBuf {
        self.directory.join(&self.filtered_wav)
    }

    pub fn analysis_path(&self) -> PathBuf {
        self.directory.join(&self.analysis_json)
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            design: default_design(),
            signal: default_signal(),
            output: default_output(),
        }
    }
}

impl DriverConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// Environment variables are prefixed with `BELLFIR_` and use `__` for
    /// nesting, e.g. `BELLFIR_DESIGN__GAIN_DB=6`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`DriverConfig::load`], reading variables from `env` instead of
    /// the process environment when given
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            settings = settings.add_source(config::File::from(path).required(true));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("BELLFIR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let loaded: Self = settings
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.design
            .to_design()
            .context("invalid [design] section")?;

        ensure!(
            self.signal.duration_secs.is_finite() && self.signal.duration_secs > 0.0,
            "signal duration must be positive, got {}",
            self.signal.duration_secs
        );
        ensure!(
            self.signal.peak.is_finite() && self.signal.peak > 0.0 && self.signal.peak <= 1.0,
            "signal peak must be in (0, 1], got {}",
            self.signal.peak
        );
        ensure!(
            self.output.welch_segment > 0,
            "welch segment length must be at least 1"
        );

        Ok(())
    }
}

// Default values
fn default_design() -> DesignSettings {
    DesignSettings {
        center_freq: default_center_freq(),
        q: default_q(),
        gain_db: default_gain_db(),
        order: default_order(),
        sample_rate: default_sample_rate(),
        window: WindowKind::default(),
    }
}

fn default_center_freq() -> f64 {
    FilterParameters::REFERENCE.center_freq()
}

fn default_q() -> f64 {
    FilterParameters::REFERENCE.q()
}

fn default_gain_db() -> f64 {
    FilterParameters::REFERENCE.gain_db()
}

fn default_order() -> usize {
    FilterDesign::DEFAULT_ORDER
}

fn default_sample_rate() -> u32 {
    SampleRate::CD_QUALITY.as_hz()
}

fn default_signal() -> SignalSettings {
    SignalSettings {
        duration_secs: default_duration_secs(),
        peak: default_peak(),
        seed: 0,
    }
}

fn default_duration_secs() -> f64 {
    3.0
}

fn default_peak() -> f32 {
    bellfir_dsp::harness::REFERENCE_NOISE_PEAK
}

fn default_output() -> OutputSettings {
    OutputSettings {
        directory: default_directory(),
        original_wav: default_original_wav(),
        filtered_wav: default_filtered_wav(),
        analysis_json: default_analysis_json(),
        welch_segment: default_welch_segment(),
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_original_wav() -> String {
    "test_audio_original.wav".to_string()
}

fn default_filtered_wav() -> String {
    "test_audio_filtered.wav".to_string()
}

fn default_analysis_json() -> String {
    "analysis.json".to_string()
}

fn default_welch_segment() -> usize {
    bellfir_dsp::harness::DEFAULT_WELCH_SEGMENT
}
